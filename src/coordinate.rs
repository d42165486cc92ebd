//! Sparse coordinate over the container's nine dimension axes

use crate::types::Dimension;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sparse mapping from dimension to integer position
///
/// The axis set is closed and small, so positions are held in a fixed array of
/// optionals rather than an associative container. A missing entry is an
/// observable "undefined" state and is never coerced to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    positions: [Option<i32>; Dimension::COUNT],
}

impl Coordinate {
    /// Coordinate with every dimension undefined
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a coordinate from dimension/position pairs
    pub fn from_pairs(pairs: &[(Dimension, i32)]) -> Self {
        let mut coord = Self::new();
        for &(dim, pos) in pairs {
            coord.set(dim, pos);
        }
        coord
    }

    /// Position along `dim`, if defined
    pub fn get(&self, dim: Dimension) -> Option<i32> {
        self.positions[dim.to_index()]
    }

    /// Define (or redefine) the position along `dim`
    pub fn set(&mut self, dim: Dimension, position: i32) {
        self.positions[dim.to_index()] = Some(position);
    }

    /// Remove the position along `dim`
    pub fn clear(&mut self, dim: Dimension) {
        self.positions[dim.to_index()] = None;
    }

    /// True if `dim` has a defined position
    pub fn is_defined(&self, dim: Dimension) -> bool {
        self.positions[dim.to_index()].is_some()
    }

    /// True if no dimension has a defined position
    pub fn is_empty(&self) -> bool {
        self.positions.iter().all(|p| p.is_none())
    }

    /// Number of defined dimensions
    pub fn defined_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    /// Iterate over the defined dimension/position pairs in axis order
    pub fn iter_defined(&self) -> impl Iterator<Item = (Dimension, i32)> + '_ {
        Dimension::ALL
            .iter()
            .filter_map(|&dim| self.get(dim).map(|pos| (dim, pos)))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<empty>");
        }
        for (dim, pos) in self.iter_defined() {
            write!(f, "{}{}", dim.as_char(), pos)?;
        }
        Ok(())
    }
}
