//! Flat, fixed-layout export surface
//!
//! Records in this module are `#[repr(C)]` with fixed-width integer fields
//! only, so they can cross a process or language boundary unchanged. Bulk
//! export and text retrieval follow the same bounded-copy rules as the
//! accessor: a too-small destination gets nothing.

use crate::catalog::Catalog;
use crate::descriptor::SubblockDescriptor;
use crate::error::Result;
use crate::types::Dimension;

/// Encodes an undefined dimension position in a [`SubblockRecord`]
pub const DIMENSION_UNDEFINED: i32 = i32::MIN;

/// Encodes an undefined mosaic index in a [`SubblockRecord`]
pub const M_INDEX_UNDEFINED: i32 = -1;

/// Fixed-layout rendering of one catalog entry
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubblockRecord {
    /// Positions along Z, C, T, R, S, I, H, V, B in that order;
    /// [`DIMENSION_UNDEFINED`] marks an absent coordinate
    pub positions: [i32; Dimension::COUNT],
    /// Mosaic index, or [`M_INDEX_UNDEFINED`]
    pub m_index: i32,
    pub logical_x: i32,
    pub logical_y: i32,
    pub logical_w: i32,
    pub logical_h: i32,
    pub physical_w: i32,
    pub physical_h: i32,
    pub pixel_type: u8,
    pub compression: u8,
    pub pyramid: u8,
    pub file_position: u64,
    pub index: u64,
}

impl From<&SubblockDescriptor> for SubblockRecord {
    fn from(desc: &SubblockDescriptor) -> Self {
        let mut positions = [DIMENSION_UNDEFINED; Dimension::COUNT];
        for (dim, pos) in desc.coordinate.iter_defined() {
            positions[dim.to_index()] = pos;
        }
        Self {
            positions,
            m_index: desc.m_index.unwrap_or(M_INDEX_UNDEFINED),
            logical_x: desc.logical.x,
            logical_y: desc.logical.y,
            logical_w: desc.logical.w,
            logical_h: desc.logical.h,
            physical_w: desc.physical.w,
            physical_h: desc.physical.h,
            pixel_type: desc.pixel_type.as_u8(),
            compression: desc.compression.as_u8(),
            pyramid: desc.pyramid as u8,
            file_position: desc.file_position,
            index: desc.index as u64,
        }
    }
}

/// One row of the dimension range table
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRangeRecord {
    /// ASCII symbol from {X,Y,Z,C,T,R,S,I,H,V,B,M}
    pub symbol: u8,
    pub start: i32,
    pub end: i32,
}

/// Per-scene bounding box lookup result
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneBoundingBoxRecord {
    pub found: bool,
    pub native_x: i32,
    pub native_y: i32,
    pub native_w: i32,
    pub native_h: i32,
    pub coarsest_x: i32,
    pub coarsest_y: i32,
    pub coarsest_w: i32,
    pub coarsest_h: i32,
}

impl SceneBoundingBoxRecord {
    fn not_found() -> Self {
        Self {
            found: false,
            native_x: 0,
            native_y: 0,
            native_w: 0,
            native_h: 0,
            coarsest_x: 0,
            coarsest_y: 0,
            coarsest_w: 0,
            coarsest_h: 0,
        }
    }
}

/// Write descriptor records into `destination` in catalog order
///
/// Stops when the destination is full; returns the number written, which may
/// be short of [`Catalog::subblock_count`] by design.
pub fn copy_subblock_records(catalog: &Catalog, destination: &mut [SubblockRecord]) -> usize {
    let mut written = 0;
    for desc in catalog.subblocks() {
        if written == destination.len() {
            break;
        }
        destination[written] = SubblockRecord::from(desc);
        written += 1;
    }
    written
}

/// All present dimension ranges as flat records, sorted by symbol
pub fn dimension_range_records(catalog: &Catalog) -> Vec<DimensionRangeRecord> {
    catalog
        .dimension_ranges()
        .entries()
        .into_iter()
        .map(|(symbol, start, end)| DimensionRangeRecord {
            symbol: symbol as u8,
            start,
            end,
        })
        .collect()
}

/// Bounding box lookup returning a fixed-size record instead of an option
pub fn scene_bounding_box_record(catalog: &Catalog, scene: i32) -> SceneBoundingBoxRecord {
    match catalog.scene_bounding_box(scene) {
        Some(bbox) => SceneBoundingBoxRecord {
            found: true,
            native_x: bbox.native.x,
            native_y: bbox.native.y,
            native_w: bbox.native.w,
            native_h: bbox.native.h,
            coarsest_x: bbox.coarsest.x,
            coarsest_y: bbox.coarsest.y,
            coarsest_w: bbox.coarsest.w,
            coarsest_h: bbox.coarsest.h,
        },
        None => SceneBoundingBoxRecord::not_found(),
    }
}

/// Byte length of the whole-container metadata XML
pub fn metadata_xml_len(catalog: &Catalog) -> Result<u64> {
    Ok(catalog.metadata_xml()?.len() as u64)
}

/// Copy the metadata XML bytes into `destination`
///
/// Returns `0` without writing when the destination is shorter than the text.
pub fn copy_metadata_xml(catalog: &Catalog, destination: &mut [u8]) -> Result<usize> {
    let xml = catalog.metadata_xml()?;
    let bytes = xml.as_bytes();
    if destination.len() < bytes.len() {
        return Ok(0);
    }
    destination[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len())
}
