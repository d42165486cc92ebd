//! Dimension range and per-scene bounding box aggregation
//!
//! Both tables are produced by [`CatalogStatistics`], a streaming reducer fed
//! one descriptor at a time during the catalog's single enumeration pass.

use crate::descriptor::SubblockDescriptor;
use crate::types::{Dimension, IntRect, Interval};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Occupied `[start, end)` interval per dimension symbol
///
/// The nine real axes are present only when at least one subblock defines
/// them. The synthetic axes are derived: `M` from the mosaic indices (absent
/// when no tile carries one), `X`/`Y` always present as `[0, w)` / `[0, h)` of
/// the whole-container native-resolution bounding box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRanges {
    dims: [Option<Interval>; Dimension::COUNT],
    m: Option<Interval>,
    x: Interval,
    y: Interval,
}

impl DimensionRanges {
    /// Interval of a real dimension axis
    pub fn get(&self, dim: Dimension) -> Option<Interval> {
        self.dims[dim.to_index()]
    }

    /// Interval of the synthetic mosaic-index axis
    pub fn mosaic(&self) -> Option<Interval> {
        self.m
    }

    /// Pixel-space X extent, `[0, width)`
    pub fn x(&self) -> Interval {
        self.x
    }

    /// Pixel-space Y extent, `[0, height)`
    pub fn y(&self) -> Interval {
        self.y
    }

    /// Lookup by symbol from the full set {X,Y,Z,C,T,R,S,I,H,V,B,M}
    pub fn get_by_symbol(&self, symbol: char) -> Option<Interval> {
        match symbol.to_ascii_uppercase() {
            'X' => Some(self.x),
            'Y' => Some(self.y),
            'M' => self.m,
            c => Dimension::from_char(c).and_then(|dim| self.get(dim)),
        }
    }

    /// All present axes as `(symbol, start, end)`, sorted by symbol
    pub fn entries(&self) -> Vec<(char, i32, i32)> {
        let mut out = Vec::with_capacity(Dimension::COUNT + 3);
        for dim in Dimension::ALL {
            if let Some(iv) = self.get(dim) {
                out.push((dim.as_char(), iv.start, iv.end));
            }
        }
        if let Some(iv) = self.m {
            out.push(('M', iv.start, iv.end));
        }
        out.push(('X', self.x.start, self.x.end));
        out.push(('Y', self.y.start, self.y.end));
        out.sort_by_key(|&(c, _, _)| c);
        out
    }
}

/// Union bounding boxes of one scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBoundingBox {
    /// Union of the scene's native-resolution tile rectangles
    pub native: IntRect,

    /// Union of the scene's tiles at the coarsest observed pyramid layer
    pub coarsest: IntRect,
}

/// Sparse map from scene index to its bounding boxes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBoundingBoxes {
    scenes: HashMap<i32, SceneBoundingBox>,
}

impl SceneBoundingBoxes {
    /// Bounding boxes for `scene`, or `None` when no tile was observed there
    pub fn get(&self, scene: i32) -> Option<SceneBoundingBox> {
        self.scenes.get(&scene).copied()
    }

    /// Number of scenes with at least one observed tile
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Observed scene indices, ascending
    pub fn scene_indices(&self) -> Vec<i32> {
        let mut indices: Vec<i32> = self.scenes.keys().copied().collect();
        indices.sort_unstable();
        indices
    }
}

/// Per-scene running state of the coarsest-layer union
#[derive(Debug, Clone, Copy)]
struct SceneAccumulator {
    native: IntRect,
    coarsest: IntRect,
    max_factor: i32,
}

/// Streaming reducer over the enumeration pass
///
/// Fed every descriptor exactly once; dimensions and scenes with zero
/// observations stay absent from the resulting tables rather than defaulting
/// to empty ranges.
#[derive(Debug)]
pub struct CatalogStatistics {
    dims: [Option<Interval>; Dimension::COUNT],
    mosaic: Option<Interval>,
    level0_box: IntRect,
    scenes: HashMap<i32, SceneAccumulator>,
}

impl Default for CatalogStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStatistics {
    pub fn new() -> Self {
        Self {
            dims: [None; Dimension::COUNT],
            mosaic: None,
            level0_box: IntRect::new(0, 0, 0, 0),
            scenes: HashMap::new(),
        }
    }

    /// Fold one descriptor into the running aggregates
    pub fn observe(&mut self, desc: &SubblockDescriptor) {
        for (dim, pos) in desc.coordinate.iter_defined() {
            match &mut self.dims[dim.to_index()] {
                Some(iv) => iv.extend(pos),
                slot => *slot = Some(Interval::new(pos, pos + 1)),
            }
        }

        if let Some(m) = desc.m_index {
            match &mut self.mosaic {
                Some(iv) => iv.extend(m),
                slot => *slot = Some(Interval::new(m, m + 1)),
            }
        }

        if desc.is_level0() {
            self.level0_box = self.level0_box.union(&desc.logical);
        }

        if let Some(scene) = desc.scene() {
            let factor = desc.downsample_factor();
            let entry = self.scenes.entry(scene).or_insert(SceneAccumulator {
                native: IntRect::new(0, 0, 0, 0),
                coarsest: IntRect::new(0, 0, 0, 0),
                max_factor: 0,
            });
            if desc.is_level0() {
                entry.native = entry.native.union(&desc.logical);
            }
            // a coarser layer supersedes the running union
            if factor > entry.max_factor {
                entry.max_factor = factor;
                entry.coarsest = desc.logical;
            } else if factor == entry.max_factor {
                entry.coarsest = entry.coarsest.union(&desc.logical);
            }
        }
    }

    /// Finish the reduction and emit both tables
    pub fn finish(self) -> (DimensionRanges, SceneBoundingBoxes) {
        let ranges = DimensionRanges {
            dims: self.dims,
            m: self.mosaic,
            x: Interval::new(0, self.level0_box.w.max(0)),
            y: Interval::new(0, self.level0_box.h.max(0)),
        };
        let scenes = self
            .scenes
            .into_iter()
            .map(|(scene, acc)| {
                (
                    scene,
                    SceneBoundingBox {
                        native: acc.native,
                        coarsest: acc.coarsest,
                    },
                )
            })
            .collect();
        (ranges, SceneBoundingBoxes { scenes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;
    use crate::descriptor::FILE_POSITION_NONE;
    use crate::types::{CompressionMode, IntSize, PixelType, PyramidClass};

    fn tile(
        index: usize,
        pairs: &[(Dimension, i32)],
        m_index: Option<i32>,
        logical: IntRect,
        physical: IntSize,
        pyramid: PyramidClass,
    ) -> SubblockDescriptor {
        SubblockDescriptor {
            coordinate: Coordinate::from_pairs(pairs),
            m_index,
            logical,
            physical,
            pixel_type: PixelType::Gray8,
            compression: CompressionMode::Uncompressed,
            pyramid,
            file_position: FILE_POSITION_NONE,
            index,
        }
    }

    fn level0(index: usize, pairs: &[(Dimension, i32)], logical: IntRect) -> SubblockDescriptor {
        let physical = IntSize::new(logical.w, logical.h);
        tile(index, pairs, None, logical, physical, PyramidClass::None)
    }

    #[test]
    fn test_empty_statistics() {
        let (ranges, scenes) = CatalogStatistics::new().finish();
        for dim in Dimension::ALL {
            assert_eq!(ranges.get(dim), None);
        }
        assert_eq!(ranges.mosaic(), None);
        assert_eq!(ranges.x(), Interval::new(0, 0));
        assert_eq!(ranges.y(), Interval::new(0, 0));
        assert!(scenes.is_empty());
        assert_eq!(scenes.get(0), None);
    }

    #[test]
    fn test_dimension_ranges_from_observations() {
        let mut stats = CatalogStatistics::new();
        stats.observe(&level0(
            0,
            &[(Dimension::Z, 0), (Dimension::C, 0)],
            IntRect::new(0, 0, 100, 100),
        ));
        stats.observe(&level0(
            1,
            &[(Dimension::Z, 1), (Dimension::C, 0)],
            IntRect::new(100, 0, 100, 100),
        ));
        let (ranges, _) = stats.finish();

        assert_eq!(ranges.get(Dimension::Z), Some(Interval::new(0, 2)));
        assert_eq!(ranges.get(Dimension::C), Some(Interval::new(0, 1)));
        assert_eq!(ranges.get(Dimension::T), None);
        assert_eq!(ranges.mosaic(), None);
        assert_eq!(ranges.x(), Interval::new(0, 200));
        assert_eq!(ranges.y(), Interval::new(0, 100));
    }

    #[test]
    fn test_mosaic_range_only_when_defined() {
        let mut stats = CatalogStatistics::new();
        stats.observe(&tile(
            0,
            &[(Dimension::C, 0)],
            Some(3),
            IntRect::new(0, 0, 10, 10),
            IntSize::new(10, 10),
            PyramidClass::None,
        ));
        stats.observe(&tile(
            1,
            &[(Dimension::C, 0)],
            Some(7),
            IntRect::new(10, 0, 10, 10),
            IntSize::new(10, 10),
            PyramidClass::None,
        ));
        stats.observe(&level0(2, &[(Dimension::C, 0)], IntRect::new(20, 0, 10, 10)));
        let (ranges, _) = stats.finish();
        assert_eq!(ranges.mosaic(), Some(Interval::new(3, 8)));
        assert_eq!(ranges.get_by_symbol('M'), Some(Interval::new(3, 8)));
    }

    #[test]
    fn test_symbol_lookup_and_entries() {
        let mut stats = CatalogStatistics::new();
        stats.observe(&level0(
            0,
            &[(Dimension::Z, 2), (Dimension::S, 0)],
            IntRect::new(0, 0, 50, 40),
        ));
        let (ranges, _) = stats.finish();

        assert_eq!(ranges.get_by_symbol('z'), Some(Interval::new(2, 3)));
        assert_eq!(ranges.get_by_symbol('X'), Some(Interval::new(0, 50)));
        assert_eq!(ranges.get_by_symbol('Q'), None);

        let entries = ranges.entries();
        assert_eq!(
            entries,
            vec![('S', 0, 1), ('X', 0, 50), ('Y', 0, 40), ('Z', 2, 3)]
        );
    }

    #[test]
    fn test_scene_union_is_idempotent() {
        let rect = IntRect::new(10, 10, 30, 30);
        let mut stats = CatalogStatistics::new();
        stats.observe(&level0(0, &[(Dimension::S, 1)], rect));
        stats.observe(&level0(1, &[(Dimension::S, 1)], rect)); // duplicate coverage
        let (_, scenes) = stats.finish();

        let bbox = scenes.get(1).unwrap();
        assert_eq!(bbox.native, rect);
        assert_eq!(bbox.coarsest, rect);
    }

    #[test]
    fn test_single_tile_scene_equals_logical_rect() {
        let rect = IntRect::new(5, 7, 64, 48);
        let mut stats = CatalogStatistics::new();
        stats.observe(&level0(0, &[(Dimension::S, 4)], rect));
        let (_, scenes) = stats.finish();

        assert_eq!(scenes.get(4).unwrap().native, rect);
        assert_eq!(scenes.get(3), None);
        assert_eq!(scenes.scene_indices(), vec![4]);
    }

    #[test]
    fn test_coarsest_layer_tracking() {
        let mut stats = CatalogStatistics::new();
        // two level-0 tiles and one 4x pyramid tile in scene 0
        stats.observe(&level0(0, &[(Dimension::S, 0)], IntRect::new(0, 0, 100, 100)));
        stats.observe(&level0(1, &[(Dimension::S, 0)], IntRect::new(100, 0, 100, 100)));
        stats.observe(&tile(
            2,
            &[(Dimension::S, 0)],
            None,
            IntRect::new(0, 0, 200, 100),
            IntSize::new(50, 25),
            PyramidClass::MultiSubblock,
        ));
        let (_, scenes) = stats.finish();

        let bbox = scenes.get(0).unwrap();
        assert_eq!(bbox.native, IntRect::new(0, 0, 200, 100));
        assert_eq!(bbox.coarsest, IntRect::new(0, 0, 200, 100));
    }

    #[test]
    fn test_scene_with_only_level0_has_coarsest_equal_native() {
        let rect = IntRect::new(0, 0, 80, 60);
        let mut stats = CatalogStatistics::new();
        stats.observe(&level0(0, &[(Dimension::S, 2)], rect));
        let (_, scenes) = stats.finish();

        let bbox = scenes.get(2).unwrap();
        assert_eq!(bbox.coarsest, bbox.native);
    }

    #[test]
    fn test_sceneless_tiles_do_not_create_scene_entries() {
        let mut stats = CatalogStatistics::new();
        stats.observe(&level0(0, &[(Dimension::Z, 0)], IntRect::new(0, 0, 10, 10)));
        let (ranges, scenes) = stats.finish();

        assert!(scenes.is_empty());
        // but the tile still contributes to the container-wide aggregates
        assert_eq!(ranges.x(), Interval::new(0, 10));
        assert_eq!(ranges.get(Dimension::Z), Some(Interval::new(0, 1)));
    }
}
