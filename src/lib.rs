//! tilecat - read-side catalog for tiled, pyramidal image containers
//!
//! A container holds many independently compressed rectangular tiles
//! ("subblocks"), each tagged with a sparse coordinate over the dimension
//! axes Z, C, T, R, S, I, H, V, B plus a mosaic index. Opening a container
//! materializes the full subblock catalog in one enumeration pass: dimension
//! ranges, per-scene bounding boxes, and the ordered descriptor list. Pixel,
//! metadata, and attachment bytes are then pulled on demand through bounded
//! probe-then-copy calls that never overflow caller memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use tilecat::Catalog;
//!
//! let catalog = Catalog::open("/data/specimen-unpacked")?;
//! println!("{} subblocks", catalog.subblock_count());
//!
//! let mut accessor = catalog.subblock(0)?;
//! let size = accessor.decoded_pixel_byte_size()?;
//! let mut pixels = vec![0u8; size as usize];
//! accessor.copy_pixels(&mut pixels)?;
//! # Ok::<(), tilecat::CatalogError>(())
//! ```

pub mod accessor;
pub mod boundary;
pub mod catalog;
pub mod codec;
pub mod coordinate;
pub mod descriptor;
pub mod error;
pub mod ranges;
pub mod reader;
pub mod types;

// Re-exports
pub use accessor::SubblockAccessor;
pub use catalog::Catalog;
pub use coordinate::Coordinate;
pub use descriptor::{AttachmentDescriptor, SubblockDescriptor, FILE_POSITION_NONE};
pub use error::{CatalogError, Result};
pub use ranges::{DimensionRanges, SceneBoundingBox, SceneBoundingBoxes};
pub use reader::{ContainerReader, DirectoryReader, SegmentKind};
pub use types::{
    CompressionMode, Dimension, FileHeader, IntRect, IntSize, Interval, PixelType, PyramidClass,
};

/// Version of the tilecat implementation
pub const TILECAT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!TILECAT_VERSION.is_empty());
    }
}
