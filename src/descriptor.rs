//! Catalog entry descriptors for subblocks and attachments

use crate::coordinate::Coordinate;
use crate::types::{CompressionMode, Dimension, IntRect, IntSize, PixelType, PyramidClass};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File position value meaning "not applicable"
///
/// Used when a descriptor was sourced from an enumeration path that does not
/// expose the on-disk position of the subblock.
pub const FILE_POSITION_NONE: u64 = u64::MAX;

/// One entry of the subblock catalog
///
/// An immutable snapshot copied out of the catalog at enumeration time; it
/// stays valid after the catalog is closed. `index` is the sole key for later
/// random-access retrieval and is stable for the lifetime of one open catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubblockDescriptor {
    /// Sparse dimension coordinate of this tile
    pub coordinate: Coordinate,

    /// Mosaic index; `None` when the tile is not part of a mosaic
    pub m_index: Option<i32>,

    /// Placement in specimen pixel space
    pub logical: IntRect,

    /// Stored pixel dimensions; smaller than `logical` for pyramid tiles
    pub physical: IntSize,

    /// Pixel format of the decoded data
    pub pixel_type: PixelType,

    /// Compression of the stored payload
    pub compression: CompressionMode,

    /// Pyramid classification; `PyramidClass::None` is a level-0 tile
    pub pyramid: PyramidClass,

    /// On-disk position, or [`FILE_POSITION_NONE`]
    pub file_position: u64,

    /// Dense 0-based position in enumeration order
    pub index: usize,
}

impl SubblockDescriptor {
    /// Scene index (the S coordinate), if defined
    pub fn scene(&self) -> Option<i32> {
        self.coordinate.get(Dimension::S)
    }

    /// True for a native-resolution tile
    pub fn is_level0(&self) -> bool {
        self.pyramid == PyramidClass::None
    }

    /// Ratio of logical width to stored width, at least 1
    ///
    /// Level-0 tiles report 1; pyramid tiles report their minification factor.
    pub fn downsample_factor(&self) -> i32 {
        if self.physical.w <= 0 {
            return 1;
        }
        (self.logical.w / self.physical.w).max(1)
    }

    /// Byte size of the decoded pixel buffer
    pub fn decoded_size_bytes(&self) -> u64 {
        self.physical.w.max(0) as u64
            * self.physical.h.max(0) as u64
            * self.pixel_type.bytes_per_pixel() as u64
    }
}

/// Summary of one binary attachment segment
///
/// Attachment indices form their own 0-based space, independent of the
/// subblock catalog indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    /// GUID identifying the attachment content
    pub content_guid: Uuid,

    /// Up to eight characters identifying the content file type
    pub content_file_type: String,

    /// Free-text attachment name
    pub name: String,

    /// Dense 0-based position in the attachment directory
    pub index: usize,
}
