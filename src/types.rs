//! Core value types for the subblock catalog

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Dimensions of the sparse coordinate space
///
/// The container addresses every subblock with a sparse coordinate over this
/// closed set of nine axes. The mosaic index (M) and the pixel-space extents
/// (X, Y) are synthetic and live outside this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Dimension {
    /// Focus position
    Z = 0,
    /// Channel
    C = 1,
    /// Time point
    T = 2,
    /// Rotation
    R = 3,
    /// Scene
    S = 4,
    /// Illumination
    I = 5,
    /// Phase
    H = 6,
    /// View
    V = 7,
    /// Block (acquisition)
    B = 8,
}

impl Dimension {
    /// Number of real dimension axes
    pub const COUNT: usize = 9;

    /// All dimensions in index order
    pub const ALL: [Dimension; Self::COUNT] = [
        Dimension::Z,
        Dimension::C,
        Dimension::T,
        Dimension::R,
        Dimension::S,
        Dimension::I,
        Dimension::H,
        Dimension::V,
        Dimension::B,
    ];

    /// Convert to array index
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Convert from array index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Single-character symbol for this dimension
    pub fn as_char(self) -> char {
        match self {
            Dimension::Z => 'Z',
            Dimension::C => 'C',
            Dimension::T => 'T',
            Dimension::R => 'R',
            Dimension::S => 'S',
            Dimension::I => 'I',
            Dimension::H => 'H',
            Dimension::V => 'V',
            Dimension::B => 'B',
        }
    }

    /// Parse a dimension from its symbol
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'Z' => Some(Dimension::Z),
            'C' => Some(Dimension::C),
            'T' => Some(Dimension::T),
            'R' => Some(Dimension::R),
            'S' => Some(Dimension::S),
            'I' => Some(Dimension::I),
            'H' => Some(Dimension::H),
            'V' => Some(Dimension::V),
            'B' => Some(Dimension::B),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Pixel formats stored by the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PixelType {
    /// Unsigned 8-bit grayscale
    Gray8 = 0,
    /// Unsigned 16-bit grayscale
    Gray16 = 1,
    /// 32-bit float grayscale
    Gray32Float = 2,
    /// 8-bit-per-sample BGR
    Bgr24 = 3,
    /// 16-bit-per-sample BGR
    Bgr48 = 4,
    /// 32-bit-float-per-sample BGR
    Bgr96Float = 8,
    /// 8-bit-per-sample BGRA
    Bgra32 = 9,
    /// Complex 2x32-bit-float grayscale
    Gray64ComplexFloat = 10,
    /// Complex 2x32-bit-float per BGR sample
    Bgr192ComplexFloat = 11,
    /// Signed 32-bit grayscale
    Gray32 = 12,
    /// 64-bit float grayscale
    Gray64Float = 13,
    /// Unknown or unset pixel format
    Invalid = 0xFF,
}

impl PixelType {
    /// Bytes occupied by a single pixel of this type
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelType::Gray8 => 1,
            PixelType::Gray16 => 2,
            PixelType::Gray32Float | PixelType::Gray32 => 4,
            PixelType::Bgr24 => 3,
            PixelType::Bgr48 => 6,
            PixelType::Bgr96Float => 12,
            PixelType::Bgra32 => 4,
            PixelType::Gray64ComplexFloat | PixelType::Gray64Float => 8,
            PixelType::Bgr192ComplexFloat => 24,
            PixelType::Invalid => 0,
        }
    }

    /// Convert from the container's numeric value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PixelType::Gray8),
            1 => Some(PixelType::Gray16),
            2 => Some(PixelType::Gray32Float),
            3 => Some(PixelType::Bgr24),
            4 => Some(PixelType::Bgr48),
            8 => Some(PixelType::Bgr96Float),
            9 => Some(PixelType::Bgra32),
            10 => Some(PixelType::Gray64ComplexFloat),
            11 => Some(PixelType::Bgr192ComplexFloat),
            12 => Some(PixelType::Gray32),
            13 => Some(PixelType::Gray64Float),
            0xFF => Some(PixelType::Invalid),
            _ => None,
        }
    }

    /// The container's numeric value for this pixel type
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Compression applied to a subblock's pixel payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompressionMode {
    /// Raw pixel bytes
    Uncompressed = 0,
    /// JPEG
    Jpg = 1,
    /// JPEG-XR
    JpgXr = 4,
    /// Plain zstd frame
    Zstd0 = 5,
    /// Zstd frame preceded by a small chunk header
    Zstd1 = 6,
    /// Unknown or unset compression
    Invalid = 0xFF,
}

impl CompressionMode {
    /// Convert from the container's numeric value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionMode::Uncompressed),
            1 => Some(CompressionMode::Jpg),
            4 => Some(CompressionMode::JpgXr),
            5 => Some(CompressionMode::Zstd0),
            6 => Some(CompressionMode::Zstd1),
            0xFF => Some(CompressionMode::Invalid),
            _ => None,
        }
    }

    /// The container's numeric value for this mode
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Pyramid classification of a subblock
///
/// `None` marks a native-resolution (level 0) tile. The two pyramid variants
/// distinguish how a down-sampled tile was produced; both are excluded from
/// level-0 views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PyramidClass {
    /// Native resolution tile
    None = 0,
    /// Down-sampled from a single subblock
    SingleSubblock = 1,
    /// Down-sampled from multiple subblocks
    MultiSubblock = 2,
    /// Unknown classification
    Invalid = 0xFF,
}

/// Axis-aligned rectangle in specimen pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl IntRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Smallest rectangle covering both `self` and `other`
    ///
    /// Unioning with an empty rectangle yields the other operand unchanged,
    /// so repeated unions over duplicate coverage are idempotent.
    pub fn union(&self, other: &IntRect) -> IntRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.w).max(other.x + other.w);
        let bottom = (self.y + self.h).max(other.y + other.h);
        IntRect::new(x, y, right - x, bottom - y)
    }
}

/// Stored width and height of a subblock's pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntSize {
    pub w: i32,
    pub h: i32,
}

impl IntSize {
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// Half-open integer interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i32,
    pub end: i32,
}

impl Interval {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Number of positions covered
    pub fn len(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.end) - i64::from(self.start)
        }
    }

    /// Widen the interval to include `position`
    pub fn extend(&mut self, position: i32) {
        if position < self.start {
            self.start = position;
        }
        if position >= self.end {
            self.end = position + 1;
        }
    }
}

/// Whole-file header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Unique identifier of this container file
    pub guid: Uuid,
    pub major_version: u32,
    pub minor_version: u32,
}

impl FileHeader {
    pub fn new(guid: Uuid, major_version: u32, minor_version: u32) -> Self {
        Self {
            guid,
            major_version,
            minor_version,
        }
    }

    /// Canonical lowercase hyphenated rendering of the file GUID
    pub fn guid_string(&self) -> String {
        self.guid.hyphenated().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_char_round_trip() {
        for dim in Dimension::ALL {
            assert_eq!(Dimension::from_char(dim.as_char()), Some(dim));
        }
        assert_eq!(Dimension::from_char('M'), None);
        assert_eq!(Dimension::from_char('X'), None);
    }

    #[test]
    fn test_dimension_index_round_trip() {
        for (i, dim) in Dimension::ALL.iter().enumerate() {
            assert_eq!(dim.to_index(), i);
            assert_eq!(Dimension::from_index(i), Some(*dim));
        }
        assert_eq!(Dimension::from_index(9), None);
    }

    #[test]
    fn test_pixel_type_sizes() {
        assert_eq!(PixelType::Gray8.bytes_per_pixel(), 1);
        assert_eq!(PixelType::Gray16.bytes_per_pixel(), 2);
        assert_eq!(PixelType::Bgr24.bytes_per_pixel(), 3);
        assert_eq!(PixelType::Bgr48.bytes_per_pixel(), 6);
        assert_eq!(PixelType::Gray64ComplexFloat.bytes_per_pixel(), 8);
        assert_eq!(PixelType::Bgr192ComplexFloat.bytes_per_pixel(), 24);
    }

    #[test]
    fn test_pixel_type_numeric_round_trip() {
        for pt in [
            PixelType::Gray8,
            PixelType::Gray16,
            PixelType::Gray32Float,
            PixelType::Bgr24,
            PixelType::Bgr48,
            PixelType::Bgr96Float,
            PixelType::Bgra32,
            PixelType::Gray64ComplexFloat,
            PixelType::Bgr192ComplexFloat,
            PixelType::Gray32,
            PixelType::Gray64Float,
            PixelType::Invalid,
        ] {
            assert_eq!(PixelType::from_u8(pt.as_u8()), Some(pt));
        }
        assert_eq!(PixelType::from_u8(7), None);
    }

    #[test]
    fn test_compression_numeric_round_trip() {
        for mode in [
            CompressionMode::Uncompressed,
            CompressionMode::Jpg,
            CompressionMode::JpgXr,
            CompressionMode::Zstd0,
            CompressionMode::Zstd1,
            CompressionMode::Invalid,
        ] {
            assert_eq!(CompressionMode::from_u8(mode.as_u8()), Some(mode));
        }
        assert_eq!(CompressionMode::from_u8(2), None);
    }

    #[test]
    fn test_rect_union() {
        let a = IntRect::new(0, 0, 10, 10);
        let b = IntRect::new(5, 5, 10, 10);
        assert_eq!(a.union(&b), IntRect::new(0, 0, 15, 15));

        // union with self is idempotent
        assert_eq!(a.union(&a), a);

        // empty operand leaves the other unchanged
        let empty = IntRect::new(100, 100, 0, 0);
        assert_eq!(a.union(&empty), a);
        assert_eq!(empty.union(&a), a);
    }

    #[test]
    fn test_interval_extend() {
        let mut iv = Interval::new(3, 4);
        iv.extend(0);
        assert_eq!(iv, Interval::new(0, 4));
        iv.extend(7);
        assert_eq!(iv, Interval::new(0, 8));
        iv.extend(5); // already covered
        assert_eq!(iv, Interval::new(0, 8));
        assert_eq!(iv.len(), 8);
    }

    #[test]
    fn test_guid_string_round_trip() {
        let guid = Uuid::parse_str("1b4c57b6-9a2d-4f0e-8c11-0123456789ab").unwrap();
        let header = FileHeader::new(guid, 1, 0);
        let text = header.guid_string();
        assert_eq!(text, "1b4c57b6-9a2d-4f0e-8c11-0123456789ab");
        assert_eq!(Uuid::parse_str(&text).unwrap(), guid);
        assert_eq!(Uuid::parse_str(&text).unwrap().as_bytes(), guid.as_bytes());
    }
}
