//! Per-subblock accessor with the probe/copy retrieval contract

use crate::catalog::SharedReader;
use crate::codec::decode_pixels;
use crate::descriptor::SubblockDescriptor;
use crate::error::{CatalogError, Result};
use crate::reader::SegmentKind;
use bytes::Bytes;
use std::sync::Arc;

/// Short-lived handle for pulling one subblock's data
///
/// Bound to a single catalog index at construction. Pixel decode is lazy and
/// happens at most once per accessor; the decoded buffer is memoized until
/// [`release`](Self::release).
///
/// Every copy operation follows the probe-then-copy contract: a destination
/// shorter than the required size receives nothing and the call returns `0`,
/// so a caller can probe the size, allocate once, and retry. A copy never
/// partially fills the destination.
pub struct SubblockAccessor {
    handle: Arc<SharedReader>,
    desc: SubblockDescriptor,
    decoded: Option<Bytes>,
}

impl SubblockAccessor {
    pub(crate) fn new(handle: Arc<SharedReader>, desc: SubblockDescriptor) -> Self {
        Self {
            handle,
            desc,
            decoded: None,
        }
    }

    /// Descriptor snapshot of the bound subblock
    pub fn descriptor(&self) -> &SubblockDescriptor {
        &self.desc
    }

    fn ensure_decoded(&mut self) -> Result<&Bytes> {
        // every operation checks liveness first, even when the decode is
        // already memoized
        if !self.handle.is_open() {
            return Err(CatalogError::Closed);
        }
        let pixels = match self.decoded.take() {
            Some(pixels) => pixels,
            None => {
                let desc = &self.desc;
                self.handle.with(|reader| {
                    let payload = reader.read_subblock_payload(desc.index)?;
                    decode_pixels(desc, &payload)
                })?
            }
        };
        Ok(self.decoded.insert(pixels))
    }

    /// Byte size of the decoded pixel buffer, decoding on first call
    pub fn decoded_pixel_byte_size(&mut self) -> Result<u64> {
        Ok(self.ensure_decoded()?.len() as u64)
    }

    /// Copy the decoded pixels into `destination`
    ///
    /// Returns the number of bytes copied: the full decoded length, or `0`
    /// when `destination` is too small.
    pub fn copy_pixels(&mut self, destination: &mut [u8]) -> Result<usize> {
        let pixels = self.ensure_decoded()?;
        if destination.len() < pixels.len() {
            return Ok(0);
        }
        destination[..pixels.len()].copy_from_slice(pixels);
        Ok(pixels.len())
    }

    /// Byte size of the embedded metadata or attachment blob
    pub fn raw_segment_size(&self, kind: SegmentKind) -> Result<u64> {
        let index = self.desc.index;
        self.handle
            .with(|reader| Ok(reader.read_subblock_segment(index, kind)?.len() as u64))
    }

    /// Copy the embedded metadata or attachment blob into `destination`
    ///
    /// Same short-buffer-returns-zero contract as [`copy_pixels`](Self::copy_pixels).
    pub fn copy_raw_segment(&self, kind: SegmentKind, destination: &mut [u8]) -> Result<usize> {
        let index = self.desc.index;
        let blob = self
            .handle
            .with(|reader| reader.read_subblock_segment(index, kind))?;
        if destination.len() < blob.len() {
            return Ok(0);
        }
        destination[..blob.len()].copy_from_slice(&blob);
        Ok(blob.len())
    }

    /// Drop the memoized decoded buffer; safe to call repeatedly
    pub fn release(&mut self) {
        self.decoded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::MemoryReader;
    use crate::catalog::Catalog;
    use crate::error::CatalogError;
    use crate::types::IntRect;

    fn one_tile_catalog() -> Catalog {
        let mut reader = MemoryReader::empty();
        reader.push_tile(0, 0, IntRect::new(0, 0, 4, 2), 7);
        reader.metadata_blobs[0] = b"<Tags/>".to_vec();
        Catalog::from_reader(Box::new(reader)).unwrap()
    }

    #[test]
    fn test_probe_then_copy_pixels() {
        let catalog = one_tile_catalog();
        let mut accessor = catalog.subblock(0).unwrap();

        let size = accessor.decoded_pixel_byte_size().unwrap();
        assert_eq!(size, 8);
        // size is stable across probes
        assert_eq!(accessor.decoded_pixel_byte_size().unwrap(), size);

        let mut buf = vec![0u8; size as usize];
        let copied = accessor.copy_pixels(&mut buf).unwrap();
        assert_eq!(copied, 8);
        assert_eq!(buf, vec![7u8; 8]);
    }

    #[test]
    fn test_short_buffer_copies_nothing() {
        let catalog = one_tile_catalog();
        let mut accessor = catalog.subblock(0).unwrap();

        let mut short = vec![0xEEu8; 7];
        assert_eq!(accessor.copy_pixels(&mut short).unwrap(), 0);
        // nothing was written
        assert_eq!(short, vec![0xEEu8; 7]);

        // an oversized destination still copies exactly the decoded length
        let mut large = vec![0xEEu8; 16];
        assert_eq!(accessor.copy_pixels(&mut large).unwrap(), 8);
        assert_eq!(&large[..8], &[7u8; 8]);
        assert_eq!(&large[8..], &[0xEEu8; 8]);
    }

    #[test]
    fn test_raw_segment_contract() {
        let catalog = one_tile_catalog();
        let accessor = catalog.subblock(0).unwrap();

        let size = accessor.raw_segment_size(SegmentKind::Metadata).unwrap();
        assert_eq!(size, 7);

        let mut short = vec![0u8; 3];
        assert_eq!(
            accessor
                .copy_raw_segment(SegmentKind::Metadata, &mut short)
                .unwrap(),
            0
        );

        let mut buf = vec![0u8; size as usize];
        assert_eq!(
            accessor
                .copy_raw_segment(SegmentKind::Metadata, &mut buf)
                .unwrap(),
            7
        );
        assert_eq!(&buf, b"<Tags/>");

        // absent attachment blob probes as zero-length
        assert_eq!(
            accessor.raw_segment_size(SegmentKind::Attachment).unwrap(),
            0
        );
        assert_eq!(
            accessor
                .copy_raw_segment(SegmentKind::Attachment, &mut [])
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_release_then_redecode() {
        let catalog = one_tile_catalog();
        let mut accessor = catalog.subblock(0).unwrap();

        assert_eq!(accessor.decoded_pixel_byte_size().unwrap(), 8);
        accessor.release();
        accessor.release();
        assert_eq!(accessor.decoded_pixel_byte_size().unwrap(), 8);
    }

    #[test]
    fn test_operations_after_close() {
        let catalog = one_tile_catalog();
        let mut accessor = catalog.subblock(0).unwrap();
        catalog.close();

        assert!(matches!(
            accessor.decoded_pixel_byte_size(),
            Err(CatalogError::Closed)
        ));
        assert!(matches!(
            accessor.copy_pixels(&mut [0u8; 8]),
            Err(CatalogError::Closed)
        ));
        assert!(matches!(
            accessor.raw_segment_size(SegmentKind::Metadata),
            Err(CatalogError::Closed)
        ));

        // the descriptor snapshot stays readable
        assert_eq!(accessor.descriptor().index, 0);
    }

    #[test]
    fn test_memoized_decode_does_not_bypass_close() {
        let catalog = one_tile_catalog();
        let mut accessor = catalog.subblock(0).unwrap();
        assert_eq!(accessor.decoded_pixel_byte_size().unwrap(), 8);

        // pixels were already decoded, but post-close operations still fail
        // uniformly rather than serving stale state
        catalog.close();
        assert!(matches!(
            accessor.decoded_pixel_byte_size(),
            Err(CatalogError::Closed)
        ));
        assert!(matches!(
            accessor.raw_segment_size(SegmentKind::Metadata),
            Err(CatalogError::Closed)
        ));
    }
}
