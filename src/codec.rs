//! Pixel payload decoding
//!
//! Maps a subblock's compression mode to the transform producing its raw
//! pixel buffer. JPEG and JPEG-XR payloads are not decoded here; requesting
//! them fails with `DecodeFailed` so the caller can route those tiles to an
//! external codec.

use crate::descriptor::SubblockDescriptor;
use crate::error::{CatalogError, Result};
use crate::types::CompressionMode;
use bytes::Bytes;

/// Transform a compressed payload into raw pixel bytes
pub trait PixelCodec: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>>;

    fn mode(&self) -> CompressionMode;
}

/// Pass-through for uncompressed payloads
#[derive(Debug, Default)]
pub struct RawCodec;

impl PixelCodec for RawCodec {
    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        Ok(payload.to_vec())
    }

    fn mode(&self) -> CompressionMode {
        CompressionMode::Uncompressed
    }
}

/// Plain zstd frame
#[derive(Debug, Default)]
pub struct Zstd0Codec;

impl PixelCodec for Zstd0Codec {
    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        zstd::decode_all(payload).map_err(|e| CatalogError::DecodeFailed(e.to_string()))
    }

    fn mode(&self) -> CompressionMode {
        CompressionMode::Zstd0
    }
}

/// Zstd frame preceded by a chunk header
///
/// The first byte gives the header size (itself included); the zstd frame
/// starts after it.
#[derive(Debug, Default)]
pub struct Zstd1Codec;

impl PixelCodec for Zstd1Codec {
    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let header_size = *payload
            .first()
            .ok_or_else(|| CatalogError::DecodeFailed("empty zstd1 payload".into()))?
            as usize;
        if header_size == 0 || payload.len() < header_size {
            return Err(CatalogError::DecodeFailed(format!(
                "truncated zstd1 chunk header: {} of {} bytes",
                payload.len(),
                header_size
            )));
        }
        zstd::decode_all(&payload[header_size..])
            .map_err(|e| CatalogError::DecodeFailed(e.to_string()))
    }

    fn mode(&self) -> CompressionMode {
        CompressionMode::Zstd1
    }
}

/// Codec for a compression mode, if one is available in-process
pub fn get_codec(mode: CompressionMode) -> Option<Box<dyn PixelCodec>> {
    match mode {
        CompressionMode::Uncompressed => Some(Box::new(RawCodec)),
        CompressionMode::Zstd0 => Some(Box::new(Zstd0Codec)),
        CompressionMode::Zstd1 => Some(Box::new(Zstd1Codec)),
        CompressionMode::Jpg | CompressionMode::JpgXr | CompressionMode::Invalid => None,
    }
}

/// Decode a subblock's payload and validate the result against its geometry
///
/// The decoded length must equal `physical.w * physical.h * bytes_per_pixel`;
/// anything else is a `DecodeFailed`.
pub fn decode_pixels(desc: &SubblockDescriptor, payload: &[u8]) -> Result<Bytes> {
    let codec = get_codec(desc.compression).ok_or_else(|| {
        CatalogError::DecodeFailed(format!("no in-process codec for {:?}", desc.compression))
    })?;
    let decoded = codec.decode(payload)?;

    let expected = desc.decoded_size_bytes();
    if decoded.len() as u64 != expected {
        tracing::warn!(
            index = desc.index,
            expected,
            actual = decoded.len(),
            "decoded pixel buffer has unexpected size"
        );
        return Err(CatalogError::DecodeFailed(format!(
            "decoded {} bytes, geometry requires {}",
            decoded.len(),
            expected
        )));
    }
    Ok(Bytes::from(decoded))
}
