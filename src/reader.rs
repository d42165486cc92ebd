//! Container reader seam and the directory-layout backend
//!
//! The binary segment walk, the pixel codecs beyond zstd, and the XML
//! metadata parser live behind [`ContainerReader`]. The one backend shipped
//! here reads an "unpacked" container: a directory holding a `container.json`
//! manifest plus one blob file per subblock payload and attachment.

use crate::coordinate::Coordinate;
use crate::descriptor::{AttachmentDescriptor, SubblockDescriptor, FILE_POSITION_NONE};
use crate::error::{CatalogError, Result};
use crate::types::{CompressionMode, FileHeader, IntRect, IntSize, PixelType, PyramidClass};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Manifest file name inside an unpacked container directory
pub const MANIFEST_NAME: &str = "container.json";

/// Embedded per-subblock segment kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// The subblock's XML metadata blob
    Metadata,
    /// The subblock's binary attachment blob
    Attachment,
}

/// Capability set consumed by the catalog
///
/// Implementations must yield a finite enumeration with dense 0-based indices
/// in a stable order; re-enumeration restarts from the beginning.
pub trait ContainerReader: Send {
    /// Whole-file header fields
    fn file_header(&self) -> FileHeader;

    /// Total number of subblocks
    fn subblock_count(&self) -> usize;

    /// Visit every subblock in order; the visitor returns `false` to stop
    fn enumerate_subblocks(
        &self,
        visit: &mut dyn FnMut(usize, &SubblockDescriptor) -> bool,
    ) -> Result<()>;

    /// Compressed pixel payload of one subblock
    fn read_subblock_payload(&self, index: usize) -> Result<Vec<u8>>;

    /// Embedded metadata or attachment blob of one subblock; empty when absent
    fn read_subblock_segment(&self, index: usize, kind: SegmentKind) -> Result<Vec<u8>>;

    /// Whole-container metadata segment as UTF-8 XML text
    fn metadata_xml(&self) -> Result<String>;

    /// Attachment directory entries
    fn attachments(&self) -> Result<Vec<AttachmentDescriptor>>;

    /// Raw bytes of one attachment
    fn read_attachment(&self, index: usize) -> Result<Vec<u8>>;
}

/// Serialized manifest of an unpacked container
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub header: ManifestHeader,
    /// Relative path of the metadata XML document, if present
    #[serde(default)]
    pub metadata_xml: Option<String>,
    #[serde(default)]
    pub subblocks: Vec<ManifestSubblock>,
    #[serde(default)]
    pub attachments: Vec<ManifestAttachment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub guid: Uuid,
    pub major_version: u32,
    pub minor_version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestSubblock {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub m_index: Option<i32>,
    pub logical: IntRect,
    pub physical: IntSize,
    pub pixel_type: PixelType,
    pub compression: CompressionMode,
    pub pyramid: PyramidClass,
    /// Relative path of the compressed pixel payload
    pub payload: String,
    /// Relative path of the embedded metadata blob
    #[serde(default)]
    pub metadata: Option<String>,
    /// Relative path of the embedded attachment blob
    #[serde(default)]
    pub attachment: Option<String>,
    /// Original on-disk position, when the manifest preserves it
    #[serde(default)]
    pub file_position: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestAttachment {
    pub content_guid: Uuid,
    pub content_file_type: String,
    pub name: String,
    /// Relative path of the attachment bytes
    pub data: String,
}

/// Reader over an unpacked container directory
pub struct DirectoryReader {
    base_path: PathBuf,
    header: FileHeader,
    metadata_xml: Option<String>,
    descriptors: Vec<SubblockDescriptor>,
    subblocks: Vec<ManifestSubblock>,
    attachments: Vec<ManifestAttachment>,
}

impl DirectoryReader {
    /// Open an unpacked container rooted at `base_path`
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        let manifest_path = base_path.join(MANIFEST_NAME);
        let raw = fs::read(&manifest_path).map_err(|e| {
            CatalogError::OpenFailed(format!("{}: {}", manifest_path.display(), e))
        })?;
        let manifest: Manifest = serde_json::from_slice(&raw)
            .map_err(|e| CatalogError::OpenFailed(format!("malformed manifest: {}", e)))?;

        let header = FileHeader::new(
            manifest.header.guid,
            manifest.header.major_version,
            manifest.header.minor_version,
        );

        let descriptors = manifest
            .subblocks
            .iter()
            .enumerate()
            .map(|(index, sb)| SubblockDescriptor {
                coordinate: sb.coordinate,
                m_index: sb.m_index,
                logical: sb.logical,
                physical: sb.physical,
                pixel_type: sb.pixel_type,
                compression: sb.compression,
                pyramid: sb.pyramid,
                file_position: sb.file_position.unwrap_or(FILE_POSITION_NONE),
                index,
            })
            .collect();

        tracing::debug!(
            path = %base_path.display(),
            subblocks = manifest.subblocks.len(),
            attachments = manifest.attachments.len(),
            "opened unpacked container"
        );

        Ok(Self {
            base_path,
            header,
            metadata_xml: manifest.metadata_xml,
            descriptors,
            subblocks: manifest.subblocks,
            attachments: manifest.attachments,
        })
    }

    fn read_blob(&self, relative: &str) -> Result<Vec<u8>> {
        let path = self.base_path.join(relative);
        fs::read(&path).map_err(CatalogError::Io)
    }

    fn subblock_entry(&self, index: usize) -> Result<&ManifestSubblock> {
        self.subblocks
            .get(index)
            .ok_or_else(|| CatalogError::NotFound(format!("subblock index {}", index)))
    }
}

impl ContainerReader for DirectoryReader {
    fn file_header(&self) -> FileHeader {
        self.header
    }

    fn subblock_count(&self) -> usize {
        self.descriptors.len()
    }

    fn enumerate_subblocks(
        &self,
        visit: &mut dyn FnMut(usize, &SubblockDescriptor) -> bool,
    ) -> Result<()> {
        for desc in &self.descriptors {
            if !visit(desc.index, desc) {
                break;
            }
        }
        Ok(())
    }

    fn read_subblock_payload(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self.subblock_entry(index)?;
        self.read_blob(&entry.payload)
    }

    fn read_subblock_segment(&self, index: usize, kind: SegmentKind) -> Result<Vec<u8>> {
        let entry = self.subblock_entry(index)?;
        let relative = match kind {
            SegmentKind::Metadata => entry.metadata.as_deref(),
            SegmentKind::Attachment => entry.attachment.as_deref(),
        };
        match relative {
            Some(rel) => self.read_blob(rel),
            None => Ok(Vec::new()),
        }
    }

    fn metadata_xml(&self) -> Result<String> {
        let relative = self
            .metadata_xml
            .as_deref()
            .ok_or_else(|| CatalogError::Metadata("container has no metadata segment".into()))?;
        let bytes = self.read_blob(relative)?;
        String::from_utf8(bytes).map_err(|e| CatalogError::Metadata(e.to_string()))
    }

    fn attachments(&self) -> Result<Vec<AttachmentDescriptor>> {
        Ok(self
            .attachments
            .iter()
            .enumerate()
            .map(|(index, att)| AttachmentDescriptor {
                content_guid: att.content_guid,
                content_file_type: att.content_file_type.clone(),
                name: att.name.clone(),
                index,
            })
            .collect())
    }

    fn read_attachment(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .attachments
            .get(index)
            .ok_or_else(|| CatalogError::NotFound(format!("attachment index {}", index)))?;
        self.read_blob(&entry.data)
    }
}

/// Resolve `path` and open the matching reader backend
///
/// A directory (or a path to a `container.json` manifest inside one) opens the
/// [`DirectoryReader`]; anything else fails with `OpenFailed`.
pub fn open_container(path: impl AsRef<Path>) -> Result<Box<dyn ContainerReader>> {
    let path = path.as_ref();

    if path.is_dir() {
        return Ok(Box::new(DirectoryReader::open(path)?));
    }

    if path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_NAME) {
        if let Some(parent) = path.parent() {
            return Ok(Box::new(DirectoryReader::open(parent)?));
        }
    }

    Err(CatalogError::OpenFailed(format!(
        "{}: not an unpacked container directory",
        path.display()
    )))
}
