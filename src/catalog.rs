//! Container catalog - the materialized subblock index

use crate::accessor::SubblockAccessor;
use crate::descriptor::{AttachmentDescriptor, SubblockDescriptor};
use crate::error::{CatalogError, Result};
use crate::ranges::{CatalogStatistics, DimensionRanges, SceneBoundingBox, SceneBoundingBoxes};
use crate::reader::{open_container, ContainerReader};
use crate::types::FileHeader;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Closable shared handle to the container reader
///
/// The catalog and all accessors derived from it share one underlying reader.
/// `close()` takes the reader out; afterwards every operation routed through
/// the handle fails with `Closed`. Holding the `Arc` alone can never revive a
/// closed handle, which gives accessors non-owning semantics.
pub(crate) struct SharedReader {
    inner: Mutex<Option<Box<dyn ContainerReader>>>,
}

impl SharedReader {
    fn new(reader: Box<dyn ContainerReader>) -> Self {
        Self {
            inner: Mutex::new(Some(reader)),
        }
    }

    /// Run `f` against the live reader, or fail with `Closed`
    pub(crate) fn with<T>(&self, f: impl FnOnce(&dyn ContainerReader) -> Result<T>) -> Result<T> {
        let guard = self.inner.lock();
        match guard.as_deref() {
            Some(reader) => f(reader),
            None => Err(CatalogError::Closed),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.inner.lock().is_some()
    }

    fn close(&self) {
        self.inner.lock().take();
    }
}

/// Read-side index of one open container
///
/// Built once, synchronously, at open time by a single enumeration pass; the
/// tables are never mutated afterwards. One catalog instance is meant for one
/// thread; concurrent use requires independent instances.
pub struct Catalog {
    handle: Arc<SharedReader>,
    header: FileHeader,
    descriptors: Vec<SubblockDescriptor>,
    ranges: DimensionRanges,
    scenes: SceneBoundingBoxes,
}

impl Catalog {
    /// Open the container at `path` and build the catalog
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(open_container(path)?)
    }

    /// Build the catalog over an already-opened reader backend
    pub fn from_reader(reader: Box<dyn ContainerReader>) -> Result<Self> {
        let header = reader.file_header();

        let mut stats = CatalogStatistics::new();
        let mut descriptors = Vec::with_capacity(reader.subblock_count());
        reader.enumerate_subblocks(&mut |_, desc| {
            // the catalog index is assigned here, in enumeration order
            let mut desc = desc.clone();
            desc.index = descriptors.len();
            stats.observe(&desc);
            descriptors.push(desc);
            true
        })?;
        let (ranges, scenes) = stats.finish();

        tracing::debug!(
            guid = %header.guid_string(),
            subblocks = descriptors.len(),
            scenes = scenes.len(),
            "catalog built"
        );

        Ok(Self {
            handle: Arc::new(SharedReader::new(reader)),
            header,
            descriptors,
            ranges,
            scenes,
        })
    }

    /// Occupied interval per dimension symbol
    pub fn dimension_ranges(&self) -> &DimensionRanges {
        &self.ranges
    }

    /// Bounding boxes of one scene; `None` when the scene has no tiles
    pub fn scene_bounding_box(&self, scene: i32) -> Option<SceneBoundingBox> {
        self.scenes.get(scene)
    }

    /// The per-scene bounding box table
    pub fn scene_bounding_boxes(&self) -> &SceneBoundingBoxes {
        &self.scenes
    }

    /// All catalog entries in enumeration order
    pub fn subblocks(&self) -> impl Iterator<Item = &SubblockDescriptor> {
        self.descriptors.iter()
    }

    /// Catalog entries restricted to native-resolution tiles
    ///
    /// A pure filter over the materialized list; the container is not
    /// re-enumerated.
    pub fn subblocks_level0(&self) -> impl Iterator<Item = &SubblockDescriptor> {
        self.descriptors.iter().filter(|d| d.is_level0())
    }

    /// Total number of catalog entries
    pub fn subblock_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Descriptor at `index`, if in range
    pub fn descriptor(&self, index: usize) -> Option<&SubblockDescriptor> {
        self.descriptors.get(index)
    }

    /// Acquire an accessor bound to the subblock at `index`
    pub fn subblock(&self, index: usize) -> Result<SubblockAccessor> {
        if !self.handle.is_open() {
            return Err(CatalogError::Closed);
        }
        let desc = self
            .descriptors
            .get(index)
            .ok_or_else(|| {
                CatalogError::NotFound(format!(
                    "subblock index {} out of range 0..{}",
                    index,
                    self.descriptors.len()
                ))
            })?
            .clone();
        Ok(SubblockAccessor::new(Arc::clone(&self.handle), desc))
    }

    /// Whole-container metadata segment as UTF-8 XML text
    pub fn metadata_xml(&self) -> Result<String> {
        self.handle.with(|reader| reader.metadata_xml())
    }

    /// Whole-file header fields
    pub fn file_header(&self) -> Result<FileHeader> {
        if !self.handle.is_open() {
            return Err(CatalogError::Closed);
        }
        Ok(self.header)
    }

    /// Attachment directory entries
    pub fn attachments(&self) -> Result<Vec<AttachmentDescriptor>> {
        self.handle.with(|reader| reader.attachments())
    }

    /// Raw bytes of the attachment at `index`
    pub fn attachment_data(&self, index: usize) -> Result<Vec<u8>> {
        self.handle.with(|reader| reader.read_attachment(index))
    }

    /// Release the underlying reader; idempotent
    ///
    /// Outstanding accessors stay allocated but every operation on them fails
    /// with `Closed` from this point on.
    pub fn close(&self) {
        self.handle.close();
    }

    /// True until `close()` is called
    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        self.handle.close();
    }
}
