//! Encode and decode options for the package codec.

use std::fmt;
use std::sync::Arc;

/// Compression applied to each entry when a package is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// Entries are stored without compression
    Stored,
    /// Entries are Deflate-compressed
    #[default]
    Deflated,
}

impl From<CompressionMethod> for zip::CompressionMethod {
    fn from(method: CompressionMethod) -> Self {
        match method {
            CompressionMethod::Stored => zip::CompressionMethod::Stored,
            CompressionMethod::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Options used when serializing a package.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Compression method for every entry
    pub compression: CompressionMethod,
    /// Compression level, `None` for the codec default
    pub level: Option<i64>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_level(mut self, level: i64) -> Self {
        self.level = Some(level);
        self
    }
}

/// Header information about an archive entry, handed to an [`EntryFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Entry name as stored in the archive
    pub name: String,
    /// Compressed size in bytes
    pub compressed_size: u64,
    /// Uncompressed size in bytes, as declared by the entry header
    pub size: u64,
}

/// Predicate deciding whether an entry is kept when a package is decoded.
pub type EntryFilter = Arc<dyn Fn(&EntryInfo) -> bool + Send + Sync>;

/// Options used when decoding a package from bytes.
///
/// Limit violations are reported as a corrupt archive.
#[derive(Clone, Default)]
pub struct DecodeOptions {
    /// Maximum number of file entries
    pub max_entries: Option<usize>,
    /// Maximum total uncompressed size of all kept entries
    pub max_total_size: Option<u64>,
    /// Only entries accepted by the filter are kept
    pub filter: Option<EntryFilter>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn with_max_total_size(mut self, max_total_size: u64) -> Self {
        self.max_total_size = Some(max_total_size);
        self
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&EntryInfo) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Whether `entry` passes the configured filter.
    #[inline]
    pub fn accepts(&self, entry: &EntryInfo) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(entry))
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("max_entries", &self.max_entries)
            .field("max_total_size", &self.max_total_size)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
