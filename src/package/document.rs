//! The `.mddoc` package facade.
//!
//! [`MddocPackage`] is the main API type: it owns the archive store and the hook
//! pipeline, resolves user-facing references into canonical keys and exposes
//! get/set/delete/save. Construction goes through [`PackageBuilder`], which is
//! the only way to run the initialization lifecycle, and runs it exactly once.

use crate::package::codec::{ArchiveCodec, Entries, ZipCodec};
use crate::package::constants::file;
use crate::package::error::Result;
use crate::package::hooks::{HookEvent, HookName, HookPipeline};
use crate::package::options::{DecodeOptions, EncodeOptions};
use crate::package::packpath;
use crate::package::properties::{AppDocProps, CoreDocProps};
use crate::package::store::ArchiveStore;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::sync::Arc;

/// Representation of the bytes returned by [`MddocPackage::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain `Vec<u8>`
    #[default]
    Bytes,
    /// Shared [`bytes::Bytes`] buffer
    Buffer,
    /// Fixed-size boxed slice
    Array,
}

/// A saved package. All variants hold the same underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedArchive {
    Bytes(Vec<u8>),
    Buffer(Bytes),
    Array(Box<[u8]>),
}

impl SavedArchive {
    fn new(bytes: Vec<u8>, format: OutputFormat) -> Self {
        match format {
            OutputFormat::Bytes => SavedArchive::Bytes(bytes),
            OutputFormat::Buffer => SavedArchive::Buffer(Bytes::from(bytes)),
            OutputFormat::Array => SavedArchive::Array(bytes.into_boxed_slice()),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            SavedArchive::Bytes(_) => OutputFormat::Bytes,
            SavedArchive::Buffer(_) => OutputFormat::Buffer,
            SavedArchive::Array(_) => OutputFormat::Array,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            SavedArchive::Bytes(bytes) => &bytes[..],
            SavedArchive::Buffer(bytes) => &bytes[..],
            SavedArchive::Array(bytes) => &bytes[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        match self {
            SavedArchive::Bytes(bytes) => bytes,
            SavedArchive::Buffer(bytes) => bytes.into(),
            SavedArchive::Array(bytes) => bytes.into_vec(),
        }
    }
}

impl AsRef<[u8]> for SavedArchive {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// An uninitialized package.
///
/// Listeners registered on [`PackageBuilder::hooks`] observe the
/// initialization hooks (`before:init`, `init`, `after:init`) of the package
/// being built.
///
/// # Example
///
/// ```
/// use mddoc::{HookName, PackageBuilder};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mddoc::Result<()> {
/// let builder = PackageBuilder::new();
/// builder.hooks().register_fn(HookName::AfterInit, |_| {
///     println!("package ready");
///     Ok(())
/// });
/// let pkg = builder.blank().await?;
/// assert_eq!(pkg.paths().await, vec!["doc/index.md".to_string()]);
/// # Ok(())
/// # }
/// ```
pub struct PackageBuilder {
    hooks: Arc<HookPipeline>,
    codec: Arc<dyn ArchiveCodec>,
    decode_options: DecodeOptions,
    encode_options: EncodeOptions,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self {
            hooks: Arc::new(HookPipeline::new()),
            codec: Arc::new(ZipCodec::new()),
            decode_options: DecodeOptions::default(),
            encode_options: EncodeOptions::default(),
        }
    }

    /// Hook pipeline the package will own.
    pub fn hooks(&self) -> &HookPipeline {
        &self.hooks
    }

    /// Replace the zip codec.
    pub fn codec<C>(mut self, codec: C) -> Self
    where
        C: ArchiveCodec + 'static,
    {
        self.codec = Arc::new(codec);
        self
    }

    /// Options used to decode the input passed to [`PackageBuilder::open`].
    pub fn decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    /// Default options for [`MddocPackage::save`].
    pub fn encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode_options = options;
        self
    }

    /// Initialize a blank document: a single empty `doc/index.md`.
    pub async fn blank(self) -> Result<MddocPackage> {
        self.init(None).await
    }

    /// Initialize from an encoded package.
    ///
    /// Fails with [`PackageError::CorruptArchive`](crate::PackageError::CorruptArchive)
    /// if `data` cannot be decoded.
    pub async fn open(self, data: &[u8]) -> Result<MddocPackage> {
        self.init(Some(data)).await
    }

    /// Initialize from an encoded package read to the end of `reader`.
    pub async fn from_reader<R: Read>(self, mut reader: R) -> Result<MddocPackage> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.open(&data).await
    }

    async fn init(self, data: Option<&[u8]>) -> Result<MddocPackage> {
        let Self {
            hooks,
            codec,
            decode_options,
            encode_options,
        } = self;

        hooks.fire(HookName::BeforeInit, HookEvent::Init).await?;

        let store = match data {
            Some(data) => {
                let store = ArchiveStore::new(Arc::clone(&hooks), codec);
                store.deserialize(data, &decode_options).await?;
                store
            }
            None => ArchiveStore::with_entries(MddocPackage::blank_entries(), Arc::clone(&hooks), codec),
        };

        hooks.fire(HookName::Init, HookEvent::Init).await?;
        hooks.fire(HookName::AfterInit, HookEvent::Init).await?;

        log::debug!("initialized package with {} entries", store.len().await);
        Ok(MddocPackage {
            store,
            hooks,
            encode_options,
        })
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An initialized `.mddoc` package held in memory.
///
/// Entries are addressed by references that are resolved into canonical keys
/// (see [`packpath::resolve`]): `"theme1.json"` maps to `doc/theme/theme1.json`,
/// `"logo.png"` to `doc/media/logo.png`, and fixed paths such as
/// `"doc/setting.json"` are used as is. The `*_raw` methods take canonical keys
/// directly.
///
/// # Example
///
/// ```
/// use mddoc::{MddocPackage, OutputFormat};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mddoc::Result<()> {
/// let pkg = MddocPackage::new().await?;
/// pkg.set("logo.png", vec![0x89u8, 0x50, 0x4e, 0x47]).await?;
/// let saved = pkg.save(OutputFormat::Bytes).await?;
///
/// let reopened = MddocPackage::open(saved.as_bytes()).await?;
/// assert!(reopened.contains("logo.png").await);
/// # Ok(())
/// # }
/// ```
pub struct MddocPackage {
    store: ArchiveStore,
    hooks: Arc<HookPipeline>,
    encode_options: EncodeOptions,
}

impl MddocPackage {
    pub fn builder() -> PackageBuilder {
        PackageBuilder::new()
    }

    /// Create a blank document with no listeners attached.
    pub async fn new() -> Result<Self> {
        PackageBuilder::new().blank().await
    }

    /// Decode a package with no listeners attached.
    pub async fn open(data: &[u8]) -> Result<Self> {
        PackageBuilder::new().open(data).await
    }

    /// Content of a blank document.
    pub fn blank_entries() -> Entries {
        let mut entries = Entries::new();
        entries.insert(file::INDEX.to_string(), Bytes::new());
        entries
    }

    /// Encoded bytes of a blank document.
    pub fn blank_bytes() -> Result<Vec<u8>> {
        ZipCodec::new().compress(&Self::blank_entries(), &EncodeOptions::default())
    }

    /// The hook pipeline owned by this package.
    pub fn hooks(&self) -> &HookPipeline {
        &self.hooks
    }

    /// The underlying canonical-keyed store.
    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// Read the entry a reference resolves to.
    pub async fn get(&self, reference: &str) -> Option<Bytes> {
        self.store.read(&packpath::resolve(reference, true)).await
    }

    /// Store `data` under the key a reference resolves to.
    pub async fn set(&self, reference: &str, data: impl Into<Bytes>) -> Result<()> {
        let path = packpath::resolve(reference, true);
        log::debug!("set '{}' -> '{}'", reference, path);
        self.store.write(&path, data.into()).await
    }

    /// Delete the entry a reference resolves to. Missing entries are ignored.
    pub async fn delete(&self, reference: &str) -> Result<()> {
        let path = packpath::resolve(reference, true);
        log::debug!("delete '{}' -> '{}'", reference, path);
        self.store.remove(&path).await
    }

    /// Read by canonical key.
    pub async fn get_raw(&self, path: &str) -> Option<Bytes> {
        self.store.read(&packpath::resolve(path, false)).await
    }

    /// Write by canonical key.
    pub async fn set_raw(&self, path: &str, data: impl Into<Bytes>) -> Result<()> {
        self.store.write(&packpath::resolve(path, false), data.into()).await
    }

    /// Delete by canonical key.
    pub async fn delete_raw(&self, path: &str) -> Result<()> {
        self.store.remove(&packpath::resolve(path, false)).await
    }

    /// Whether the key a reference resolves to is present. Fires no hook.
    pub async fn contains(&self, reference: &str) -> bool {
        self.store.contains(&packpath::resolve(reference, true)).await
    }

    /// Canonical keys of all entries, sorted.
    pub async fn paths(&self) -> Vec<String> {
        self.store.paths().await
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    /// Encode the package with the builder's encode options.
    pub async fn save(&self, format: OutputFormat) -> Result<SavedArchive> {
        self.save_with(format, &self.encode_options).await
    }

    /// Encode the package with explicit options.
    pub async fn save_with(&self, format: OutputFormat, options: &EncodeOptions) -> Result<SavedArchive> {
        let bytes = self.store.serialize(options).await?;
        log::debug!("saved package ({} bytes, {:?})", bytes.len(), format);
        Ok(SavedArchive::new(bytes, format))
    }

    /// Encode the package into a plain byte vector.
    pub async fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.save(OutputFormat::Bytes).await?.into_vec())
    }

    /// Encode the package and write it to `writer`.
    pub async fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let bytes = self.to_bytes().await?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Parsed `docProps/core.json`, `None` if the entry is missing.
    pub async fn core_props(&self) -> Result<Option<CoreDocProps>> {
        self.read_json(file::CORE_DOC_PROPS).await
    }

    pub async fn set_core_props(&self, props: &CoreDocProps) -> Result<()> {
        self.write_json(file::CORE_DOC_PROPS, props).await
    }

    /// Parsed `docProps/app.json`, `None` if the entry is missing.
    pub async fn app_props(&self) -> Result<Option<AppDocProps>> {
        self.read_json(file::APP_DOC_PROPS).await
    }

    pub async fn set_app_props(&self, props: &AppDocProps) -> Result<()> {
        self.write_json(file::APP_DOC_PROPS, props).await
    }

    /// Parsed `docProps/custom.json`, `None` if the entry is missing.
    pub async fn custom_props(&self) -> Result<Option<serde_json::Map<String, serde_json::Value>>> {
        self.read_json(file::CUSTOM_DOC_PROPS).await
    }

    pub async fn set_custom_props(&self, props: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
        self.write_json(file::CUSTOM_DOC_PROPS, props).await
    }

    /// Parsed `doc/setting.json`, `None` if the entry is missing.
    pub async fn settings(&self) -> Result<Option<serde_json::Value>> {
        self.read_json(file::SETTING).await
    }

    pub async fn set_settings(&self, settings: &serde_json::Value) -> Result<()> {
        self.write_json(file::SETTING, settings).await
    }

    async fn read_json<T: DeserializeOwned>(&self, reference: &str) -> Result<Option<T>> {
        match self.get(reference).await {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, reference: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        self.set(reference, json).await
    }
}

impl std::fmt::Debug for MddocPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MddocPackage")
            .field("store", &self.store)
            .field("encode_options", &self.encode_options)
            .finish()
    }
}
