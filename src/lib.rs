//! mddoc - an in-memory container for `.mddoc` document packages
//!
//! A `.mddoc` document is a single zip archive with a fixed layout:
//!
//! ```text
//! doc/index.md          main markdown content
//! doc/media/...         images, video, ...
//! doc/theme/themeN.json themes
//! doc/setting.json      document settings
//! docProps/app.json     application properties
//! docProps/core.json    core properties
//! docProps/custom.json  custom properties
//! ```
//!
//! # Features
//!
//! - **Path resolution**: short references like `"logo.png"` or `"theme1.json"`
//!   resolve to their canonical archive keys
//! - **Lifecycle hooks**: ordered, awaited listeners around init, reads, writes,
//!   deletes and saves, any of which can veto the operation
//! - **Zip serialization**: lossless round trip through a standard zip container
//! - **Document properties**: typed access to the `docProps` entries
//!
//! # Example - Creating and saving a document
//!
//! ```
//! use mddoc::{MddocPackage, OutputFormat};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mddoc::Result<()> {
//! let pkg = MddocPackage::new().await?;
//! pkg.set("doc/index.md", "# Hello").await?;
//! pkg.set("theme1.json", r#"{"dark":true}"#).await?;
//!
//! let saved = pkg.save(OutputFormat::Bytes).await?;
//! let reopened = MddocPackage::open(saved.as_bytes()).await?;
//! assert_eq!(
//!     reopened.paths().await,
//!     vec!["doc/index.md", "doc/theme/theme1.json"]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Observing and vetoing writes
//!
//! ```
//! use mddoc::{HookName, MddocPackage};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mddoc::Result<()> {
//! let pkg = MddocPackage::new().await?;
//! pkg.hooks().register_fn(HookName::BeforeSetData, |event| {
//!     match event.data() {
//!         Some(data) if data.len() > 1024 => Err("entry too large".into()),
//!         _ => Ok(()),
//!     }
//! });
//!
//! assert!(pkg.set("small.png", vec![0u8; 16]).await.is_ok());
//! assert!(pkg.set("large.png", vec![0u8; 4096]).await.is_err());
//! assert!(!pkg.contains("large.png").await);
//! # Ok(())
//! # }
//! ```

/// `.mddoc` package implementation
///
/// Path resolution, the hook pipeline, the archive store, the zip codec and
/// the [`MddocPackage`] facade.
pub mod package;

// Re-export commonly used types for convenience
pub use package::packpath;
pub use package::{
    AppDocProps, ArchiveCodec, ArchiveStore, BoxError, CompressionMethod, CoreDocProps,
    DecodeOptions, EncodeOptions, Entries, EntryFilter, EntryInfo, FixedPath, HookEvent, HookId,
    HookListener, HookName, HookPipeline, ListenerResult, MddocPackage, OutputFormat,
    PackageBuilder, PackageError, PathKind, Result, SavedArchive, ZipCodec,
};
