//! `.mddoc` package implementation.
//!
//! A package is a zip archive with a fixed layout (`doc/`, `doc/media/`,
//! `doc/theme/`, `docProps/`, ...). This module provides:
//!
//! - Path classification and resolution into canonical archive keys
//! - An ordered, async lifecycle hook pipeline
//! - The in-memory archive store and its zip codec
//! - The [`MddocPackage`] facade and typed document properties

pub mod codec;
pub mod constants;
pub mod document;
pub mod error;
pub mod hooks;
pub mod options;
pub mod packpath;
pub mod properties;
pub mod store;

// Re-export commonly used types
pub use codec::{ArchiveCodec, Entries, ZipCodec};
pub use document::{MddocPackage, OutputFormat, PackageBuilder, SavedArchive};
pub use error::{BoxError, PackageError, Result};
pub use hooks::{HookEvent, HookId, HookListener, HookName, HookPipeline, ListenerResult};
pub use options::{CompressionMethod, DecodeOptions, EncodeOptions, EntryFilter, EntryInfo};
pub use packpath::{FixedPath, PathKind};
pub use properties::{AppDocProps, CoreDocProps};
pub use store::ArchiveStore;
