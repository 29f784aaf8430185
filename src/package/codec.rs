//! Physical encoding of a package to and from a compressed byte stream.
//!
//! The in-memory archive only deals with a map of canonical path to content.
//! An [`ArchiveCodec`] turns that map into bytes and back; [`ZipCodec`] is the
//! default and produces a conventional zip container.

use crate::package::error::{PackageError, Result};
use crate::package::options::{DecodeOptions, EncodeOptions, EntryInfo};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Archive content: canonical path to entry bytes.
pub type Entries = HashMap<String, Bytes>;

/// Lossless, order-independent conversion between [`Entries`] and bytes.
pub trait ArchiveCodec: Send + Sync {
    /// Encode every entry into a single byte stream.
    fn compress(&self, entries: &Entries, options: &EncodeOptions) -> Result<Vec<u8>>;

    /// Decode a byte stream produced by [`ArchiveCodec::compress`] (or any
    /// compatible producer).
    ///
    /// Input that cannot be decoded is reported as [`PackageError::CorruptArchive`].
    fn decompress(&self, data: &[u8], options: &DecodeOptions) -> Result<Entries>;
}

/// Zip codec backed by the `zip` crate.
///
/// Entries are written in sorted key order, so equal maps encode to equal bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipCodec;

impl ZipCodec {
    pub fn new() -> Self {
        Self
    }
}

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;

/// A name ending in `/` only marks a directory when the entry is empty and its
/// mode, if any, has the directory type. Keys such as `doc/media/img/` written
/// by [`ZipCodec::compress`] carry a file mode and survive decoding.
fn is_directory_entry(named_as_dir: bool, unix_mode: Option<u32>, size: u64) -> bool {
    named_as_dir && size == 0 && unix_mode.is_none_or(|mode| mode & S_IFMT == S_IFDIR)
}

impl ArchiveCodec for ZipCodec {
    fn compress(&self, entries: &Entries, options: &EncodeOptions) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let file_options = SimpleFileOptions::default()
            .compression_method(options.compression.into())
            .compression_level(options.level)
            .unix_permissions(0o644);

        let mut paths: Vec<&String> = entries.keys().collect();
        paths.sort();

        for path in paths {
            writer
                .start_file(path.as_str(), file_options)
                .map_err(|e| PackageError::Compression(format!("{}: {}", path, e)))?;
            writer
                .write_all(&entries[path])
                .map_err(|e| PackageError::Compression(format!("{}: {}", path, e)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| PackageError::Compression(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    fn decompress(&self, data: &[u8], options: &DecodeOptions) -> Result<Entries> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        if let Some(max_entries) = options.max_entries {
            if archive.len() > max_entries {
                return Err(PackageError::CorruptArchive(format!(
                    "archive has {} entries, limit is {}",
                    archive.len(),
                    max_entries
                )));
            }
        }

        let mut entries = Entries::with_capacity(archive.len());
        let mut total_size: u64 = 0;

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if is_directory_entry(file.is_dir(), file.unix_mode(), file.size()) {
                continue;
            }

            let info = EntryInfo {
                name: file.name().to_string(),
                compressed_size: file.compressed_size(),
                size: file.size(),
            };
            if !options.accepts(&info) {
                continue;
            }

            let mut content = Vec::new();
            let read = match options.max_total_size {
                Some(max_total_size) => {
                    let budget = max_total_size.saturating_sub(total_size);
                    let read = file.by_ref().take(budget.saturating_add(1)).read_to_end(&mut content);
                    if content.len() as u64 > budget {
                        return Err(PackageError::CorruptArchive(format!(
                            "uncompressed size exceeds limit of {} bytes at '{}'",
                            max_total_size, info.name
                        )));
                    }
                    read
                }
                None => file.read_to_end(&mut content),
            };
            read.map_err(|e| PackageError::CorruptArchive(format!("{}: {}", info.name, e)))?;

            total_size = total_size.saturating_add(content.len() as u64);
            entries.insert(info.name, Bytes::from(content));
        }

        Ok(entries)
    }
}
