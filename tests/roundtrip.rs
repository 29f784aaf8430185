//! Round-trip and path-resolution properties of `.mddoc` packages.

use bytes::Bytes;
use mddoc::{DecodeOptions, Entries, MddocPackage, OutputFormat, PackageBuilder, PackageError, packpath};
use proptest::prelude::*;
use std::collections::HashMap;
use std::io::{Cursor, Seek, SeekFrom, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime")
}

/// Zip produced by another tool, with directory entries.
fn external_package() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.add_directory("doc/", options).unwrap();
    writer.start_file("doc/index.md", options).unwrap();
    writer.write_all(b"# External\n").unwrap();
    writer.add_directory("doc/media/", options).unwrap();
    writer.start_file("doc/media/cover.jpg", options).unwrap();
    writer.write_all(&[0xff, 0xd8, 0xff, 0xe0]).unwrap();
    writer.start_file("docProps/core.json", options).unwrap();
    writer
        .write_all(br#"{"title":"External","creator":"Ann; Bob","revision":3}"#)
        .unwrap();

    writer.finish().unwrap().into_inner()
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,10}"
}

fn key_strategy() -> impl Strategy<Value = String> {
    (proptest::collection::vec(segment(), 1..4), any::<bool>()).prop_map(|(parts, trailing)| {
        let key = parts.join("/");
        if trailing { key + "/" } else { key }
    })
}

proptest! {
    #[test]
    fn theme_references_resolve_under_theme_dir(n in 0u32..100_000, slash in any::<bool>()) {
        let reference = format!("{}theme{}.json", if slash { "/" } else { "" }, n);
        prop_assert_eq!(packpath::resolve(&reference, true), format!("doc/theme/theme{}.json", n));
    }

    #[test]
    fn other_references_resolve_under_media_dir(reference in key_strategy()) {
        prop_assume!(!packpath::is_fixed_path(&reference));
        prop_assume!(!packpath::is_theme_path(&reference));
        prop_assert_eq!(packpath::resolve(&reference, true), format!("doc/media/{}", reference));
    }

    #[test]
    fn resolution_without_fixup_keeps_canonical_keys(key in key_strategy()) {
        prop_assert_eq!(packpath::resolve(&key, false), key);
    }

    #[test]
    fn save_then_open_preserves_entries(
        entries in proptest::collection::hash_map(key_strategy(), proptest::collection::vec(any::<u8>(), 0..256), 0..12)
    ) {
        let (saved, reopened) = runtime().block_on(async {
            let pkg = MddocPackage::new().await.unwrap();
            for (key, data) in &entries {
                pkg.set_raw(key, data.clone()).await.unwrap();
            }
            let saved = pkg.store().snapshot().await;
            let bytes = pkg.save(OutputFormat::Bytes).await.unwrap();
            let reopened = MddocPackage::open(bytes.as_bytes()).await.unwrap();
            (saved, reopened.store().snapshot().await)
        });
        prop_assert_eq!(saved, reopened);
    }
}

#[tokio::test]
async fn opens_external_zip_and_skips_directories() {
    let pkg = MddocPackage::open(&external_package()).await.unwrap();
    assert_eq!(
        pkg.paths().await,
        vec!["doc/index.md", "doc/media/cover.jpg", "docProps/core.json"]
    );
    assert_eq!(pkg.get("cover.jpg").await.unwrap(), Bytes::from_static(&[0xff, 0xd8, 0xff, 0xe0]));

    let core = pkg.core_props().await.unwrap().unwrap();
    assert_eq!(core.title.as_deref(), Some("External"));
    assert_eq!(core.creators(), vec!["Ann", "Bob"]);
    assert_eq!(core.revision, Some(3));
}

#[tokio::test]
async fn trailing_slash_keys_survive_save_and_open() {
    let pkg = MddocPackage::new().await.unwrap();
    pkg.set("img/", &b"payload"[..]).await.unwrap();
    pkg.set("empty/", Bytes::new()).await.unwrap();
    let before = pkg.store().snapshot().await;

    let reopened = MddocPackage::open(&pkg.to_bytes().await.unwrap()).await.unwrap();
    assert_eq!(
        reopened.paths().await,
        vec!["doc/index.md", "doc/media/empty/", "doc/media/img/"]
    );
    assert_eq!(reopened.store().snapshot().await, before);
}

#[tokio::test]
async fn decode_filter_applies_on_open() {
    let pkg = PackageBuilder::new()
        .decode_options(DecodeOptions::new().with_filter(|entry| !entry.name.starts_with("doc/media/")))
        .open(&external_package())
        .await
        .unwrap();
    assert!(!pkg.contains("cover.jpg").await);
    assert_eq!(pkg.len().await, 2);
}

#[tokio::test]
async fn truncated_package_is_corrupt() {
    let mut bytes = MddocPackage::new().await.unwrap().to_bytes().await.unwrap();
    bytes.truncate(bytes.len() / 2);
    let err = MddocPackage::open(&bytes).await.unwrap_err();
    assert!(matches!(err, PackageError::CorruptArchive(_)));
}

#[tokio::test]
async fn empty_input_is_corrupt() {
    let err = MddocPackage::open(&[]).await.unwrap_err();
    assert!(matches!(err, PackageError::CorruptArchive(_)));
}

#[tokio::test]
async fn saves_to_and_opens_from_file() {
    let pkg = MddocPackage::new().await.unwrap();
    pkg.set("doc/index.md", "# On disk").await.unwrap();
    pkg.set("theme3.json", "{}").await.unwrap();

    let mut file = tempfile::tempfile().unwrap();
    pkg.write_to(&mut file).await.unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let reopened = PackageBuilder::new().from_reader(file).await.unwrap();
    let expected: Entries = HashMap::from([
        ("doc/index.md".to_string(), Bytes::from_static(b"# On disk")),
        ("doc/theme/theme3.json".to_string(), Bytes::from_static(b"{}")),
    ]);
    assert_eq!(reopened.store().snapshot().await, expected);
}

#[tokio::test]
async fn shared_package_serializes_concurrent_writers() {
    let pkg = std::sync::Arc::new(MddocPackage::new().await.unwrap());
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let pkg = std::sync::Arc::clone(&pkg);
            tokio::spawn(async move { pkg.set(&format!("img{}.png", i), vec![i as u8]).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(pkg.len().await, 9);
    assert_eq!(pkg.get("img5.png").await.unwrap(), Bytes::from_static(&[5]));
}
