//! Classification and resolution of package paths.
//!
//! Callers address entries with short references such as `"theme2.json"` or
//! `"logo.png"`. This module turns a reference into the canonical archive key
//! under which the entry is stored:
//!
//! - fixed structural paths (`doc/index.md`, `docProps/core.json`, ...) are kept as is
//! - theme files (`theme<N>.json`) are placed under `doc/theme/`
//! - anything else is treated as media and placed under `doc/media/`
//!
//! Canonical keys use forward slashes. Resolution never fails.

use crate::package::constants::{dir, file};
use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;

/// A fixed structural path of the package layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedPath {
    Doc,
    DocProps,
    CustomJson,
    Media,
    Theme,
    Embeddings,
    Index,
    Setting,
    AppDocProps,
    CoreDocProps,
    CustomDocProps,
}

static FIXED_PATHS: phf::Map<&'static str, FixedPath> = phf_map! {
    "doc" => FixedPath::Doc,
    "docProps" => FixedPath::DocProps,
    "customJson" => FixedPath::CustomJson,
    "doc/media" => FixedPath::Media,
    "doc/theme" => FixedPath::Theme,
    "doc/embeddings" => FixedPath::Embeddings,
    "doc/index.md" => FixedPath::Index,
    "doc/setting.json" => FixedPath::Setting,
    "docProps/app.json" => FixedPath::AppDocProps,
    "docProps/core.json" => FixedPath::CoreDocProps,
    "docProps/custom.json" => FixedPath::CustomDocProps,
};

impl FixedPath {
    /// Every fixed path, directories first.
    pub const ALL: [FixedPath; 11] = [
        FixedPath::Doc,
        FixedPath::DocProps,
        FixedPath::CustomJson,
        FixedPath::Media,
        FixedPath::Theme,
        FixedPath::Embeddings,
        FixedPath::Index,
        FixedPath::Setting,
        FixedPath::AppDocProps,
        FixedPath::CoreDocProps,
        FixedPath::CustomDocProps,
    ];

    /// Look up an exact fixed path.
    #[inline]
    pub fn from_path(path: &str) -> Option<Self> {
        FIXED_PATHS.get(path).copied()
    }

    /// The canonical key of this path.
    pub const fn as_str(self) -> &'static str {
        match self {
            FixedPath::Doc => dir::DOC,
            FixedPath::DocProps => dir::DOC_PROPS,
            FixedPath::CustomJson => dir::CUSTOM_JSON,
            FixedPath::Media => dir::MEDIA,
            FixedPath::Theme => dir::THEME,
            FixedPath::Embeddings => dir::EMBEDDINGS,
            FixedPath::Index => file::INDEX,
            FixedPath::Setting => file::SETTING,
            FixedPath::AppDocProps => file::APP_DOC_PROPS,
            FixedPath::CoreDocProps => file::CORE_DOC_PROPS,
            FixedPath::CustomDocProps => file::CUSTOM_DOC_PROPS,
        }
    }

    /// Whether this path names a directory rather than a file.
    pub const fn is_dir(self) -> bool {
        matches!(
            self,
            FixedPath::Doc
                | FixedPath::DocProps
                | FixedPath::CustomJson
                | FixedPath::Media
                | FixedPath::Theme
                | FixedPath::Embeddings
        )
    }
}

impl std::fmt::Display for FixedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a user-supplied reference, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Exact match of a fixed structural path
    Fixed(FixedPath),
    /// `theme<N>.json`, stored under `doc/theme/`
    Theme,
    /// Everything else, stored under `doc/media/`
    Media,
}

impl PathKind {
    /// Directory a reference of this kind is joined under, if any.
    pub const fn base_dir(self) -> Option<&'static str> {
        match self {
            PathKind::Fixed(_) => None,
            PathKind::Theme => Some(dir::THEME),
            PathKind::Media => Some(dir::MEDIA),
        }
    }
}

// Only the end is anchored: "dark/theme3.json" is a theme reference as well.
static THEME_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/?theme[0-9]+\.json$").expect("valid theme path pattern"));

static FULL_MEDIA_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^doc/media/.*$").expect("valid media path pattern"));

/// Whether `reference` is exactly one of the fixed structural paths.
#[inline]
pub fn is_fixed_path(reference: &str) -> bool {
    FIXED_PATHS.contains_key(reference)
}

/// Whether `reference` names a theme file (`theme<N>.json`, optionally with a leading slash).
#[inline]
pub fn is_theme_path(reference: &str) -> bool {
    THEME_PATH.is_match(reference)
}

/// Whether `reference` is already a full `doc/media/...` key.
///
/// [`resolve`] does not consult this predicate.
#[inline]
pub fn is_full_media_path(reference: &str) -> bool {
    FULL_MEDIA_PATH.is_match(reference)
}

/// Classify a reference. Fixed paths win over theme paths, media is the fallback.
pub fn classify(reference: &str) -> PathKind {
    if let Some(fixed) = FixedPath::from_path(reference) {
        PathKind::Fixed(fixed)
    } else if is_theme_path(reference) {
        PathKind::Theme
    } else {
        PathKind::Media
    }
}

/// Resolve a reference to its canonical archive key.
///
/// With `apply_fixup == false` the reference is only normalized, for callers
/// that already hold a canonical key.
///
/// A reference that already starts with `doc/media/` still falls through to the
/// media rule and is prefixed a second time.
pub fn resolve(reference: &str, apply_fixup: bool) -> String {
    if !apply_fixup {
        return normalize(reference);
    }

    let kind = classify(reference);
    match (kind, kind.base_dir()) {
        (PathKind::Fixed(fixed), _) => fixed.as_str().to_string(),
        (_, Some(base)) => join(base, reference),
        (_, None) => normalize(reference),
    }
}

/// Join `reference` onto `base` with a single separator and normalize the result.
pub fn join(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return normalize(base);
    }
    if base.is_empty() {
        return normalize(reference);
    }

    let joined = match (base.ends_with('/'), reference.starts_with('/')) {
        (true, true) => format!("{}{}", base, &reference[1..]),
        (true, false) | (false, true) => format!("{}{}", base, reference),
        (false, false) => format!("{}/{}", base, reference),
    };
    normalize(&joined)
}

/// Normalize separators and `.`/`..` segments.
///
/// Backslashes become forward slashes and repeated separators collapse. A
/// leading or trailing slash is kept. `..` above the root of a relative path is
/// kept, above `/` it is dropped. The empty path normalizes to `"."`.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    if parts.is_empty() {
        return match (absolute, trailing) {
            (true, _) => "/".to_string(),
            (false, true) => "./".to_string(),
            (false, false) => ".".to_string(),
        };
    }

    let mut normalized = String::with_capacity(path.len());
    if absolute {
        normalized.push('/');
    }
    normalized.push_str(&parts.join("/"));
    if trailing {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_paths_resolve_unchanged() {
        for fixed in FixedPath::ALL {
            let resolved = resolve(fixed.as_str(), true);
            assert_eq!(resolved, fixed.as_str());
            assert_eq!(resolve(&resolved, true), resolved);
        }
    }

    #[test]
    fn test_theme_paths() {
        assert_eq!(resolve("theme1.json", true), "doc/theme/theme1.json");
        assert_eq!(resolve("/theme42.json", true), "doc/theme/theme42.json");
        assert_eq!(classify("theme7.json"), PathKind::Theme);
        assert!(!is_theme_path("theme.json"));
        assert!(!is_theme_path("theme1.json.bak"));
    }

    #[test]
    fn test_media_fallback() {
        assert_eq!(resolve("logo.png", true), "doc/media/logo.png");
        assert_eq!(resolve("setting.json", true), "doc/media/setting.json");
        assert_eq!(resolve("img/a.png", true), "doc/media/img/a.png");
    }

    #[test]
    fn test_full_media_path_is_prefixed_again() {
        assert!(is_full_media_path("doc/media/logo.png"));
        assert_eq!(
            resolve("doc/media/logo.png", true),
            "doc/media/doc/media/logo.png"
        );
    }

    #[test]
    fn test_fixed_wins_over_media() {
        assert_eq!(classify("doc/setting.json"), PathKind::Fixed(FixedPath::Setting));
        assert_eq!(classify("doc/media"), PathKind::Fixed(FixedPath::Media));
        assert!(FixedPath::Media.is_dir());
        assert!(!FixedPath::Index.is_dir());
    }

    #[test]
    fn test_base_dir() {
        assert_eq!(PathKind::Fixed(FixedPath::Index).base_dir(), None);
        assert_eq!(PathKind::Theme.base_dir(), Some("doc/theme"));
        assert_eq!(PathKind::Media.base_dir(), Some("doc/media"));
        assert_eq!(resolve("img/", true), "doc/media/img/");
    }

    #[test]
    fn test_resolve_without_fixup() {
        assert_eq!(resolve("doc/media/logo.png", false), "doc/media/logo.png");
        assert_eq!(resolve("doc//media/./a/../logo.png", false), "doc/media/logo.png");
        assert_eq!(resolve("doc\\theme\\theme1.json", false), "doc/theme/theme1.json");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("a/b/"), "a/b/");
        assert_eq!(normalize("/a/../../b"), "/b");
        assert_eq!(normalize("../a"), "../a");
        assert_eq!(normalize("a/../../b"), "../b");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("doc/media", "a.png"), "doc/media/a.png");
        assert_eq!(join("doc/media/", "/a.png"), "doc/media/a.png");
        assert_eq!(join("doc/media", "../theme/theme1.json"), "doc/theme/theme1.json");
        assert_eq!(join("doc/media", ""), "doc/media");
    }
}
