//! Constant values describing the `.mddoc` package layout.
//!
//! ```text
//! doc/
//!   index.md
//!   media/          images, video, ...
//!   theme/          theme1.json, theme2.json, ...
//!   setting.json
//!   embeddings/     reserved
//! docProps/
//!   app.json
//!   core.json
//!   custom.json
//! customJson/       reserved
//! ```

/// Directories of the package
pub mod dir {
    pub const DOC: &str = "doc";
    pub const DOC_PROPS: &str = "docProps";
    pub const CUSTOM_JSON: &str = "customJson";
    pub const MEDIA: &str = "doc/media";
    pub const THEME: &str = "doc/theme";
    pub const EMBEDDINGS: &str = "doc/embeddings";
}

/// Well-known files of the package
pub mod file {
    pub const INDEX: &str = "doc/index.md";
    pub const SETTING: &str = "doc/setting.json";
    pub const APP_DOC_PROPS: &str = "docProps/app.json";
    pub const CORE_DOC_PROPS: &str = "docProps/core.json";
    pub const CUSTOM_DOC_PROPS: &str = "docProps/custom.json";
}
