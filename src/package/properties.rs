//! Typed views of the `docProps` entries.
//!
//! The archive stores `docProps/core.json` and `docProps/app.json` as opaque
//! bytes. These structures are an optional typed layer used by
//! [`MddocPackage::core_props`](crate::MddocPackage::core_props) and friends.
//! Every field is optional and unknown fields are ignored, so documents written
//! by other producers still parse. Boolean flags are also accepted as the
//! strings `"true"`/`"false"` and written that way; timestamps that are empty
//! or not RFC 3339 read as `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Core document properties (`docProps/core.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreDocProps {
    pub title: Option<String>,
    pub subject: Option<String>,
    /// Authors, separated by `"; "`
    pub creator: Option<String>,
    /// Keywords, separated by `"; "`
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<u32>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub last_printed: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub modified: Option<DateTime<Utc>>,
    /// Categories, separated by `"; "`
    pub category: Option<String>,
    pub content_status: Option<String>,
    pub language: Option<String>,
    pub version: Option<String>,
}

impl CoreDocProps {
    /// Split a `"; "`-separated field such as `creator` into its items.
    pub fn split_list(value: Option<&str>) -> Vec<&str> {
        value
            .map(|v| v.split(';').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn creators(&self) -> Vec<&str> {
        Self::split_list(self.creator.as_deref())
    }

    pub fn keyword_list(&self) -> Vec<&str> {
        Self::split_list(self.keywords.as_deref())
    }
}

/// Application properties (`docProps/app.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppDocProps {
    #[serde(alias = "temmplate")]
    pub template: Option<String>,
    /// Total editing time in minutes
    pub total_time: Option<u64>,
    pub pages: Option<u32>,
    pub words: Option<u64>,
    pub characters: Option<u64>,
    pub application: Option<String>,
    pub doc_security: Option<u32>,
    pub lines: Option<u64>,
    pub paragraphs: Option<u64>,
    #[serde(deserialize_with = "lenient::flag", serialize_with = "lenient::write_flag")]
    pub scale_crop: Option<bool>,
    pub manager: Option<String>,
    pub company: Option<String>,
    #[serde(deserialize_with = "lenient::flag", serialize_with = "lenient::write_flag")]
    pub links_up_to_date: Option<bool>,
    pub characters_with_spaces: Option<u64>,
    #[serde(deserialize_with = "lenient::flag", serialize_with = "lenient::write_flag")]
    pub shared_doc: Option<bool>,
    #[serde(deserialize_with = "lenient::flag", serialize_with = "lenient::write_flag")]
    pub hyperlinks_changed: Option<bool>,
    pub app_version: Option<String>,
}

mod lenient {
    use chrono::{DateTime, Utc};
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
        Other(IgnoredAny),
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Bool(value)) => Some(value),
            Some(Raw::Text(text)) => match text.trim() {
                t if t.eq_ignore_ascii_case("true") => Some(true),
                t if t.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            },
            Some(Raw::Other(_)) | None => None,
        })
    }

    pub fn write_flag<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(true) => serializer.serialize_str("true"),
            Some(false) => serializer.serialize_str("false"),
            None => serializer.serialize_none(),
        }
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Text(text)) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_core_props_json_names() {
        let props = CoreDocProps {
            title: Some("Report".to_string()),
            last_modified_by: Some("alice".to_string()),
            created: Some(Utc.with_ymd_and_hms(2016, 11, 1, 0, 50, 0).unwrap()),
            ..Default::default()
        };
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["title"], "Report");
        assert_eq!(json["lastModifiedBy"], "alice");
        assert_eq!(json["created"], "2016-11-01T00:50:00Z");
    }

    #[test]
    fn test_partial_and_unknown_fields() {
        let props: AppDocProps = serde_json::from_str(
            r#"{"pages": 3, "charactersWithSpaces": 120, "sharedDoc": false, "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(props.pages, Some(3));
        assert_eq!(props.characters_with_spaces, Some(120));
        assert_eq!(props.shared_doc, Some(false));
        assert_eq!(props.company, None);
    }

    #[test]
    fn test_split_list() {
        let props = CoreDocProps {
            creator: Some("Ann; Bob;  ; Cy".to_string()),
            ..Default::default()
        };
        assert_eq!(props.creators(), vec!["Ann", "Bob", "Cy"]);
        assert!(props.keyword_list().is_empty());
    }

    #[test]
    fn test_app_props_with_string_flags() {
        let props: AppDocProps = serde_json::from_str(
            r#"{
                "temmplate": "Normal.dotm",
                "totalTime": 12,
                "scaleCrop": "false",
                "linksUpToDate": "true",
                "sharedDoc": "",
                "hyperlinksChanged": "TRUE",
                "appVersion": "16.0000"
            }"#,
        )
        .unwrap();
        assert_eq!(props.template.as_deref(), Some("Normal.dotm"));
        assert_eq!(props.scale_crop, Some(false));
        assert_eq!(props.links_up_to_date, Some(true));
        assert_eq!(props.shared_doc, None);
        assert_eq!(props.hyperlinks_changed, Some(true));

        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["scaleCrop"], "false");
        assert_eq!(json["linksUpToDate"], "true");
        assert_eq!(serde_json::from_value::<AppDocProps>(json).unwrap(), props);
    }

    #[test]
    fn test_core_props_with_blank_timestamps() {
        let props: CoreDocProps = serde_json::from_str(
            r#"{
                "title": "",
                "revision": 1,
                "lastPrinted": "",
                "created": "2016-11-01T00:50:00Z",
                "modified": "yesterday"
            }"#,
        )
        .unwrap();
        assert_eq!(props.last_printed, None);
        assert_eq!(props.created, Some(Utc.with_ymd_and_hms(2016, 11, 1, 0, 50, 0).unwrap()));
        assert_eq!(props.modified, None);
        assert_eq!(props.revision, Some(1));
    }
}
