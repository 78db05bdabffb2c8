//! Typed views over the content entries served by the CMS.
//!
//! Every field defaults so that partially populated entries still decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: u64,
    pub document_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub cover: Option<FileAsset>,
    pub author: Option<Author>,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub id: u64,
    pub document_id: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<FileAsset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: u64,
    pub document_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub id: u64,
    pub document_id: Option<String>,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub id: u64,
    pub document_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// Media library entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileAsset {
    pub id: u64,
    pub document_id: Option<String>,
    pub name: String,
    pub alternative_text: Option<String>,
    pub caption: Option<String>,
    pub url: String,
    pub mime: Option<String>,
    pub ext: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Size in kilobytes, as reported by the upload plugin.
    pub size: Option<f64>,
    pub formats: Option<Value>,
}

impl FileAsset {
    /// Resolve `url` against `base` when the CMS stored a relative path.
    pub fn absolute_url(&self, base: &Url) -> Option<Url> {
        if self.url.is_empty() {
            return None;
        }
        match Url::parse(&self.url) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => base.join(&self.url).ok(),
            Err(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub id: u64,
    pub document_id: Option<String>,
    pub site_name: String,
    pub site_description: Option<String>,
    pub favicon: Option<FileAsset>,
    pub default_seo: Option<Value>,
}

/// Rendered navigation tree node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationItem {
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: Option<String>,
    pub external_path: Option<String>,
    pub ui_router_key: Option<String>,
    pub menu_attached: bool,
    pub order: i64,
    pub items: Vec<NavigationItem>,
}
