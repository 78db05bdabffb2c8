//! Typed bindings from entity shapes to the resource they are read from.

use serde::de::DeserializeOwned;

pub use folio_api_types::{
    Article, Author, Category, FileAsset, NavigationItem, Page, SiteSettings, Tag,
};

use crate::domain::resources::Resource;

pub trait ResourceType: DeserializeOwned + Send {
    const RESOURCE: Resource;
}

impl ResourceType for Article {
    const RESOURCE: Resource = Resource::Articles;
}

impl ResourceType for Author {
    const RESOURCE: Resource = Resource::Authors;
}

impl ResourceType for Category {
    const RESOURCE: Resource = Resource::Categories;
}

impl ResourceType for Tag {
    const RESOURCE: Resource = Resource::Tags;
}

impl ResourceType for Page {
    const RESOURCE: Resource = Resource::Pages;
}

impl ResourceType for FileAsset {
    const RESOURCE: Resource = Resource::Files;
}

impl ResourceType for SiteSettings {
    const RESOURCE: Resource = Resource::Settings;
}

impl ResourceType for NavigationItem {
    const RESOURCE: Resource = Resource::Navigation;
}
