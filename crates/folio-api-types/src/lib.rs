//! Wire types for the folio content data layer.
//!
//! The same shapes travel over HTTP from the CMS and sit on disk as
//! snapshot files, so consumers cannot tell the two sources apart.

pub mod entities;
pub mod envelope;
pub mod query;

pub use entities::{
    Article, Author, Category, FileAsset, NavigationItem, Page, SiteSettings, Tag,
};
pub use envelope::{Collection, Envelope, Meta, Pagination, Single};
pub use query::{PaginationParams, Query};
