use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use folio_api_types::{PaginationParams, Query};

use crate::domain::resources::{EntryId, Resource};

/// Page size applied when only one half of a pagination pair is given.
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Headless CMS snapshot producer and content reader"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Wait for the CMS, then write one snapshot file per resource.
    Fetch(FetchArgs),
    /// Read one resource through the data access layer and print it as JSON.
    Get(Box<GetArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct CommonOverrides {
    /// Override the CMS base URL.
    #[arg(long = "cms-url", value_name = "URL")]
    pub cms_url: Option<String>,

    /// Override the directory holding snapshot files.
    #[arg(long = "snapshot-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub snapshot_dir: Option<PathBuf>,

    /// Override the per-request timeout for CMS calls.
    #[arg(long = "request-timeout-seconds", value_name = "SECONDS")]
    pub request_timeout_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Override the delay between CMS reachability probes.
    #[arg(long = "probe-interval-seconds", value_name = "SECONDS")]
    pub probe_interval_seconds: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct GetArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Resource to read (articles, authors, categories, tags, pages, files, settings, navigation).
    #[arg(value_name = "RESOURCE")]
    pub resource: Resource,

    /// Read a single entry by numeric id or document id.
    #[arg(long)]
    pub id: Option<EntryId>,

    #[arg(long, conflicts_with_all = ["start", "limit"])]
    pub page: Option<u64>,

    #[arg(long = "page-size", conflicts_with_all = ["start", "limit"])]
    pub page_size: Option<u64>,

    #[arg(long)]
    pub start: Option<u64>,

    #[arg(long)]
    pub limit: Option<u64>,

    /// Sort key, e.g. `publishedAt:desc`. Repeatable.
    #[arg(long)]
    pub sort: Vec<String>,

    /// Equality filter as FIELD=VALUE. Repeatable.
    #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Relation to populate; `*` populates all. Repeatable.
    #[arg(long)]
    pub populate: Vec<String>,

    /// Field to project. Repeatable.
    #[arg(long)]
    pub fields: Vec<String>,
}

impl GetArgs {
    pub fn query(&self) -> Query {
        let mut query = Query::new();

        for relation in &self.populate {
            query = if relation == "*" {
                query.populate_all()
            } else {
                query.populate(relation.clone())
            };
        }
        for (field, value) in &self.filters {
            query = query.filter_eq(field.clone(), value.clone());
        }
        for key in &self.sort {
            query = query.sort_by(key.clone());
        }
        for field in &self.fields {
            query = query.field(field.clone());
        }

        if self.page.is_some() || self.page_size.is_some() {
            query = query.paginate(PaginationParams::Page {
                page: self.page.unwrap_or(1),
                page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            });
        } else if self.start.is_some() || self.limit.is_some() {
            query = query.paginate(PaginationParams::Offset {
                start: self.start.unwrap_or(0),
                limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            });
        }

        query
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("filter field is empty in `{raw}`"));
    }
    Ok((field.to_string(), value.to_string()))
}
