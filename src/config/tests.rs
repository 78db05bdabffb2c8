use std::path::Path;

use folio_api_types::PaginationParams;
use serde_json::json;

use super::*;
use crate::domain::resources::{EntryId, Resource};

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.cms.base_url.as_str(), "http://localhost:1337/");
    assert_eq!(settings.cms.api_prefix, "api");
    assert_eq!(settings.cms.request_timeout, Duration::from_secs(30));
    assert_eq!(settings.producer.probe_interval, Duration::from_secs(5));
    assert_eq!(settings.snapshots.directory, Path::new("data"));
    assert_eq!(settings.environment, EnvironmentSettings::default());
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.cms.base_url = Some("http://file.example".to_string());
    raw.logging.level = Some("info".to_string());

    let args = FetchArgs {
        overrides: CommonOverrides {
            cms_url: Some("https://cli.example/cms".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        },
        probe_interval_seconds: Some(1),
    };

    raw.apply_fetch_overrides(&args);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.cms.base_url.as_str(), "https://cli.example/cms/");
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.producer.probe_interval, Duration::from_secs(1));
}

#[test]
fn api_prefix_is_trimmed_of_slashes() {
    let mut raw = RawSettings::default();
    raw.cms.api_prefix = Some("/api/".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.cms.api_prefix, "api");
}

#[test]
fn zero_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cms.request_timeout_seconds = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero timeout");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cms.request_timeout_seconds",
            ..
        }
    ));
}

#[test]
fn zero_probe_interval_is_rejected() {
    let mut raw = RawSettings::default();
    raw.producer.probe_interval_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn non_http_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cms.base_url = Some("ftp://cms.example".to_string());
    let err = Settings::from_raw(raw).expect_err("ftp scheme");
    assert!(matches!(err, LoadError::Invalid { key: "cms.base_url", .. }));
}

#[test]
fn blank_variable_name_is_rejected() {
    let mut raw = RawSettings::default();
    raw.environment.build_time_var = Some("  ".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = CommonOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_common_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn parse_fetch_arguments() {
    let args = CliArgs::parse_from([
        "folio",
        "fetch",
        "--cms-url",
        "http://cms:1337",
        "--snapshot-dir",
        "/tmp/snapshots",
        "--probe-interval-seconds",
        "2",
    ]);

    match args.command {
        Command::Fetch(fetch) => {
            assert_eq!(fetch.overrides.cms_url.as_deref(), Some("http://cms:1337"));
            assert_eq!(
                fetch.overrides.snapshot_dir.as_deref(),
                Some(Path::new("/tmp/snapshots"))
            );
            assert_eq!(fetch.probe_interval_seconds, Some(2));
        }
        Command::Get(_) => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_get_arguments_into_query() {
    let args = CliArgs::parse_from([
        "folio",
        "get",
        "articles",
        "--start",
        "10",
        "--limit",
        "5",
        "--sort",
        "publishedAt:desc",
        "--filter",
        "slug=hello",
        "--populate",
        "author",
    ]);

    let Command::Get(get) = args.command else {
        panic!("wrong command parsed");
    };
    assert_eq!(get.resource, Resource::Articles);
    assert_eq!(get.id, None);

    let query = get.query();
    assert_eq!(
        query.pagination,
        Some(PaginationParams::Offset {
            start: 10,
            limit: 5
        })
    );
    assert_eq!(query.sort, vec!["publishedAt:desc".to_string()]);
    assert_eq!(query.filters, Some(json!({"slug": {"$eq": "hello"}})));
    assert_eq!(query.populate, Some(json!(["author"])));
}

#[test]
fn parse_get_with_id_and_page_defaults() {
    let args = CliArgs::parse_from(["folio", "get", "tags", "--id", "abc", "--page", "3"]);

    let Command::Get(get) = args.command else {
        panic!("wrong command parsed");
    };
    assert_eq!(get.id, Some(EntryId::Document("abc".into())));
    assert_eq!(
        get.query().pagination,
        Some(PaginationParams::Page {
            page: 3,
            page_size: DEFAULT_PAGE_SIZE
        })
    );
}

#[test]
fn get_rejects_mixed_pagination_styles() {
    let result = CliArgs::try_parse_from(["folio", "get", "tags", "--page", "1", "--start", "0"]);
    assert!(result.is_err());
}

#[test]
fn get_rejects_unknown_resource() {
    let result = CliArgs::try_parse_from(["folio", "get", "widgets"]);
    assert!(result.is_err());
}

#[test]
fn malformed_filter_is_rejected() {
    let result = CliArgs::try_parse_from(["folio", "get", "tags", "--filter", "slug"]);
    assert!(result.is_err());
}
