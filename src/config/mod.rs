//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, CommonOverrides, DEFAULT_PAGE_SIZE, FetchArgs, GetArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_CMS_BASE_URL: &str = "http://localhost:1337";
const DEFAULT_API_PREFIX: &str = "api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SNAPSHOT_DIR: &str = "data";
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 5;
const DEFAULT_BUILD_TIME_VAR: &str = "FOLIO_BUILD_TIME";
const DEFAULT_FRONTEND_TOKEN_VAR: &str = "FOLIO_FRONTEND_API_TOKEN";
const DEFAULT_BACKEND_TOKEN_VAR: &str = "FOLIO_BACKEND_API_TOKEN";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cms: CmsSettings,
    pub snapshots: SnapshotSettings,
    pub producer: ProducerSettings,
    pub environment: EnvironmentSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct CmsSettings {
    /// Always ends with `/` so relative joins keep any path prefix.
    pub base_url: Url,
    pub api_prefix: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SnapshotSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ProducerSettings {
    pub probe_interval: Duration,
}

/// Names of the variables read on every accessor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSettings {
    pub build_time_var: String,
    pub frontend_token_var: String,
    pub backend_token_var: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            build_time_var: DEFAULT_BUILD_TIME_VAR.to_string(),
            frontend_token_var: DEFAULT_FRONTEND_TOKEN_VAR.to_string(),
            backend_token_var: DEFAULT_BACKEND_TOKEN_VAR.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FOLIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match &cli.command {
        Command::Fetch(args) => raw.apply_fetch_overrides(args),
        Command::Get(args) => raw.apply_common_overrides(&args.overrides),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    cms: RawCmsSettings,
    snapshots: RawSnapshotSettings,
    producer: RawProducerSettings,
    environment: RawEnvironmentSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_common_overrides(&mut self, overrides: &CommonOverrides) {
        if let Some(url) = overrides.cms_url.as_ref() {
            self.cms.base_url = Some(url.clone());
        }
        if let Some(dir) = overrides.snapshot_dir.as_ref() {
            self.snapshots.directory = Some(dir.clone());
        }
        if let Some(seconds) = overrides.request_timeout_seconds {
            self.cms.request_timeout_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_fetch_overrides(&mut self, args: &FetchArgs) {
        self.apply_common_overrides(&args.overrides);
        if let Some(seconds) = args.probe_interval_seconds {
            self.producer.probe_interval_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            cms,
            snapshots,
            producer,
            environment,
            logging,
        } = raw;

        Ok(Self {
            cms: build_cms_settings(cms)?,
            snapshots: build_snapshot_settings(snapshots)?,
            producer: build_producer_settings(producer)?,
            environment: build_environment_settings(environment)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_cms_settings(cms: RawCmsSettings) -> Result<CmsSettings, LoadError> {
    let raw_url = cms
        .base_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CMS_BASE_URL.to_string());
    let mut base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("cms.base_url", format!("`{raw_url}`: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "cms.base_url",
            format!("unsupported scheme `{}`", base_url.scheme()),
        ));
    }
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    let api_prefix = cms
        .api_prefix
        .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string())
        .trim_matches('/')
        .to_string();

    let timeout_secs = cms
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "cms.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(CmsSettings {
        base_url,
        api_prefix,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_snapshot_settings(snapshots: RawSnapshotSettings) -> Result<SnapshotSettings, LoadError> {
    let directory = snapshots
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "snapshots.directory",
            "path must not be empty",
        ));
    }
    Ok(SnapshotSettings { directory })
}

fn build_producer_settings(producer: RawProducerSettings) -> Result<ProducerSettings, LoadError> {
    let interval_secs = producer
        .probe_interval_seconds
        .unwrap_or(DEFAULT_PROBE_INTERVAL_SECS);
    if interval_secs == 0 {
        return Err(LoadError::invalid(
            "producer.probe_interval_seconds",
            "must be greater than zero",
        ));
    }
    Ok(ProducerSettings {
        probe_interval: Duration::from_secs(interval_secs),
    })
}

fn build_environment_settings(
    environment: RawEnvironmentSettings,
) -> Result<EnvironmentSettings, LoadError> {
    Ok(EnvironmentSettings {
        build_time_var: var_name(
            environment.build_time_var,
            DEFAULT_BUILD_TIME_VAR,
            "environment.build_time_var",
        )?,
        frontend_token_var: var_name(
            environment.frontend_token_var,
            DEFAULT_FRONTEND_TOKEN_VAR,
            "environment.frontend_token_var",
        )?,
        backend_token_var: var_name(
            environment.backend_token_var,
            DEFAULT_BACKEND_TOKEN_VAR,
            "environment.backend_token_var",
        )?,
    })
}

fn var_name(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    let name = value.unwrap_or_else(|| default.to_string());
    let name = name.trim();
    if name.is_empty() {
        return Err(LoadError::invalid(key, "variable name must not be empty"));
    }
    Ok(name.to_string())
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCmsSettings {
    base_url: Option<String>,
    api_prefix: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSnapshotSettings {
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawProducerSettings {
    probe_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEnvironmentSettings {
    build_time_var: Option<String>,
    frontend_token_var: Option<String>,
    backend_token_var: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[cfg(test)]
mod tests;
