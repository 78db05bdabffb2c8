use std::io;
use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global subscriber. Output goes to stderr so `folio get` keeps stdout for JSON.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "folio_access_total",
            Unit::Count,
            "Resource reads served by the data access layer, labelled by source."
        );
        describe_counter!(
            "folio_access_failures_total",
            Unit::Count,
            "Resource reads that degraded to an empty envelope, labelled by source."
        );
        describe_counter!(
            "folio_snapshot_written_total",
            Unit::Count,
            "Snapshot files written by the producer."
        );
        describe_counter!(
            "folio_snapshot_failed_total",
            Unit::Count,
            "Resources the producer could not fetch or write."
        );
        describe_counter!(
            "folio_cms_probe_total",
            Unit::Count,
            "Reachability probes sent to the CMS."
        );
    });
}
