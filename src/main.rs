use std::{process, sync::Arc};

use folio::{
    application::{
        access::DataAccess, env::RuntimeEnv, error::AppError, producer::SnapshotProducer,
    },
    config::{self, Command, GetArgs, Settings},
    domain::resources::ResourceKind,
    infra::{http::HttpSource, snapshots::SnapshotStore, telemetry},
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Command::Fetch(_) => run_fetch(settings).await,
        Command::Get(args) => run_get(settings, &args).await,
    }
}

async fn run_fetch(settings: Settings) -> Result<(), AppError> {
    let source = Arc::new(HttpSource::new(&settings.cms)?);
    let store = Arc::new(SnapshotStore::new(settings.snapshots.directory.clone()));
    let env = RuntimeEnv::process(settings.environment.clone());

    info!(
        target = "folio::fetch",
        cms = %settings.cms.base_url,
        directory = %store.directory().display(),
        "waiting for cms"
    );

    let producer = SnapshotProducer::new(source, store, env, settings.producer.probe_interval);
    let report = producer.run().await;

    if report.is_complete() {
        info!(
            target = "folio::fetch",
            written = report.written.len(),
            "all snapshots written"
        );
    } else {
        let failed: Vec<&str> = report.failed.iter().map(|r| r.as_str()).collect();
        warn!(
            target = "folio::fetch",
            written = report.written.len(),
            failed = ?failed,
            "some snapshots were not written"
        );
    }
    Ok(())
}

async fn run_get(settings: Settings, args: &GetArgs) -> Result<(), AppError> {
    let source = Arc::new(HttpSource::new(&settings.cms)?);
    let store = Arc::new(SnapshotStore::new(settings.snapshots.directory.clone()));
    let access = DataAccess::new(RuntimeEnv::process(settings.environment), store, source);

    let query = args.query();
    let resource = args.resource;

    match (resource.kind(), args.id.as_ref()) {
        (ResourceKind::Single, _) => print_json(&access.raw_single(resource, &query).await),
        (ResourceKind::Collection, Some(id)) => {
            print_json(&access.raw_entry(resource, id, &query).await)
        }
        (ResourceKind::Collection, None) => {
            print_json(&access.raw_collection(resource, &query).await)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to render envelope: {err}")))?;
    println!("{rendered}");
    Ok(())
}
