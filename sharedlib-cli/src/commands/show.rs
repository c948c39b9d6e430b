//! `sharedlib show`: resolve a library once and print what gets published.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use sharedlib::config::LibraryConfigFile;
use sharedlib::controller::{Collaborators, ControllerConfig, LibraryController};
use sharedlib::fileset::{GlobFilesetResolver, DEFAULT_DISPATCH_CAPACITY};
use sharedlib::notify::BroadcastNotifier;
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::common::{load_config, LibraryReport};
use crate::error::CliError;

/// Seconds to wait for every fileset to resolve.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Library configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,

    /// Give up if filesets have not resolved after this many seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the show subcommand.
pub fn run(args: ShowArgs) -> Result<(), CliError> {
    let file = load_config(&args.config)?;
    for missing in file.undefined_filesets() {
        warn!(fileset = missing, "Fileset has no definition and will never resolve");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let report = runtime.block_on(resolve(file, Duration::from_secs(args.timeout_secs)))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

/// Run one update through a controller and wait for it to publish.
async fn resolve(file: LibraryConfigFile, wait: Duration) -> Result<LibraryReport, CliError> {
    let (resolver, dispatcher) = GlobFilesetResolver::start(&Handle::current(), DEFAULT_DISPATCH_CAPACITY);
    for (id, definition) in file.filesets {
        resolver.define(id, definition)?;
    }

    let mut config = ControllerConfig::default();
    if let Some(dir) = file.cache_dir {
        config = config.with_cache_root(dir);
    }

    let notifier = Arc::new(BroadcastNotifier::default());
    let mut changes = notifier.subscribe();
    let controller = LibraryController::new(
        file.snapshot.id(),
        Collaborators::new(Arc::new(resolver.clone()))
            .with_paths(Arc::new(file.paths))
            .with_notifier(notifier),
        config,
    );

    let result = match controller.update(file.snapshot) {
        Some(generation) => {
            debug!(%generation, "Waiting for library to publish");
            match tokio::time::timeout(wait, changes.recv()).await {
                Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => controller
                    .current()
                    .map(|current| LibraryReport::from_generation(&current))
                    .ok_or_else(|| CliError::Resolution("no generation published".to_string())),
                Ok(Err(RecvError::Closed)) => {
                    Err(CliError::Resolution("change notifications closed".to_string()))
                }
                Err(_) => Err(CliError::Timeout {
                    secs: wait.as_secs(),
                    outstanding: controller.status().outstanding,
                }),
            }
        }
        None => Err(CliError::Resolution("library was deleted".to_string())),
    };

    controller.delete();
    resolver.shutdown();
    if let Err(e) = dispatcher.await {
        warn!(error = %e, "Fileset dispatcher ended abnormally");
    }

    if let Ok(report) = &result {
        info!(
            library = %report.library_id,
            generation = %report.generation,
            containers = report.containers.len(),
            "Library resolved"
        );
    }
    result
}
