use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use materials_core::catalog::{self, MATERIALS};
use materials_core::config::{
    parse_timeout_secs, DownloaderConfig, EndpointContract, CONTRACT_ENV, DEFAULT_ENDPOINT,
    DEFAULT_TIMEOUT, DOWNLOAD_DIR_ENV, ENDPOINT_ENV, TIMEOUT_ENV,
};
use materials_core::delivery::file_delivery::FileDelivery;
use materials_core::downloader::material_downloader::MaterialDownloader;
use materials_core::notify::log_observer::LogObserver;
use materials_core::session::MaterialSession;
use materials_core::types::types::{DownloadError, DownloadRequest, MaterialId};

mod terminal_observer;
use terminal_observer::TerminalObserver;

#[derive(Parser)]
#[command(name = "materials", about = "Download speech-therapy materials")]
struct Args {
    /// Materials endpoint URL (default: $MATERIALS_ENDPOINT or the production endpoint)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Response contract the endpoint speaks: metadata or binary
    #[arg(short, long, global = true)]
    contract: Option<EndpointContract>,

    /// Directory downloaded files are saved into
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the available materials
    List,
    /// Request one or more materials by id
    Get {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Flags win over `MATERIALS_*` variables, which win over defaults.
///
/// A variable is only read when its flag is absent, so a flag also masks a
/// malformed value in the environment.
fn build_config<F>(args: &Args, env: F) -> Result<DownloaderConfig, DownloadError>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = match &args.endpoint {
        Some(endpoint) => endpoint.clone(),
        None => env(ENDPOINT_ENV).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
    };
    let contract = match args.contract {
        Some(contract) => contract,
        None => match env(CONTRACT_ENV) {
            Some(value) => value.parse()?,
            None => EndpointContract::default(),
        },
    };
    let timeout = match args.timeout {
        Some(secs) => Duration::from_secs(secs),
        None => match env(TIMEOUT_ENV) {
            Some(value) => parse_timeout_secs(&value)?,
            None => DEFAULT_TIMEOUT,
        },
    };

    let mut builder = DownloaderConfig::builder(&endpoint)
        .with_contract(contract)
        .with_timeout(timeout);
    if let Some(dir) = args.dir.clone().or_else(|| env(DOWNLOAD_DIR_ENV).map(PathBuf::from)) {
        builder = builder.with_download_dir(dir);
    }
    builder.build()
}

/// A known id gets its catalog label; anything else is still sent and left
/// for the endpoint to reject.
fn resolve_request(id: &str) -> Result<DownloadRequest, DownloadError> {
    match catalog::find(id) {
        Some(material) => Ok(material.download_request()),
        None => Ok(DownloadRequest::new(MaterialId::new(id)?, id)),
    }
}

fn print_buttons() {
    for material in MATERIALS.iter() {
        println!(
            "{}  [ Скачать ]  {}  ({}, {})",
            material.icon.glyph(),
            material.name,
            material.id,
            material.size,
        );
        println!("      {}", material.description);
    }
}

async fn get(config: DownloaderConfig, ids: &[String]) -> bool {
    let downloader = match MaterialDownloader::new(&config) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            log::error!("could not create downloader: {}", e);
            return false;
        }
    };

    let mut session = MaterialSession::new(downloader, FileDelivery::from_config(&config));
    session.add_observer(Box::new(TerminalObserver::new()));
    session.add_observer(Box::new(LogObserver));

    let mut requests = Vec::with_capacity(ids.len());
    for id in ids {
        match resolve_request(id) {
            Ok(request) => requests.push(request),
            Err(e) => {
                eprintln!("skipping {:?}: {}", id, e);
                return false;
            }
        }
    }

    // Ctrl-C abandons every in-flight request without further output.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let outcomes = futures::future::join_all(
        requests.iter().map(|request| session.run(request, &cancel)),
    )
    .await;

    outcomes.iter().all(|outcome| outcome.is_success())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let ok = match &args.command {
        Command::List => {
            print_buttons();
            true
        }
        Command::Get { ids } => match build_config(&args, |name| std::env::var(name).ok()) {
            Ok(config) => {
                log::info!(
                    "endpoint={} contract={} dir={:?}",
                    config.endpoint,
                    config.contract,
                    config.download_dir,
                );
                get(config, ids).await
            }
            Err(e) => {
                eprintln!("{}", e);
                false
            }
        },
    };

    if !ok {
        std::process::exit(1);
    }
}
