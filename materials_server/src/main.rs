use std::path::PathBuf;

use clap::Parser;

use materials_core::config::EndpointContract;
use materials_server::server::{router, AppState};

#[derive(Parser)]
#[command(name = "materialsd", about = "Serves the speech-therapy materials catalog")]
struct Args {
    /// Bind address (default: $MATERIALS_HOST or 127.0.0.1)
    #[arg(long)]
    host: Option<String>,

    /// Port (default: $MATERIALS_PORT or 8598)
    #[arg(short, long)]
    port: Option<u16>,

    /// Response contract: metadata or binary
    #[arg(short, long, default_value = "metadata")]
    contract: EndpointContract,

    /// Directory holding the PDFs served under the binary contract
    #[arg(short, long, default_value = "materials")]
    materials_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let host = args
        .host
        .or_else(|| std::env::var("MATERIALS_HOST").ok())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = args
        .port
        .or_else(|| std::env::var("MATERIALS_PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(8598);
    let addr = format!("{}:{}", host, port);

    let state = AppState::new(args.contract, args.materials_dir.clone());
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    log::info!(
        "materialsd listening on http://{}  contract={}  materials_dir={:?}",
        addr,
        args.contract,
        args.materials_dir,
    );
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("server error: {}", e);
        std::process::exit(1);
    }
}
