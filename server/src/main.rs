use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vimed_rag::RagConfig;
use vimed_rag::RagService;
use vimed_server::AppState;
use vimed_server::create_router;

#[derive(Parser)]
#[command(name = "vimed-server", about = "HTTP API for ViMedBot")]
struct Args {
    /// Address to bind
    #[arg(long, env = "VIMED_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "VIMED_PORT", default_value_t = 8000)]
    port: u16,

    /// Path to config file (default: ./.vimed/config.toml or ~/.vimed/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("vimed_server=info".parse()?)
                .add_directive("vimed_rag=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let mut config = RagConfig::from_file(path)?;
            config.apply_env(|name| std::env::var(name).ok());
            config
        }
        None => RagConfig::load(&std::env::current_dir()?)?,
    };

    let service = RagService::from_config(&config)?;
    let app = create_router(AppState {
        service: Arc::new(service),
    });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("ViMedBot API listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
