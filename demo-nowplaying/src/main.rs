use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nowplaying_axum::{DeferredTasks, ProxyState, TokenManager, init, now_playing_router};

mod server;

use crate::server::{TlsFiles, serve, shutdown_on_ctrl_c};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install default CryptoProvider for rustls to prevent:
    // "no process-level CryptoProvider available -- call CryptoProvider::install_default() before this point"
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default CryptoProvider")?;

    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,nowplaying=debug,nowplaying_axum=debug",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, store) = init().await?;
    let deferred = DeferredTasks::new();
    let manager = TokenManager::new(config, store, deferred.clone())?;
    let app = now_playing_router(ProxyState::new(manager));

    let addr: SocketAddr = std::env::var("NOWPLAYING_BIND_ADDR")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
        .parse()?;
    let tls = TlsFiles::from_env()?;

    let handle = axum_server::Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    serve(addr, app, tls, handle).await?;

    // Responses may have gone out before their cache writes landed
    tracing::info!("Server stopped; flushing deferred store writes");
    deferred.drain().await;
    Ok(())
}
