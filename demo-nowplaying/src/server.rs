use axum::Router;
use axum_server::{Handle, tls_rustls::RustlsConfig};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Certificate and key for serving HTTPS, when both are configured.
pub(crate) struct TlsFiles {
    cert: PathBuf,
    key: PathBuf,
}

impl TlsFiles {
    pub(crate) fn from_env() -> Result<Option<Self>, String> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        match (var("NOWPLAYING_TLS_CERT"), var("NOWPLAYING_TLS_KEY")) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert: cert.into(),
                key: key.into(),
            })),
            (None, None) => Ok(None),
            _ => Err(
                "NOWPLAYING_TLS_CERT and NOWPLAYING_TLS_KEY must be set together".to_string(),
            ),
        }
    }
}

pub(crate) async fn serve(
    addr: SocketAddr,
    app: Router,
    tls: Option<TlsFiles>,
    handle: Handle,
) -> std::io::Result<()> {
    match tls {
        Some(files) => {
            let config = RustlsConfig::from_pem_file(files.cert, files.key).await?;
            tracing::info!("HTTPS server listening on {}", addr);
            axum_server::bind_rustls(addr, config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            tracing::info!("HTTP server listening on {}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    }
}

pub(crate) async fn shutdown_on_ctrl_c(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
