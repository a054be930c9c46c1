//! tokenauth-server: HTTP service whose API is guarded by a bearer token
//! allow-list read from a YAML file and reloaded whenever the file changes.

mod cli;
mod routes;

use std::sync::Arc;

use tokenauth_store::{default_token_file_path, TokenStore};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "tokenauth=info";

fn init_logging(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> tokenauth_common::Result<()> {
    let args = cli::parse();
    init_logging(args.log_level.as_deref());

    let tokens_file = args.tokens_file.unwrap_or_else(default_token_file_path);
    let shutdown = CancellationToken::new();

    let store = TokenStore::initialize_with_shutdown(&tokens_file, shutdown.clone()).await?;
    tracing::info!(
        path = %tokens_file.display(),
        tokens = store.len(),
        "token store ready"
    );

    let app = routes::build_router(Arc::clone(&store));

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("tokenauth-server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("tokenauth-server stopped");
    Ok(())
}
