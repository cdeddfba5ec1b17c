mod api;
mod hooks;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tindago_core::{BlobRegistry, LifecycleEngine};
use tindago_db::PgRecordStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    hooks::AuditLogHooks,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(tindago_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = tindago_db::PoolConfig::from_app_config(&config);
    let pool = tindago_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = tindago_db::run_migrations(&pool).await?;
    tracing::info!(applied, env = %config.env, "database ready");

    let state = AppState {
        engine: Arc::new(LifecycleEngine::with_hooks(
            PgRecordStore::new(pool.clone()),
            AuditLogHooks,
        )),
        blobs: Arc::new(BlobRegistry::new(Duration::from_secs(config.blob_ttl_secs))),
        default_page_size: config.default_page_size,
        pool,
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
