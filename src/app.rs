/*
 * Responsibility
 * - Config → dependencies → Router
 * - Identity middleware in front of /api/v1, transport middleware around everything
 * - axum::serve() with graceful shutdown
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, auth::AccessGate, http::HttpLimits};
use crate::repos::{ListStore, MemoryListStore, PgListStore};
use crate::services::auth::build_authenticator;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins, e.g. RUST_LOG=info,yata_server=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let store = build_store(&config).await?;
    let state = AppState::new(store);

    let auth = build_authenticator(&config.auth)?;
    // Warm the key cache. Requests fail closed until a fetch succeeds.
    match auth.key_provider().current_key_set().await {
        Ok(keys) => tracing::info!(key_count = keys.len(), "signing keys loaded"),
        Err(err) => tracing::warn!(
            error = %err,
            source = %config.auth.jwks_url,
            "signing keys unavailable at start-up"
        ),
    }
    let gate = AccessGate::new(auth, config.auth.public_paths.clone());

    let app = middleware::http::apply(build_router(state, gate), HttpLimits::default());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn ListStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            let store = PgListStore::new(pool);
            store.migrate().await?;
            tracing::info!("using postgres store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Ok(Arc::new(MemoryListStore::new()))
        }
    }
}

/// Application routes without transport middleware.
pub fn build_router(state: AppState, gate: AccessGate) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let v1 = middleware::auth::access::apply(api::v1::routes(), gate);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
