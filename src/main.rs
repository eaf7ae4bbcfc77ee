//! Alumni API - alumni records and employment history
//! Mission: Serve alumni data behind JWT authentication and role checks

use alumni_api::{
    alumni::AlumniStore,
    api::{create_router, AppState},
    auth::{AuthService, JwtHandler, PasswordHasher, SqliteUserStore},
    config::Config,
    db::Database,
    files::FileStore,
    jobs::JobStore,
};
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!("🚀 Alumni API starting");

    let db = Database::open(&config.database_path)?;

    let auth_config = config.auth();
    let jwt_handler = Arc::new(JwtHandler::new(&auth_config)?);
    let hasher = PasswordHasher::new(auth_config.bcrypt_cost)?;
    let user_store = Arc::new(SqliteUserStore::new(db.clone()));
    let auth = Arc::new(AuthService::new(user_store, jwt_handler, hasher)?);
    info!(
        "🔐 Authentication ready (token ttl: {}h, bcrypt cost: {})",
        config.jwt_ttl_hours,
        hasher.cost()
    );

    match config.bootstrap_admin() {
        Some(admin) => {
            if !auth.ensure_admin(&admin).await? {
                info!("Admin account already present, bootstrap skipped");
            }
        }
        None => warn!("⚠️  No ADMIN_* credentials configured; admin bootstrap disabled"),
    }

    let files = Arc::new(FileStore::new(db.clone(), &config.upload_dir));
    info!("📁 Uploads stored in {}", files.upload_dir().display());

    let state = AppState::new(
        auth,
        Arc::new(AlumniStore::new(db.clone())),
        Arc::new(JobStore::new(db)),
        files,
    );
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` overrides the default filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alumni_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the crate root when started from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("🛑 Shutdown signal received");
}
