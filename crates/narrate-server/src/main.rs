//! Narrate - account and session backend for the Narrate content platform

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, KvBackend, LoggingConfig, NotifierBackend};
use narrate_api::{AppState, create_router, routes::cors_layer};
use narrate_auth::{AuthService, AuthSettings, JwtManager};
use narrate_db::Database;
use narrate_kv::{KeyValueStore, MemoryStore, RedisConfig, RedisStore};
use narrate_notify::{LogNotifier, Notifier, WhatsAppConfig, WhatsAppNotifier};

/// Narrate - account and session backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "NARRATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "NARRATE_PORT")]
    port: Option<u16>,

    /// Secret used to sign access tokens
    #[arg(long, env = "NARRATE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Narrate v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_default_secret() {
        warn!("Using the default JWT secret; set auth.jwt_secret or NARRATE_JWT_SECRET");
    }
    if config.auth.expose_otp {
        warn!("OTP echo is enabled; codes are returned in API responses");
    }

    // Install metrics recorder
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Initialize database
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path))?;

    // Initialize key-value store
    let kv: Arc<dyn KeyValueStore> = match config.kv.backend {
        KvBackend::Redis => {
            info!("Using Redis key-value store");
            Arc::new(
                RedisStore::new(RedisConfig {
                    url: config.kv.url.clone(),
                })
                .await
                .context("Failed to connect to Redis")?,
            )
        }
        KvBackend::Memory => {
            warn!("Using in-memory key-value store; sessions are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize outbound notifier
    let notifier: Arc<dyn Notifier> = match config.notifier.backend {
        NotifierBackend::Whatsapp => Arc::new(
            WhatsAppNotifier::new(WhatsAppConfig {
                api_url: config.notifier.api_url.clone(),
                api_key: config.notifier.api_key.clone(),
                timeout: Duration::from_secs(config.notifier.timeout_secs),
            })
            .context("Failed to configure WhatsApp notifier")?,
        ),
        NotifierBackend::Log => {
            warn!("Using log notifier; messages are written to the log only");
            Arc::new(LogNotifier)
        }
    };

    // Initialize auth service
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.validated_token_expiry_hours(),
    ));
    let auth = Arc::new(AuthService::new(
        db.clone(),
        kv,
        jwt,
        notifier,
        AuthSettings {
            session_ttl: config.auth.validated_session_ttl(),
            expose_otp: config.auth.expose_otp,
        },
    ));

    // Seed the first admin account
    if !db.has_accounts().await? {
        match &config.bootstrap_admin {
            Some(admin) => {
                let account = auth
                    .create_account(&admin.full_name, &admin.phone_number, &admin.password, true)
                    .await
                    .context("Failed to create bootstrap admin")?;
                info!("Bootstrap admin account {} created", account.id);
            }
            None => warn!("No accounts exist and no bootstrap_admin is configured"),
        }
    }

    // Create application state
    let state = AppState::new(db, auth);

    // Create router
    let app = create_router(state, Some(Arc::new(metrics_handle)))
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
