//! Runs the gateway.
//!
//! Usage:
//!
//! ```text
//! toolgate [config-path]
//! ```
//!
//! The config path may also be given through `TOOLGATE_CONFIG`. Without one,
//! built-in defaults are used together with the `TOOLGATE_*` environment
//! overrides. A `.env` file in the working directory is loaded first.

use diesel::{
    PgConnection,
    r2d2::{ConnectionManager, Pool},
};
use std::{path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use toolgate::{
    config::{ConfigError, GatewayConfig},
    http::{AppContext, build_router},
    registry::adapters::PostgresRegistry,
    telemetry::init_tracing,
    upstream::{UpstreamClient, UpstreamError, adapters::HttpUpstreamConnector},
    vault::{CredentialVault, VaultError},
};
use tracing::{info, warn};

/// Names an alternative config file.
const CONFIG_PATH_ENV: &str = "TOOLGATE_CONFIG";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that stop the gateway from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to install tracing: {0}")]
    Tracing(String),
    #[error("invalid vault key: {0}")]
    Vault(#[from] VaultError),
    #[error("failed to build database pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();
    let config = load_config()?;
    init_tracing(&config.logging).map_err(|err| StartupError::Tracing(err.to_string()))?;

    let vault = match config.security.vault_key_hex.as_deref() {
        Some(key) => {
            let vault = CredentialVault::from_hex(key).map_err(StartupError::from)?;
            info!(key_bits = vault.key_bits(), "credential vault enabled");
            Some(Arc::new(vault))
        }
        None => {
            warn!("no vault key configured; hub credentials are stored in cleartext");
            None
        }
    };

    let manager = ConnectionManager::<PgConnection>::new(config.database.url.as_str());
    let pool = Pool::builder()
        .max_size(config.database.max_connections)
        .build(manager)
        .map_err(StartupError::from)?;
    let registry = Arc::new(PostgresRegistry::new(pool));

    let connector = HttpUpstreamConnector::new(config.upstream.http_settings())
        .map_err(StartupError::from)?;
    let upstream = UpstreamClient::new(Arc::new(connector), config.upstream.call_timeout());

    let state = Arc::new(AppContext::new(
        registry,
        upstream,
        vault,
        config.composer.max_tools_per_virtual_server,
    ));
    let app = build_router(state, &config.server);

    let address = config.server.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    info!(
        %address,
        admin_prefix = %config.server.admin_prefix,
        mcp_path_prefix = %config.server.mcp_path_prefix,
        "gateway listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("gateway stopped");
    Ok(())
}

fn load_config() -> Result<GatewayConfig, StartupError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
    let config = match path {
        Some(file) => GatewayConfig::load(&file)?,
        None => {
            let mut defaults = GatewayConfig::default();
            defaults.apply_overrides(|name| std::env::var(name).ok());
            defaults.validate()?;
            defaults
        }
    };
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
