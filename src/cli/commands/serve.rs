use anyhow::{bail, Context};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{config, Environment};
use crate::database::DatabaseManager;
use crate::geo::geocoder;
use crate::state::AppState;

pub async fn handle(port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = port {
        config.api.port = port;
    }

    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set in {:?}", config.environment);
    }
    if config.environment != Environment::Development && memory {
        tracing::warn!("In-memory store selected outside development; data is lost on restart");
    }

    tokio::fs::create_dir_all(&config.upload.file_upload_path)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.upload.file_upload_path.display()))?;

    let geocoder = geocoder::from_config(&config.geocoder).context("failed to configure geocoder")?;

    let state = if memory {
        AppState::in_memory(config, geocoder)
    } else {
        let pool = DatabaseManager::connect(&config.database).await.context("failed to connect to database")?;
        AppState::postgres(config, pool, geocoder)
    };

    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        "DevCamper API listening on http://{} ({:?}, {} store)",
        bind_addr,
        state.config.environment,
        if memory { "memory" } else { "postgres" }
    );

    axum::serve(listener, crate::app(state)).await.context("server error")?;
    Ok(())
}
