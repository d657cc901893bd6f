use std::sync::Arc;

use crate::config::{self, AppConfig};
use crate::database::{DatabaseManager, PgStore};
use crate::{app, AppState};

/// Connect, optionally bootstrap the schema, and serve until shutdown
pub async fn run() -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting YaMDb API in {:?} mode", config.environment);
    ensure_signing_secret(config, crate::is_production!())?;

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.auto_init {
        DatabaseManager::ensure_schema(&pool).await?;
    }

    let app = app(AppState::new(Arc::new(PgStore::new(pool))));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("YaMDb API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Tokens cannot be issued or verified without a secret
fn ensure_signing_secret(config: &AppConfig, production: bool) -> anyhow::Result<()> {
    if !config.security.jwt_secret.is_empty() {
        return Ok(());
    }
    if production {
        anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
    }
    tracing::warn!("SECURITY_JWT_SECRET is empty, token endpoints will fail");
    Ok(())
}
