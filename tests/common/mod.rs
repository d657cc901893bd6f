#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Once, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use uuid::Uuid;

use yamdb_api::auth::{self, Claims};
use yamdb_api::config;
use yamdb_api::database::models::{NewUser, Role, User};
use yamdb_api::database::{DatabaseManager, PgStore, Store};

/// Shared by the spawned server and this process so tokens minted here verify there
pub const TEST_JWT_SECRET: &str = "yamdb-integration-secret";

static ENV: Once = Once::new();
static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

fn init_env() {
    ENV.call_once(|| {
        let _ = dotenvy::dotenv();
        std::env::set_var("SECURITY_JWT_SECRET", TEST_JWT_SECRET);
    });
}

/// Integration tests need a real PostgreSQL; without DATABASE_URL they skip
pub fn database_configured() -> bool {
    init_env();
    let configured = std::env::var("DATABASE_URL").is_ok();
    if !configured {
        eprintln!("DATABASE_URL not set, skipping integration test");
    }
    configured
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Inherits DATABASE_URL from the environment or .env
        let child = Command::new(env!("CARGO_BIN_EXE_yamdb-api"))
            .env("API_PORT", port.to_string())
            .env("SECURITY_JWT_SECRET", TEST_JWT_SECRET)
            .env("DATABASE_AUTO_INIT", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Start the server once per test binary; `None` when no database is configured
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if !database_configured() {
        return Ok(None);
    }
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// Unique suffix so repeated runs against one database do not collide
pub fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

async fn store() -> Result<PgStore> {
    let pool = DatabaseManager::connect(&config::config().database).await?;
    DatabaseManager::ensure_schema(&pool).await?;
    Ok(PgStore::new(pool))
}

/// Insert a user directly and mint a token for it
pub async fn user_with_token(role: Role) -> Result<(User, String)> {
    init_env();
    let username = unique(role.as_str());
    let user = store()
        .await?
        .create_user(NewUser {
            email: format!("{}@example.com", username),
            username,
            role,
            ..Default::default()
        })
        .await?;
    let token = auth::generate_jwt(&Claims::for_user(&user))?;
    Ok((user, token))
}
