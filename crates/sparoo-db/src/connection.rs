//! SurrealDB connection used by the Sparoo server.
//!
//! One [`DbManager`] is created at startup; every repository receives a
//! clone of its client, so concurrent provisioning requests share the
//! same multiplexed WebSocket connection.

use std::fmt;

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// `[database]` section of the server configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Host and port of the SurrealDB WebSocket endpoint.
    pub url: String,
    /// Namespace holding the Sparoo tables (default: `sparoo`).
    pub namespace: String,
    /// Database within the namespace; migrations are applied here.
    pub database: String,
    /// Root credentials; the server signs in once at startup.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "sparoo".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Owns the server's SurrealDB client.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open the connection, sign in and select the Sparoo namespace.
    ///
    /// Fails before any route is served, so a misconfigured database
    /// stops startup instead of surfacing as per-request errors.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Connected to SurrealDB");

        Ok(Self { db })
    }

    /// Client handle to clone into repositories.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
