//! Database connectivity probe for the debug endpoint.
//!
//! The server carries no persistence of its own; the only database
//! interaction is a `SELECT 1` probe reported by `/debug/`.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use serde::Serialize;
use tracing::{info, warn};

/// Result of a connectivity probe.
#[derive(Debug, Clone, Serialize)]
pub struct DbStatus {
    pub connected: bool,
    pub error: Option<String>,
}

/// Handle for the optional probe connection. When no `DATABASE_URL` is
/// configured, or the initial connection fails, the handle is empty and
/// probes report not-connected instead of failing the request.
#[derive(Clone, Default)]
pub struct ProbeHandle {
    conn: Option<DatabaseConnection>,
}

impl ProbeHandle {
    /// Connect to the configured database, if any. Connection failures are
    /// logged and produce a disconnected handle - the server still starts.
    pub async fn connect(database_url: Option<&str>) -> Self {
        let url = match database_url {
            Some(url) => url,
            None => {
                info!("no DATABASE_URL configured; debug probe will report not connected");
                return Self { conn: None };
            }
        };

        match Database::connect(url).await {
            Ok(conn) => {
                info!("database connection established for debug probe");
                Self { conn: Some(conn) }
            }
            Err(e) => {
                warn!("failed to connect to database: {}", e);
                Self { conn: None }
            }
        }
    }

    /// A handle with no backing connection.
    pub fn disconnected() -> Self {
        Self { conn: None }
    }

    /// Run a `SELECT 1` against the connection and report the outcome.
    pub async fn probe(&self) -> DbStatus {
        let conn = match &self.conn {
            Some(conn) => conn,
            None => {
                return DbStatus {
                    connected: false,
                    error: Some("no database configured".to_string()),
                };
            }
        };

        let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
        match conn.query_one_raw(stmt).await {
            Ok(_) => DbStatus {
                connected: true,
                error: None,
            },
            Err(e) => DbStatus {
                connected: false,
                error: Some(e.to_string()),
            },
        }
    }
}
