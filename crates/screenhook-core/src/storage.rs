//! Single-request persistence gateway.
//!
//! Each inbound event opens its own database connection, executes one
//! parameterized insert, and releases the connection before the outcome
//! is reported. There is no pool and no cross-request sharing: the
//! connection is exclusively owned by the request that opened it.

use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    Connection, PgConnection,
};
use tracing::debug;

use crate::{
    error::{PersistError, Result},
    event::CanonicalEvent,
};

/// Database connection settings supplied by the host process.
///
/// Sourced once from the environment at startup and handed to the
/// gateway per request. The password never appears in logs; use
/// [`DbConfig::masked`] when logging the target.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database server host name or address.
    pub host: String,
    /// Database server port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Database name holding the analytics table.
    pub database: String,
}

impl DbConfig {
    /// Connection target with the password masked for logging.
    pub fn masked(&self) -> String {
        format!("postgres://{}:***@{}:{}/{}", self.username, self.host, self.port, self.database)
    }

    /// Driver options for one connection. Transport encryption is always
    /// requested; the platform events carry user emails and names.
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Require)
    }
}

const INSERT_EVENT: &str = r"
INSERT INTO uscreen_events (
    source, publication, event, email, fullname, user_id, video_id,
    custom_fields, offer_id, invoice_id, total, amount, discount, order_id
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
";

const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS uscreen_events (
    source TEXT NOT NULL,
    publication TEXT NOT NULL,
    event TEXT NOT NULL,
    email TEXT,
    fullname TEXT,
    user_id INTEGER,
    video_id INTEGER,
    custom_fields TEXT,
    offer_id INTEGER,
    invoice_id INTEGER,
    total TEXT,
    amount TEXT,
    discount TEXT,
    order_id INTEGER
)
";

/// Persists one canonical record as one row.
///
/// Exactly one of three terminal outcomes occurs: the connection fails
/// and no insert is attempted, the insert fails, or one row lands. The
/// connection is released on every path before the outcome is returned.
///
/// # Errors
///
/// - [`PersistError::ConnectionFailed`] when the connection cannot be
///   established (bad credentials, unreachable host, database offline).
/// - [`PersistError::ExecutionFailed`] when the insert itself fails.
pub async fn insert_event(config: &DbConfig, record: &CanonicalEvent) -> Result<()> {
    let mut conn = connect(config).await?;

    let outcome = sqlx::query(INSERT_EVENT)
        .bind(&record.source)
        .bind(&record.publication)
        .bind(&record.event)
        .bind(&record.email)
        .bind(&record.fullname)
        .bind(record.user_id)
        .bind(record.video_id)
        .bind(&record.custom_fields)
        .bind(record.offer_id)
        .bind(record.invoice_id)
        .bind(&record.total)
        .bind(&record.amount)
        .bind(&record.discount)
        .bind(record.order_id)
        .execute(&mut conn)
        .await;

    // Release before inspecting the outcome so no exit path holds the
    // connection open.
    close(conn).await;

    outcome.map(|_| ()).map_err(PersistError::ExecutionFailed)
}

/// Verifies a connection can be established and a trivial query runs.
///
/// Used by the readiness probe. Opens and releases its own connection
/// like the insert path does.
///
/// # Errors
///
/// Same taxonomy as [`insert_event`].
pub async fn ping(config: &DbConfig) -> Result<()> {
    let mut conn = connect(config).await?;
    let outcome = sqlx::query("SELECT 1").execute(&mut conn).await;
    close(conn).await;
    outcome.map(|_| ()).map_err(PersistError::ExecutionFailed)
}

/// Creates the analytics table if it does not exist yet.
///
/// Startup bootstrap only; the schema never evolves at runtime.
///
/// # Errors
///
/// Same taxonomy as [`insert_event`].
pub async fn ensure_schema(config: &DbConfig) -> Result<()> {
    let mut conn = connect(config).await?;
    let outcome = sqlx::query(CREATE_EVENTS_TABLE).execute(&mut conn).await;
    close(conn).await;
    outcome.map(|_| ()).map_err(PersistError::ExecutionFailed)
}

async fn connect(config: &DbConfig) -> Result<PgConnection> {
    PgConnection::connect_with(&config.connect_options())
        .await
        .map_err(PersistError::ConnectionFailed)
}

async fn close(conn: PgConnection) {
    // Dropping would also close, but an explicit close sends the
    // termination message instead of abandoning the socket.
    if let Err(e) = conn.close().await {
        debug!(error = %e, "database connection closed uncleanly");
    }
}
