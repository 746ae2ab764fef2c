use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::time::Duration;

use crate::shared::config::DatabaseConfig;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(cfg: &DatabaseConfig) -> anyhow::Result<()> {
    let mut options = ConnectOptions::new(cfg.connection_url());
    options
        .max_connections(cfg.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let conn = Database::connect(options).await?;

    // Fail fast if the server is unreachable
    conn.execute(Statement::from_string(
        DatabaseBackend::Postgres,
        "SELECT 1".to_string(),
    ))
    .await?;

    tracing::info!(
        "Connected to PostgreSQL at {}:{}/{}",
        cfg.host,
        cfg.port,
        cfg.name
    );

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}
