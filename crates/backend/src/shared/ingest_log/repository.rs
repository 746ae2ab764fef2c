use anyhow::{Context, Result};
use contracts::shared::logger::{IngestKind, IngestLogEntry};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use std::time::Duration;

use super::{failure_state, success_message, success_state};
use crate::shared::data::db::get_connection;

pub async fn record_success(
    kind: IngestKind,
    registros: i64,
    insertados: i64,
    actualizados: i64,
    duration: Duration,
) -> Result<()> {
    insert(
        registros,
        success_state(kind),
        success_message(insertados, actualizados, duration),
    )
    .await
}

pub async fn record_failure(kind: IngestKind, registros: i64, message: &str) -> Result<()> {
    insert(registros, failure_state(kind), message.to_string()).await
}

async fn insert(registros: i64, estado: String, mensaje: String) -> Result<()> {
    let conn = get_connection()?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "INSERT INTO logs_ingesta (fecha, registros_insertados, estado, mensaje_error)
         VALUES (NOW(), $1, $2, $3)",
        [registros.into(), estado.into(), mensaje.into()],
    ))
    .await
    .context("Failed to insert into logs_ingesta")?;

    Ok(())
}

/// Most recent entries, newest first
pub async fn list(kind: Option<IngestKind>, limit: u64) -> Result<Vec<IngestLogEntry>> {
    let conn = get_connection()?;

    let filter = match kind {
        Some(k) => format!("%{}%", k.as_str()),
        None => "%".to_string(),
    };

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT id, fecha, registros_insertados::BIGINT AS registros_insertados, estado, mensaje_error
             FROM logs_ingesta
             WHERE estado LIKE $1 AND (estado LIKE '%FACTURAS%' OR estado LIKE '%RECIBOS%')
             ORDER BY fecha DESC
             LIMIT $2",
            [filter.into(), (limit as i64).into()],
        ))
        .await?;

    rows.into_iter()
        .map(|row| {
            Ok(IngestLogEntry {
                id: row.try_get("", "id")?,
                fecha: row.try_get("", "fecha")?,
                registros_insertados: row.try_get("", "registros_insertados")?,
                estado: row.try_get("", "estado")?,
                mensaje_error: row.try_get("", "mensaje_error")?,
            })
        })
        .collect()
}
