use anyhow::{Context, Result};
use contracts::domain::a004_vehicle_position::aggregate::{Position, StoredPosition};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;
use crate::shared::dates::parse_plain_datetime;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS positions (
    id SERIAL PRIMARY KEY,
    lat DECIMAL(10, 8),
    lng DECIMAL(11, 8),
    date TIMESTAMP NOT NULL,
    speed DECIMAL(5, 2) DEFAULT 0,
    direction DECIMAL(5, 2) DEFAULT 0,
    event_code VARCHAR(50),
    event VARCHAR(255),
    plate VARCHAR(20) NOT NULL,
    imei VARCHAR(50),
    odometer INT DEFAULT 0,
    hourmeter INT DEFAULT 0,
    driver_key VARCHAR(50),
    driver_name VARCHAR(255),
    driver_document VARCHAR(20),
    created_at TIMESTAMP DEFAULT NOW(),
    updated_at TIMESTAMP DEFAULT NOW(),
    CONSTRAINT unique_position UNIQUE (plate, date)
)"#;

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_positions_plate ON positions (plate)",
    "CREATE INDEX IF NOT EXISTS idx_positions_date ON positions (date)",
    "CREATE INDEX IF NOT EXISTS idx_positions_plate_date ON positions (plate, date)",
];

pub async fn ensure_table() -> Result<()> {
    let conn = get_connection()?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Postgres,
        CREATE_TABLE.to_string(),
    ))
    .await
    .context("Failed to create positions table")?;

    for sql in CREATE_INDEXES {
        conn.execute(Statement::from_string(DatabaseBackend::Postgres, sql.to_string()))
            .await?;
    }
    Ok(())
}

/// Returns `true` when the row was inserted, `false` when an existing one was updated
pub async fn upsert(p: &Position) -> Result<bool> {
    let conn = get_connection()?;

    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO positions (
                lat, lng, date, speed, direction, event_code, event, plate, imei,
                odometer, hourmeter, driver_key, driver_name, driver_document
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (plate, date) DO UPDATE SET
                lat = EXCLUDED.lat,
                lng = EXCLUDED.lng,
                speed = EXCLUDED.speed,
                direction = EXCLUDED.direction,
                event_code = EXCLUDED.event_code,
                event = EXCLUDED.event,
                imei = EXCLUDED.imei,
                odometer = EXCLUDED.odometer,
                hourmeter = EXCLUDED.hourmeter,
                driver_key = EXCLUDED.driver_key,
                driver_name = EXCLUDED.driver_name,
                driver_document = EXCLUDED.driver_document,
                updated_at = NOW()
            RETURNING (xmax = 0) AS insertado",
            [
                p.lat.into(),
                p.lng.into(),
                parse_plain_datetime(&p.date).into(),
                p.speed.into(),
                p.direction.into(),
                p.event_code.clone().into(),
                p.event.clone().into(),
                p.plate.clone().into(),
                p.imei.clone().into(),
                (p.odometer as i32).into(),
                (p.hourmeter as i32).into(),
                p.driver_key.clone().into(),
                p.driver_name.clone().into(),
                p.driver_document.clone().into(),
            ],
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Position upsert returned no row"))?;

    Ok(row.try_get("", "insertado")?)
}

/// Stored positions for a plate, newest first
pub async fn history(plate: &str, limit: u64) -> Result<Vec<StoredPosition>> {
    let conn = get_connection()?;

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT id, lat::float8 AS lat, lng::float8 AS lng, date,
                    COALESCE(speed, 0)::float8 AS speed, COALESCE(direction, 0)::float8 AS direction,
                    event_code, event, plate, imei,
                    COALESCE(odometer, 0) AS odometer, COALESCE(hourmeter, 0) AS hourmeter,
                    driver_key, driver_name, driver_document
             FROM positions
             WHERE plate = $1
             ORDER BY date DESC
             LIMIT $2",
            [plate.into(), (limit as i64).into()],
        ))
        .await?;

    rows.into_iter()
        .map(|row| {
            Ok(StoredPosition {
                id: row.try_get("", "id")?,
                lat: row.try_get::<Option<f64>>("", "lat")?.unwrap_or(0.0),
                lng: row.try_get::<Option<f64>>("", "lng")?.unwrap_or(0.0),
                date: row.try_get("", "date")?,
                speed: row.try_get("", "speed")?,
                direction: row.try_get("", "direction")?,
                event_code: row.try_get("", "event_code")?,
                event: row.try_get("", "event")?,
                plate: row.try_get("", "plate")?,
                imei: row.try_get("", "imei")?,
                odometer: row.try_get("", "odometer")?,
                hourmeter: row.try_get("", "hourmeter")?,
                driver_key: row.try_get("", "driver_key")?,
                driver_name: row.try_get("", "driver_name")?,
                driver_document: row.try_get("", "driver_document")?,
            })
        })
        .collect()
}
