use anyhow::{Context, Result};
use contracts::domain::a005_tank::aggregate::TankLevel;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

pub async fn upsert_state(level: &TankLevel) -> Result<()> {
    let conn = get_connection()?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "INSERT INTO tanques_estado_actual
            (id_tanque, producto, capacidad, nivel_actual, temperatura, fecha_actualizacion)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (id_tanque) DO UPDATE SET
            producto = EXCLUDED.producto,
            capacidad = EXCLUDED.capacidad,
            nivel_actual = EXCLUDED.nivel_actual,
            temperatura = EXCLUDED.temperatura,
            fecha_actualizacion = EXCLUDED.fecha_actualizacion",
        [
            level.id_tanque.into(),
            level.producto.clone().into(),
            level.capacidad.into(),
            level.nivel_actual.into(),
            level.temperatura.into(),
            level.fecha_actualizacion.into(),
        ],
    ))
    .await
    .with_context(|| format!("Failed to upsert tank {}", level.id_tanque))?;

    Ok(())
}

pub async fn list_states() -> Result<Vec<TankLevel>> {
    let conn = get_connection()?;

    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT id_tanque, producto, capacidad::float8 AS capacidad,
                    nivel_actual::float8 AS nivel_actual, temperatura::float8 AS temperatura,
                    fecha_actualizacion
             FROM tanques_estado_actual
             ORDER BY id_tanque"
                .to_string(),
        ))
        .await?;

    rows.into_iter()
        .map(|row| {
            Ok(TankLevel {
                id_tanque: row.try_get("", "id_tanque")?,
                producto: row.try_get("", "producto")?,
                capacidad: row.try_get("", "capacidad")?,
                nivel_actual: row.try_get("", "nivel_actual")?,
                temperatura: row.try_get("", "temperatura")?,
                fecha_actualizacion: row.try_get("", "fecha_actualizacion")?,
            })
        })
        .collect()
}
