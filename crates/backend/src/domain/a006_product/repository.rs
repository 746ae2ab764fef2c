use anyhow::{Context, Result};
use contracts::domain::a006_product::aggregate::{FuelArticle, Product};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

/// Returns `true` if a new row was written
pub async fn insert_product(p: &Product) -> Result<bool> {
    let conn = get_connection()?;

    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO dim_producto (producto_id, nombre, origen, categoria)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (producto_id) DO NOTHING",
            [
                p.producto_id.into(),
                p.nombre.clone().into(),
                p.origen.clone().into(),
                p.categoria.clone().into(),
            ],
        ))
        .await
        .with_context(|| format!("Failed to insert product {}", p.producto_id))?;

    Ok(result.rows_affected() > 0)
}

pub async fn insert_fuel_article(a: &FuelArticle) -> Result<bool> {
    let conn = get_connection()?;

    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO articulos_combustibles (id_articulo, descripcion, es_combustible, es_lubricante, color)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id_articulo) DO NOTHING",
            [
                a.id_articulo.clone().into(),
                a.descripcion.clone().into(),
                a.es_combustible.into(),
                a.es_lubricante.into(),
                a.color.clone().into(),
            ],
        ))
        .await
        .with_context(|| format!("Failed to insert fuel article {}", a.id_articulo))?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_products() -> Result<Vec<Product>> {
    let conn = get_connection()?;

    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT producto_id::BIGINT AS producto_id, nombre, origen, categoria
             FROM dim_producto ORDER BY producto_id"
                .to_string(),
        ))
        .await?;

    rows.into_iter()
        .map(|row| {
            Ok(Product {
                producto_id: row.try_get("", "producto_id")?,
                nombre: row
                    .try_get::<Option<String>>("", "nombre")?
                    .unwrap_or_default(),
                origen: row.try_get("", "origen")?,
                categoria: row.try_get("", "categoria")?,
            })
        })
        .collect()
}

pub async fn update_category(producto_id: i64, categoria: &str) -> Result<()> {
    let conn = get_connection()?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "UPDATE dim_producto SET categoria = $1 WHERE producto_id = $2",
        [categoria.into(), producto_id.into()],
    ))
    .await?;
    Ok(())
}
