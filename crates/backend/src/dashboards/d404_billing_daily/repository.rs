use anyhow::Result;
use chrono::NaiveDate;
use contracts::dashboards::d404_billing_daily::dto::{
    BillingCategory, CompanyUnitsRow, DailyArticleBillingRow, DailyCustomerBillingRow,
    DailyReceiptRow,
};
use sea_orm::{DatabaseBackend, FromQueryResult, Statement};

use crate::shared::data::db::get_connection;

#[derive(Debug, Clone, Copy)]
enum Column {
    Articulo,
    Grupo,
}

impl Column {
    /// Both description columns are nullable; a NULL must compare as ''
    fn sql(self) -> &'static str {
        match self {
            Column::Articulo => "COALESCE(d.descripcion_articulo, '')",
            Column::Grupo => "COALESCE(d.descripcion_grupo, '')",
        }
    }
}

type Rule = (Column, &'static str);

const GNC_RULES: &[Rule] = &[(Column::Articulo, "GNC"), (Column::Grupo, "GNC")];

const LIQUIDOS_RULES: &[Rule] = &[
    (Column::Articulo, "NAFTA"),
    (Column::Articulo, "DIESEL"),
    (Column::Articulo, "QUANTIUM"),
    (Column::Articulo, "INFINIA"),
    (Column::Grupo, "COMBUSTIBLE"),
];

const SHOP_RULES: &[Rule] = &[
    (Column::Grupo, "SHOP"),
    (Column::Grupo, "SPOT"),
    (Column::Grupo, "BEBIDA"),
    (Column::Grupo, "GOLOSINA"),
    (Column::Grupo, "CAFETERIA"),
];

fn any_of(rules: &[Rule]) -> String {
    let terms: Vec<String> = rules
        .iter()
        .map(|(column, keyword)| format!("{} ILIKE '%{}%'", column.sql(), keyword))
        .collect();
    format!("({})", terms.join(" OR "))
}

/// Row filter on `facturas_venta_detalle d` for a category.
/// Categories are checked in order gnc, liquidos, shop; `otros` is whatever none of them match.
pub fn category_filter(category: BillingCategory) -> String {
    let gnc = any_of(GNC_RULES);
    let liquidos = any_of(LIQUIDOS_RULES);
    let shop = any_of(SHOP_RULES);
    match category {
        BillingCategory::Gnc => gnc,
        BillingCategory::Liquidos => format!("({} AND NOT {})", liquidos, gnc),
        BillingCategory::Shop => format!("({} AND NOT {} AND NOT {})", shop, gnc, liquidos),
        BillingCategory::Otros => format!("NOT ({} OR {} OR {})", gnc, liquidos, shop),
    }
}

fn range_statement(sql: &str, from: NaiveDate, to: NaiveDate) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, [from.into(), to.into()])
}

#[derive(Debug, Clone, FromQueryResult)]
struct CustomerRow {
    fecha: NaiveDate,
    razon_social: Option<String>,
    numero_documento: Option<String>,
    cantidad_facturas: i64,
    neto_gravado: f64,
    iva: f64,
    total: f64,
}

pub async fn billing_by_customer(
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyCustomerBillingRow>> {
    let db = get_connection()?;
    let sql = r#"
        SELECT
            f.fecha::date AS fecha,
            f.razon_social,
            f.numero_documento,
            COUNT(*)::BIGINT AS cantidad_facturas,
            COALESCE(SUM(f.neto_gravado), 0)::float8 AS neto_gravado,
            COALESCE(SUM(f.iva), 0)::float8 AS iva,
            COALESCE(SUM(f.total), 0)::float8 AS total
        FROM facturas_venta f
        WHERE f.fecha::date BETWEEN $1::date AND $2::date
        GROUP BY f.fecha::date, f.razon_social, f.numero_documento
        ORDER BY f.fecha::date DESC, total DESC
    "#;
    let rows = CustomerRow::find_by_statement(range_statement(sql, from, to))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| DailyCustomerBillingRow {
            fecha: r.fecha,
            razon_social: r.razon_social,
            numero_documento: r.numero_documento,
            cantidad_facturas: r.cantidad_facturas,
            neto_gravado: r.neto_gravado,
            iva: r.iva,
            total: r.total,
        })
        .collect())
}

#[derive(Debug, Clone, FromQueryResult)]
struct ArticleRow {
    fecha: NaiveDate,
    id_articulo: Option<i64>,
    descripcion_articulo: Option<String>,
    descripcion_grupo: Option<String>,
    cantidad: f64,
    total_neto: f64,
    total_iva: f64,
    total: f64,
}

pub async fn billing_by_article(
    category: BillingCategory,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyArticleBillingRow>> {
    let db = get_connection()?;
    let sql = format!(
        r#"
        SELECT
            f.fecha::date AS fecha,
            d.id_articulo::BIGINT AS id_articulo,
            d.descripcion_articulo,
            d.descripcion_grupo,
            COALESCE(SUM(d.cantidad), 0)::float8 AS cantidad,
            COALESCE(SUM(d.total_neto), 0)::float8 AS total_neto,
            COALESCE(SUM(d.total_iva), 0)::float8 AS total_iva,
            COALESCE(SUM(d.total_renglon), 0)::float8 AS total
        FROM facturas_venta_detalle d
        JOIN facturas_venta f ON f.id_factura = d.id_factura
        WHERE f.fecha::date BETWEEN $1::date AND $2::date
          AND {}
        GROUP BY f.fecha::date, d.id_articulo, d.descripcion_articulo, d.descripcion_grupo
        ORDER BY f.fecha::date DESC, d.descripcion_articulo
    "#,
        category_filter(category)
    );
    let rows = ArticleRow::find_by_statement(range_statement(&sql, from, to))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| DailyArticleBillingRow {
            fecha: r.fecha,
            id_articulo: r.id_articulo,
            descripcion_articulo: r.descripcion_articulo,
            descripcion_grupo: r.descripcion_grupo,
            cantidad: r.cantidad,
            total_neto: r.total_neto,
            total_iva: r.total_iva,
            total: r.total,
        })
        .collect())
}

#[derive(Debug, Clone, FromQueryResult)]
struct ReceiptRow {
    fecha: NaiveDate,
    razon_social: Option<String>,
    numero_documento: Option<String>,
    cantidad_recibos: i64,
    total_efectivo: f64,
    total_sin_imputar: f64,
}

pub async fn receipts_by_customer(
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyReceiptRow>> {
    let db = get_connection()?;
    let sql = r#"
        SELECT
            r.fecha_recibo::date AS fecha,
            r.razon_social,
            r.numero_documento,
            COUNT(*)::BIGINT AS cantidad_recibos,
            COALESCE(SUM(r.total_efectivo), 0)::float8 AS total_efectivo,
            COALESCE(SUM(r.total_sin_imputar), 0)::float8 AS total_sin_imputar
        FROM recibos r
        WHERE r.fecha_recibo::date BETWEEN $1::date AND $2::date
        GROUP BY r.fecha_recibo::date, r.razon_social, r.numero_documento
        ORDER BY r.fecha_recibo::date DESC, r.razon_social
    "#;
    let rows = ReceiptRow::find_by_statement(range_statement(sql, from, to))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| DailyReceiptRow {
            fecha: r.fecha,
            razon_social: r.razon_social,
            numero_documento: r.numero_documento,
            cantidad_recibos: r.cantidad_recibos,
            total_efectivo: r.total_efectivo,
            total_sin_imputar: r.total_sin_imputar,
        })
        .collect())
}

#[derive(Debug, Clone, FromQueryResult)]
struct UnitsRow {
    fecha: NaiveDate,
    id_estacion: Option<i64>,
    razon_social: Option<String>,
    cantidad: f64,
    total: f64,
}

/// Units sold per day, station and company
pub async fn company_units(from: NaiveDate, to: NaiveDate) -> Result<Vec<CompanyUnitsRow>> {
    let db = get_connection()?;
    let sql = r#"
        SELECT
            f.fecha::date AS fecha,
            f.id_estacion::BIGINT AS id_estacion,
            f.razon_social,
            COALESCE(SUM(d.cantidad), 0)::float8 AS cantidad,
            COALESCE(SUM(d.total_renglon), 0)::float8 AS total
        FROM facturas_venta f
        JOIN facturas_venta_detalle d ON d.id_factura = f.id_factura
        WHERE f.fecha::date BETWEEN $1::date AND $2::date
        GROUP BY f.fecha::date, f.id_estacion, f.razon_social
        ORDER BY f.fecha::date, f.razon_social
    "#;
    let rows = UnitsRow::find_by_statement(range_statement(sql, from, to))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| CompanyUnitsRow {
            fecha: r.fecha,
            id_estacion: r.id_estacion,
            razon_social: r.razon_social,
            cantidad: r.cantidad,
            total: r.total,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evaluates the rule tables the way Postgres evaluates the COALESCEd ILIKE terms
    fn category_of(articulo: Option<&str>, grupo: Option<&str>) -> BillingCategory {
        let hit = |rules: &[Rule]| {
            rules.iter().any(|(column, keyword)| {
                let value = match column {
                    Column::Articulo => articulo,
                    Column::Grupo => grupo,
                };
                value.unwrap_or("").to_uppercase().contains(keyword)
            })
        };
        if hit(GNC_RULES) {
            BillingCategory::Gnc
        } else if hit(LIQUIDOS_RULES) {
            BillingCategory::Liquidos
        } else if hit(SHOP_RULES) {
            BillingCategory::Shop
        } else {
            BillingCategory::Otros
        }
    }

    #[test]
    fn lines_without_group_still_get_a_category() {
        assert_eq!(category_of(Some("NAFTA SUPER"), None), BillingCategory::Liquidos);
        assert_eq!(category_of(Some("LAVADO"), None), BillingCategory::Otros);
        assert_eq!(category_of(None, Some("Bebidas")), BillingCategory::Shop);
        assert_eq!(category_of(None, None), BillingCategory::Otros);
        assert_eq!(category_of(Some("GNC"), Some("COMBUSTIBLES")), BillingCategory::Gnc);
    }

    #[test]
    fn every_column_reference_is_null_safe() {
        for category in [
            BillingCategory::Gnc,
            BillingCategory::Liquidos,
            BillingCategory::Shop,
            BillingCategory::Otros,
        ] {
            let sql = category_filter(category);
            let bare = sql.matches("d.descripcion_").count();
            let wrapped = sql.matches("COALESCE(d.descripcion_").count();
            assert!(bare > 0);
            assert_eq!(bare, wrapped, "{:?}: {}", category, sql);
        }
    }

    #[test]
    fn categories_are_exclusive_in_order() {
        let gnc = any_of(GNC_RULES);
        let liquidos = any_of(LIQUIDOS_RULES);
        assert_eq!(category_filter(BillingCategory::Gnc), gnc);
        assert!(category_filter(BillingCategory::Liquidos).contains(&format!("AND NOT {}", gnc)));
        let otros = category_filter(BillingCategory::Otros);
        assert!(otros.starts_with("NOT ("));
        assert!(otros.contains(&liquidos));
        assert!(otros.contains(&any_of(SHOP_RULES)));
    }
}
