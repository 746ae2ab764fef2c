use anyhow::Result;
use contracts::dashboards::d402_subdiary::dto::SubdiaryRow;
use contracts::shared::date_range::DateRangeQuery;

use super::repository;
use crate::shared::dates::parse_date;

/// Unlike the other reports a missing bound is not defaulted
pub async fn get_subdiary(query: &DateRangeQuery) -> Result<Vec<SubdiaryRow>> {
    let from = query.fecha_inicio.as_deref().and_then(parse_date);
    let to = query.fecha_fin.as_deref().and_then(parse_date);
    repository::subdiary(from, to).await
}
