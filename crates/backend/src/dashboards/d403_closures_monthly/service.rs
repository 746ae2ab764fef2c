use anyhow::Result;
use contracts::dashboards::d403_closures_monthly::dto::ClosureTotalsRow;
use contracts::shared::date_range::DateRangeQuery;

use super::repository;
use crate::dashboards::month_to_date;

pub async fn get_closure_totals(query: &DateRangeQuery) -> Result<Vec<ClosureTotalsRow>> {
    let (from, to) = month_to_date(query);
    repository::closure_totals(from, to).await
}
