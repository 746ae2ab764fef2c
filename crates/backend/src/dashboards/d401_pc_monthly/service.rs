use anyhow::Result;
use contracts::dashboards::d401_pc_monthly::dto::{PcMonthlyRow, PcSummaryRow};
use contracts::shared::date_range::DateRangeQuery;

use super::repository;
use crate::dashboards::month_to_date;

pub async fn get_monthly(query: &DateRangeQuery) -> Result<Vec<PcMonthlyRow>> {
    let (from, to) = month_to_date(query);
    tracing::debug!("pcMensual {} .. {}", from, to);
    repository::monthly_sales(from, to).await
}

pub async fn get_summary(query: &DateRangeQuery) -> Result<Vec<PcSummaryRow>> {
    let (from, to) = month_to_date(query);
    repository::monthly_summary(from, to).await
}
