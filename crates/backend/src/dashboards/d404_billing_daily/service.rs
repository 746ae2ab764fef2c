use anyhow::Result;
use contracts::dashboards::d404_billing_daily::dto::{
    BillingCategory, CompanyUnitsRow, DailyArticleBillingRow, DailyCustomerBillingRow,
    DailyReceiptRow, REPORT_TYPES,
};
use contracts::shared::date_range::{DateRangeQuery, ReportQuery};
use serde::Serialize;

use super::repository;
use crate::dashboards::month_to_date;

pub async fn billing_by_customer(query: &DateRangeQuery) -> Result<Vec<DailyCustomerBillingRow>> {
    let (from, to) = month_to_date(query);
    repository::billing_by_customer(from, to).await
}

pub async fn billing_by_article(
    category: BillingCategory,
    query: &DateRangeQuery,
) -> Result<Vec<DailyArticleBillingRow>> {
    let (from, to) = month_to_date(query);
    tracing::debug!("facturacion diaria {} {} .. {}", category.as_str(), from, to);
    repository::billing_by_article(category, from, to).await
}

pub async fn receipts_by_customer(query: &DateRangeQuery) -> Result<Vec<DailyReceiptRow>> {
    let (from, to) = month_to_date(query);
    repository::receipts_by_customer(from, to).await
}

/// Result of `GET /api/reportes?tipo=`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    CompanyUnits(Vec<CompanyUnitsRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportKind {
    CompanyUnits,
}

impl ReportKind {
    pub fn parse(tipo: Option<&str>) -> Option<Self> {
        match tipo.map(str::trim) {
            Some("unidades-empresa") => Some(ReportKind::CompanyUnits),
            _ => None,
        }
    }
}

pub fn available_types() -> Vec<&'static str> {
    REPORT_TYPES.to_vec()
}

pub async fn run_report(kind: ReportKind, query: &ReportQuery) -> Result<Report> {
    let (from, to) = month_to_date(&query.range());
    match kind {
        ReportKind::CompanyUnits => Ok(Report::CompanyUnits(
            repository::company_units(from, to).await?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_kind_parsing() {
        assert_eq!(
            ReportKind::parse(Some("unidades-empresa")),
            Some(ReportKind::CompanyUnits)
        );
        assert_eq!(ReportKind::parse(Some("ventas")), None);
        assert_eq!(ReportKind::parse(None), None);
        assert_eq!(available_types(), vec!["unidades-empresa"]);
    }
}
