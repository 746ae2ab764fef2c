use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use contracts::domain::a002_sales_invoice::aggregate::{InvoiceSummary, SalesInvoice};
use contracts::domain::a003_receipt::aggregate::{Receipt, ReceiptSummary};
use contracts::shared::logger::IngestKind;
use contracts::usecases::common::{ImportProgress, ImportResponse, ImportStatus};
use contracts::usecases::u502_sync_billing::{
    BillingSyncResult, HistoryPeriodResult, HistorySummary, HistorySyncResult, SyncBillingRequest,
    SyncCounts,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::a002_sales_invoice::{repository as invoices, service as invoice_mapping};
use crate::domain::a003_receipt::{repository as receipts, service as receipt_mapping};
use crate::shared::config;
use crate::shared::dates::{monthly_periods, parse_date, to_compact_date, today, yesterday};
use crate::shared::ingest_log::repository as ingest_log;
use crate::shared::station_api::{api_error, ApiError, StationApiClient};
use crate::shared::xml::{parse_any, preview};
use crate::usecases::common::{new_session_id, started, ProgressTracker};

const INVOICES_PATH: &str = "Facturacion/GetFacturasVenta";
const RECEIPTS_PATH: &str = "CtaCte/GetRecibosEntreFechas";

fn aggregate_of(kind: IngestKind) -> &'static str {
    match kind {
        IngestKind::Facturas => "a002",
        IngestKind::Recibos => "a003",
    }
}

fn path_of(kind: IngestKind) -> &'static str {
    match kind {
        IngestKind::Facturas => INVOICES_PATH,
        IngestKind::Recibos => RECEIPTS_PATH,
    }
}

/// `fechaInicio` defaults to yesterday and `fechaFin` to `fechaInicio`
pub fn resolve_range(fecha_inicio: Option<&str>, fecha_fin: Option<&str>) -> (String, String) {
    let inicio = fecha_inicio
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| yesterday().format("%Y-%m-%d").to_string());
    let fin = fecha_fin
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| inicio.clone());
    (inicio, fin)
}

/// The last hour in UTC, as ISO timestamps the vendor accepts
pub fn last_hour_range() -> (String, String) {
    let now = Utc::now();
    let from = now - Duration::hours(1);
    (
        from.format("%Y-%m-%dT%H:%M:%S.000Z").to_string(),
        now.format("%Y-%m-%dT%H:%M:%S.999Z").to_string(),
    )
}

/// Executor для синхронизации счетов и квитанций (u502)
pub struct SyncBillingExecutor {
    pub progress_tracker: Arc<ProgressTracker>,
}

impl SyncBillingExecutor {
    pub fn new(progress_tracker: Arc<ProgressTracker>) -> Self {
        Self { progress_tracker }
    }

    pub async fn sync_invoices(&self, from: &str, to: &str) -> Result<SyncCounts> {
        let client = StationApiClient::from_config()?;
        sync_kind(&client, IngestKind::Facturas, from, to).await
    }

    pub async fn sync_receipts(&self, from: &str, to: &str) -> Result<SyncCounts> {
        let client = StationApiClient::from_config()?;
        sync_kind(&client, IngestKind::Recibos, from, to).await
    }

    /// Facturas y recibos en paralelo
    pub async fn sync_all(&self, from: &str, to: &str) -> Result<BillingSyncResult> {
        let client = StationApiClient::from_config()?;
        sync_pair(&client, from, to).await
    }

    /// Month by month from `sync.history_start` up to today
    pub async fn sync_history(&self) -> Result<HistorySyncResult> {
        let session_id = new_session_id();
        self.progress_tracker.create_session(session_id.clone());
        let result = self.execute_history(&session_id).await;
        self.close_session(&session_id, result.as_ref().err());
        result
    }

    /// Запустить синхронизацию в фоне
    pub async fn start(self: &Arc<Self>, request: SyncBillingRequest) -> Result<ImportResponse> {
        let session_id = new_session_id();
        self.progress_tracker.create_session(session_id.clone());

        let executor = Arc::clone(self);
        let sid = session_id.clone();
        tokio::spawn(async move {
            let result = if request.history {
                executor.execute_history(&sid).await.map(|_| ())
            } else {
                let (from, to) = resolve_range(
                    request.fecha_inicio.as_deref(),
                    request.fecha_fin.as_deref(),
                );
                executor.execute_range(&sid, &from, &to).await.map(|_| ())
            };
            if let Err(e) = &result {
                tracing::error!("Billing sync failed: {:#}", e);
            }
            executor.close_session(&sid, result.as_ref().err());
        });

        Ok(started(session_id))
    }

    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        self.progress_tracker.get_progress(session_id)
    }

    fn close_session(&self, session_id: &str, error: Option<&anyhow::Error>) {
        let Some(e) = error else {
            self.progress_tracker.finish_session(session_id);
            return;
        };
        // failed aggregates already carry their error
        let recorded = self
            .get_progress(session_id)
            .map(|p| !p.errors.is_empty())
            .unwrap_or(false);
        if !recorded {
            self.progress_tracker
                .add_error(session_id, None, format!("{:#}", e), None);
        }
        self.progress_tracker
            .complete_session(session_id, ImportStatus::Failed);
    }

    /// One range, both kinds, reported into `session_id`
    pub async fn execute_range(
        &self,
        session_id: &str,
        from: &str,
        to: &str,
    ) -> Result<BillingSyncResult> {
        let client = StationApiClient::from_config()?;
        self.progress_tracker
            .add_aggregate(session_id, "a002", "Facturas de venta");
        self.progress_tracker
            .add_aggregate(session_id, "a003", "Recibos");

        let label = format!("{} - {}", from, to);
        let (facturas, recibos) = tokio::join!(
            self.tracked(&client, session_id, IngestKind::Facturas, from, to, &label),
            self.tracked(&client, session_id, IngestKind::Recibos, from, to, &label),
        );
        Ok(BillingSyncResult {
            facturas: facturas?,
            recibos: recibos?,
        })
    }

    async fn tracked(
        &self,
        client: &StationApiClient,
        session_id: &str,
        kind: IngestKind,
        from: &str,
        to: &str,
        label: &str,
    ) -> Result<SyncCounts> {
        let index = aggregate_of(kind);
        self.progress_tracker
            .set_current_item(session_id, index, Some(label.to_string()));
        match sync_kind(client, kind, from, to).await {
            Ok(counts) => {
                self.progress_tracker.update_aggregate(
                    session_id,
                    index,
                    counts.registros as i32,
                    Some(counts.registros as i32),
                    counts.insertados as i32,
                    counts.actualizados as i32,
                );
                self.progress_tracker.complete_aggregate(session_id, index);
                Ok(counts)
            }
            Err(e) => {
                self.progress_tracker
                    .fail_aggregate(session_id, index, format!("{:#}", e));
                Err(e)
            }
        }
    }

    async fn execute_history(&self, session_id: &str) -> Result<HistorySyncResult> {
        let cfg = config::get()?;
        let start = parse_date(&cfg.sync.history_start)
            .ok_or_else(|| anyhow!("Invalid sync.history_start: {}", cfg.sync.history_start))?;
        let pause = std::time::Duration::from_millis(cfg.sync.history_pause_ms);
        let client = StationApiClient::from_config()?;

        let periods = monthly_periods(start, today());
        let total = periods.len();
        tracing::info!("Billing history sync: {} periods since {}", total, start);
        self.progress_tracker
            .add_aggregate(session_id, "a002", "Facturacion historica");

        let mut result = HistorySyncResult::default();
        for (i, (from, to)) in periods.iter().enumerate() {
            let periodo = format_period(*from, *to);
            tracing::info!("({}/{}) Period {}", i + 1, total, periodo);
            self.progress_tracker
                .set_current_item(session_id, "a002", Some(periodo.clone()));

            let from_s = from.format("%Y-%m-%d").to_string();
            let to_s = to.format("%Y-%m-%d").to_string();
            match sync_pair(&client, &from_s, &to_s).await {
                Ok(r) => result.data.push(HistoryPeriodResult {
                    periodo,
                    facturas: r.facturas,
                    recibos: r.recibos,
                }),
                Err(e) => {
                    tracing::error!("Period {} failed: {:#}", periodo, e);
                    self.progress_tracker.add_error(
                        session_id,
                        Some("a002"),
                        format!("{}: {}", periodo, e),
                        None,
                    );
                    result.resumen.errores += 1;
                }
            }

            let summary = summarize_history(&result.data, result.resumen.errores);
            self.progress_tracker.update_aggregate(
                session_id,
                "a002",
                (i + 1) as i32,
                Some(total as i32),
                (summary.facturas_insertadas + summary.recibos_insertados) as i32,
                (summary.facturas_actualizadas + summary.recibos_actualizados) as i32,
            );

            if i + 1 < total {
                tokio::time::sleep(pause).await;
            }
        }

        result.resumen = summarize_history(&result.data, result.resumen.errores);
        self.progress_tracker.complete_aggregate(session_id, "a002");
        Ok(result)
    }

    /// Vendor invoices, simplified. Dates are sent as YYYYMMDD.
    pub async fn passthrough_invoices(&self, desde: &str, hasta: &str) -> Result<Vec<InvoiceSummary>> {
        let doc = self.passthrough(INVOICES_PATH, desde, hasta).await?;
        Ok(invoice_mapping::summarize(&doc))
    }

    pub async fn passthrough_receipts(&self, desde: &str, hasta: &str) -> Result<Vec<ReceiptSummary>> {
        let doc = self.passthrough(RECEIPTS_PATH, desde, hasta).await?;
        Ok(receipt_mapping::summarize(&doc))
    }

    async fn passthrough(&self, path: &str, desde: &str, hasta: &str) -> Result<Value> {
        let client = StationApiClient::from_config()?;
        client
            .get_document(
                path,
                &[
                    ("desdeFecha", to_compact_date(desde)),
                    ("hastaFecha", to_compact_date(hasta)),
                ],
            )
            .await
    }
}

fn format_period(from: NaiveDate, to: NaiveDate) -> String {
    format!("{} - {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
}

pub fn summarize_history(data: &[HistoryPeriodResult], errores: usize) -> HistorySummary {
    HistorySummary {
        periodos: data.len(),
        facturas_insertadas: data.iter().map(|p| p.facturas.insertados).sum(),
        facturas_actualizadas: data.iter().map(|p| p.facturas.actualizados).sum(),
        recibos_insertados: data.iter().map(|p| p.recibos.insertados).sum(),
        recibos_actualizados: data.iter().map(|p| p.recibos.actualizados).sum(),
        errores,
    }
}

async fn sync_pair(client: &StationApiClient, from: &str, to: &str) -> Result<BillingSyncResult> {
    let (facturas, recibos) = tokio::join!(
        sync_kind(client, IngestKind::Facturas, from, to),
        sync_kind(client, IngestKind::Recibos, from, to),
    );
    Ok(BillingSyncResult {
        facturas: facturas?,
        recibos: recibos?,
    })
}

/// Fetch the vendor document. `None` when the vendor answered with an error page or status.
async fn fetch_document(
    client: &StationApiClient,
    kind: IngestKind,
    from: &str,
    to: &str,
) -> Result<Option<String>> {
    let query = [("desdeFecha", from.to_string()), ("hastaFecha", to.to_string())];
    match client.get_text(path_of(kind), &query).await {
        Ok(body) => Ok(Some(body)),
        Err(e) => match api_error(&e) {
            Some(ApiError::Status { status, body }) => {
                tracing::warn!(
                    "{} API warning ({}): {}",
                    kind.as_str(),
                    status,
                    preview(body)
                );
                Ok(None)
            }
            Some(ApiError::HtmlPage) => {
                tracing::warn!("{} API returned an HTML page", kind.as_str());
                Ok(None)
            }
            _ => Err(e),
        },
    }
}

/// Fetch, parse and upsert one kind. Every outcome except a vendor warning lands in `logs_ingesta`.
async fn sync_kind(
    client: &StationApiClient,
    kind: IngestKind,
    from: &str,
    to: &str,
) -> Result<SyncCounts> {
    let started_at = Instant::now();
    tracing::info!("Syncing {} from {} to {}", kind.as_str(), from, to);

    let body = match fetch_document(client, kind, from, to).await {
        Ok(Some(body)) => body,
        Ok(None) => return Ok(SyncCounts::default()),
        Err(e) => {
            record_failure(kind, 0, &e).await;
            return Err(e);
        }
    };
    if body.trim().is_empty() {
        tracing::info!("{}: empty response, nothing to sync", kind.as_str());
        return Ok(SyncCounts::default());
    }
    tracing::debug!("{} response ({} chars): {}", kind.as_str(), body.len(), preview(&body));

    let doc = match parse_any(&body) {
        Ok(doc) => doc,
        Err(e) => {
            let e = e.context(format!("Failed to parse {} response", kind.as_str()));
            record_failure(kind, 0, &e).await;
            return Err(e);
        }
    };

    let mut counts = SyncCounts::default();
    if let Err(e) = store_documents(kind, &doc, &mut counts).await {
        record_failure(kind, counts.registros, &e).await;
        return Err(e);
    }

    let elapsed = started_at.elapsed();
    tracing::info!(
        "{} synced: {} inserted, {} updated in {:.1}s",
        kind.as_str(),
        counts.insertados,
        counts.actualizados,
        elapsed.as_secs_f64()
    );
    if let Err(e) = ingest_log::record_success(
        kind,
        counts.registros,
        counts.insertados,
        counts.actualizados,
        elapsed,
    )
    .await
    {
        tracing::error!("Failed to record ingest success: {:#}", e);
    }
    Ok(counts)
}

async fn store_documents(kind: IngestKind, doc: &Value, counts: &mut SyncCounts) -> Result<()> {
    match kind {
        IngestKind::Facturas => {
            let items = invoice_mapping::invoice_nodes(doc)
                .into_iter()
                .map(invoice_mapping::map_invoice)
                .collect();
            store_each(kind, items, counts, |invoice: SalesInvoice| async move {
                invoices::upsert_invoice(&invoice)
                    .await
                    .with_context(|| format!("Invoice {}", invoice.header.numero))
            })
            .await
        }
        IngestKind::Recibos => {
            let items = receipt_mapping::receipt_nodes(doc)
                .into_iter()
                .map(receipt_mapping::map_receipt)
                .collect();
            store_each(kind, items, counts, |receipt: Receipt| async move {
                receipts::upsert_receipt(&receipt)
                    .await
                    .with_context(|| format!("Receipt {}", receipt.header.numero_recibo))
            })
            .await
        }
    }
}

/// A failed document is logged and skipped; the batch fails at the end if any did
async fn store_each<T, F, Fut>(
    kind: IngestKind,
    items: Vec<T>,
    counts: &mut SyncCounts,
    mut store: F,
) -> Result<()>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let total = items.len();
    let mut failures = Vec::new();
    for item in items {
        match store(item).await {
            Ok(inserted) => counts.record(inserted),
            Err(e) => {
                tracing::error!("{} document skipped: {:#}", kind.as_str(), e);
                failures.push(format!("{:#}", e));
            }
        }
    }
    match failures.first() {
        None => Ok(()),
        Some(first) => Err(anyhow!(
            "{} of {} {} documents failed, first: {}",
            failures.len(),
            total,
            kind.as_str(),
            first
        )),
    }
}

async fn record_failure(kind: IngestKind, registros: i64, error: &anyhow::Error) {
    if let Err(e) = ingest_log::record_failure(kind, registros, &format!("{:#}", error)).await {
        tracing::error!("Failed to record ingest failure: {:#}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::station_api::client::test_config;
    use httpmock::prelude::*;

    #[test]
    fn range_defaults() {
        let (inicio, fin) = resolve_range(Some("2024-03-01"), None);
        assert_eq!((inicio.as_str(), fin.as_str()), ("2024-03-01", "2024-03-01"));

        let (inicio, fin) = resolve_range(None, None);
        assert_eq!(inicio, yesterday().format("%Y-%m-%d").to_string());
        assert_eq!(fin, inicio);

        let (inicio, fin) = resolve_range(Some("2024-03-01"), Some("2024-03-31"));
        assert_eq!(fin, "2024-03-31");
        assert_eq!(inicio, "2024-03-01");
    }

    #[test]
    fn last_hour_is_iso() {
        let (from, to) = last_hour_range();
        assert!(from.ends_with(".000Z"));
        assert!(to.ends_with(".999Z"));
        assert!(from < to);
    }

    #[test]
    fn history_summary_adds_up_periods() {
        let period = |fi, fa, ri, ra| HistoryPeriodResult {
            periodo: "p".into(),
            facturas: SyncCounts {
                registros: fi + fa,
                insertados: fi,
                actualizados: fa,
            },
            recibos: SyncCounts {
                registros: ri + ra,
                insertados: ri,
                actualizados: ra,
            },
        };
        let summary = summarize_history(&[period(5, 1, 2, 0), period(3, 0, 1, 4)], 2);
        assert_eq!(summary.periodos, 2);
        assert_eq!(summary.facturas_insertadas, 8);
        assert_eq!(summary.recibos_actualizados, 4);
        assert_eq!(summary.errores, 2);
    }

    #[tokio::test]
    async fn vendor_error_yields_zero_counts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Facturacion/GetFacturasVenta");
                then.status(400).body("Rango invalido");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let counts = sync_kind(&client, IngestKind::Facturas, "2024-03-01", "2024-03-01")
            .await
            .unwrap();
        assert_eq!(counts, SyncCounts::default());
    }

    #[tokio::test]
    async fn empty_body_yields_zero_counts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/CtaCte/GetRecibosEntreFechas")
                    .query_param("desdeFecha", "2024-03-01");
                then.status(200).body("   ");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let counts = sync_kind(&client, IngestKind::Recibos, "2024-03-01", "2024-03-02")
            .await
            .unwrap();
        assert_eq!(counts.registros, 0);
    }

    #[tokio::test]
    async fn html_page_is_a_vendor_warning() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Facturacion/GetFacturasVenta");
                then.status(200).body("<!DOCTYPE html><html><body>Login</body></html>");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let body = fetch_document(&client, IngestKind::Facturas, "a", "b")
            .await
            .unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn failed_document_does_not_stop_the_batch() {
        let mut counts = SyncCounts::default();
        let result = store_each(IngestKind::Facturas, vec![1, 2, 3], &mut counts, |n| async move {
            if n == 2 {
                Err(anyhow!("duplicate key"))
            } else {
                Ok(n == 1)
            }
        })
        .await;

        let err = result.unwrap_err().to_string();
        assert!(err.starts_with("1 of 3 FACTURAS documents failed"));
        assert!(err.contains("duplicate key"));
        assert_eq!(counts.registros, 2);
        assert_eq!(counts.insertados, 1);
        assert_eq!(counts.actualizados, 1);
    }
}
