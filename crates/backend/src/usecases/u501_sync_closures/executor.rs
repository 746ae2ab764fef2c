use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use contracts::domain::a001_shift_closure::aggregate::ShiftClosure;
use contracts::domain::a007_station_catalog::aggregate::StationMappings;
use contracts::usecases::common::{ImportProgress, ImportResponse, ImportStatus};
use contracts::usecases::u501_sync_closures::{ClosureSyncResult, DateRange, SyncClosuresRequest};
use serde_json::Value;
use std::sync::Arc;

use crate::domain::a001_shift_closure::repository::{self, ClosureOrigin, MetricRow};
use crate::domain::a001_shift_closure::service::{
    classify_register, parse_closure_info, parse_closures,
};
use crate::domain::a007_station_catalog::service as station_catalog;
use crate::shared::config;
use crate::shared::dates::{date_range_inclusive, parse_api_datetime, parse_date, today};
use crate::shared::station_api::StationApiClient;
use crate::usecases::common::{new_session_id, started, ProgressTracker};

const AGGREGATE: &str = "a001";

/// Executor для синхронизации закрытий смен (u501)
pub struct SyncClosuresExecutor {
    pub progress_tracker: Arc<ProgressTracker>,
}

impl SyncClosuresExecutor {
    pub fn new(progress_tracker: Arc<ProgressTracker>) -> Self {
        Self { progress_tracker }
    }

    /// Station and register used when the request does not name them
    pub fn default_origin() -> Result<(i64, i64)> {
        let cfg = config::get()?;
        Ok((cfg.api.station_id, cfg.api.register_id))
    }

    /// `Cierres/GetUltimosCierresTurno` for one day
    pub async fn list_closures(
        &self,
        id_estacion: i64,
        id_caja: i64,
        fecha: &str,
    ) -> Result<Vec<ShiftClosure>> {
        let client = StationApiClient::from_config()?;
        fetch_closures(&client, id_estacion, id_caja, fecha).await
    }

    /// `Cierres/GetInformacionCierreTurno`, returned as the vendor document
    pub async fn closure_detail(
        &self,
        id_estacion: i64,
        id_caja: i64,
        fecha_hora_cierre: &str,
    ) -> Result<Value> {
        let client = StationApiClient::from_config()?;
        fetch_closure_info(&client, id_estacion, id_caja, fecha_hora_cierre).await
    }

    /// Синхронная синхронизация диапазона дат
    pub async fn sync_range(&self, from: NaiveDate, to: NaiveDate) -> Result<ClosureSyncResult> {
        let session_id = new_session_id();
        self.progress_tracker.create_session(session_id.clone());
        let result = self.execute(&session_id, from, to).await;
        self.close_session(&session_id, &result);
        result
    }

    /// From the day after the last stored metric up to today
    pub async fn sync_auto(&self) -> Result<ClosureSyncResult> {
        let (from, to) = auto_range().await?;
        self.sync_range(from, to).await
    }

    /// Запустить синхронизацию в фоне и вернуть session_id
    pub async fn start(self: &Arc<Self>, request: SyncClosuresRequest) -> Result<ImportResponse> {
        let (from, to) = match (&request.fecha_inicio, &request.fecha_fin) {
            (Some(from), Some(to)) => (
                parse_date(from).ok_or_else(|| anyhow!("Invalid fecha_inicio: {}", from))?,
                parse_date(to).ok_or_else(|| anyhow!("Invalid fecha_fin: {}", to))?,
            ),
            _ => auto_range().await?,
        };

        let session_id = new_session_id();
        self.progress_tracker.create_session(session_id.clone());

        let executor = Arc::clone(self);
        let sid = session_id.clone();
        tokio::spawn(async move {
            let result = executor.execute(&sid, from, to).await;
            if let Err(e) = &result {
                tracing::error!("Closures sync failed: {:#}", e);
            }
            executor.close_session(&sid, &result);
        });

        Ok(started(session_id))
    }

    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        self.progress_tracker.get_progress(session_id)
    }

    fn close_session(&self, session_id: &str, result: &Result<ClosureSyncResult>) {
        match result {
            Ok(_) => self.progress_tracker.finish_session(session_id),
            Err(e) => {
                self.progress_tracker
                    .fail_aggregate(session_id, AGGREGATE, format!("{:#}", e));
                self.progress_tracker
                    .complete_session(session_id, ImportStatus::Failed);
            }
        }
    }

    /// Основной цикл: день за днём, ошибки дня не прерывают синхронизацию
    pub async fn execute(
        &self,
        session_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ClosureSyncResult> {
        let client = StationApiClient::from_config()?;
        let (id_estacion, id_caja) = Self::default_origin()?;

        let days = date_range_inclusive(from, to);
        let total_days = days.len();
        tracing::info!(
            "Syncing closures from {} to {} ({} days)",
            from,
            to,
            total_days
        );

        self.progress_tracker
            .add_aggregate(session_id, AGGREGATE, "Cierres de turno");

        let mut total_cierres = 0usize;
        for (i, day) in days.iter().enumerate() {
            let fecha = day.format("%Y-%m-%d").to_string();
            let pct = (i + 1) as f64 / total_days as f64 * 100.0;
            tracing::info!("({}/{}) Processing {} - {:.1}%", i + 1, total_days, fecha, pct);
            self.progress_tracker
                .set_current_item(session_id, AGGREGATE, Some(fecha.clone()));

            match sync_day(&client, id_estacion, id_caja, &fecha).await {
                Ok(stored) => total_cierres += stored,
                Err(e) => {
                    tracing::error!("Closures of {} failed: {:#}", fecha, e);
                    self.progress_tracker.add_error(
                        session_id,
                        Some(AGGREGATE),
                        format!("{}: {}", fecha, e),
                        Some(format!("{:#}", e)),
                    );
                }
            }

            self.progress_tracker.update_aggregate(
                session_id,
                AGGREGATE,
                (i + 1) as i32,
                Some(total_days as i32),
                total_cierres as i32,
                0,
            );
        }

        self.progress_tracker.complete_aggregate(session_id, AGGREGATE);
        tracing::info!("Closures sync completed: {} closures stored", total_cierres);

        Ok(ClosureSyncResult {
            ok: true,
            message: "Sincronización completada correctamente".to_string(),
            total_cierres,
            rango: DateRange {
                desde: from.format("%Y-%m-%d").to_string(),
                hasta: to.format("%Y-%m-%d").to_string(),
            },
        })
    }
}

/// `(MAX(fecha) + 1 day, today)`, or `sync.closures_default_start` when nothing is stored
pub async fn auto_range() -> Result<(NaiveDate, NaiveDate)> {
    let from = match repository::last_metric_date().await? {
        Some(last) => last + Duration::days(1),
        None => {
            let start = &config::get()?.sync.closures_default_start;
            parse_date(start).ok_or_else(|| anyhow!("Invalid sync.closures_default_start: {}", start))?
        }
    };
    Ok((from, today()))
}

async fn fetch_closures(
    client: &StationApiClient,
    id_estacion: i64,
    id_caja: i64,
    fecha: &str,
) -> Result<Vec<ShiftClosure>> {
    let doc = client
        .get_document(
            "Cierres/GetUltimosCierresTurno",
            &[
                ("idEstacion", id_estacion.to_string()),
                ("idCaja", id_caja.to_string()),
                ("fecha", fecha.to_string()),
            ],
        )
        .await?;
    Ok(parse_closures(&doc))
}

async fn fetch_closure_info(
    client: &StationApiClient,
    id_estacion: i64,
    id_caja: i64,
    fecha_hora_cierre: &str,
) -> Result<Value> {
    client
        .get_document(
            "Cierres/GetInformacionCierreTurno",
            &[
                ("idEstacion", id_estacion.to_string()),
                ("idCaja", id_caja.to_string()),
                ("fechaHoraCierre", fecha_hora_cierre.to_string()),
            ],
        )
        .await
}

/// The closure's own register wins over the requested one; the name follows the id
fn closure_origin(
    closure: &ShiftClosure,
    id_estacion: i64,
    id_caja: i64,
    catalog: &StationMappings,
) -> ClosureOrigin {
    let caja_id = closure.id_caja.unwrap_or(id_caja);
    ClosureOrigin {
        estacion_id: id_estacion,
        nombre_estacion: catalog.station_name(id_estacion).map(str::to_string),
        caja_id,
        nombre_caja: catalog
            .register_name(caja_id)
            .map(str::to_string)
            .or_else(|| closure.caja.clone()),
    }
}

/// Stores every closure of one day. Returns how many were stored.
async fn sync_day(
    client: &StationApiClient,
    id_estacion: i64,
    id_caja: i64,
    fecha: &str,
) -> Result<usize> {
    let closures = fetch_closures(client, id_estacion, id_caja, fecha).await?;
    if closures.is_empty() {
        tracing::info!("No closures for {}", fecha);
        return Ok(0);
    }

    let catalog = station_catalog::current();
    let mut stored = 0;
    for closure in &closures {
        let Some(fecha_hora) = closure.fecha.as_deref().filter(|f| !f.is_empty()) else {
            tracing::warn!(
                "Closure {:?} has no Fecha, skipping",
                closure.id_cierre_turno
            );
            continue;
        };

        let info_doc = fetch_closure_info(client, id_estacion, id_caja, fecha_hora).await?;
        let info = parse_closure_info(&info_doc);

        let caja = closure.caja.clone().unwrap_or_default();
        let (depto_id, producto_id) = classify_register(&caja);
        let origin = closure_origin(closure, id_estacion, id_caja, &catalog);
        let fecha_cierre = parse_api_datetime(fecha_hora);

        repository::store_metric(
            &MetricRow {
                fecha: fecha_cierre,
                depto_id,
                producto_id,
                cantidad: info.total_litros_despachados,
                importe: info.effective_amount(),
            },
            &origin,
        )
        .await?;
        repository::store_closure_totals(closure, fecha_cierre, &info, &origin).await?;

        tracing::info!(
            "Stored closure {:?} ({})",
            closure.id_cierre_turno,
            caja
        );
        stored += 1;
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::station_api::client::test_config;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn closures_of_a_day_are_parsed_from_xml() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/Cierres/GetUltimosCierresTurno")
                    .query_param("idEstacion", "1")
                    .query_param("idCaja", "2")
                    .query_param("fecha", "2024-03-05");
                then.status(200).body(
                    "<ArrayOfCierreTurno>\
                     <CierreTurno><Fecha>05/03/2024 06:00:00</Fecha><IdCierreTurno>10</IdCierreTurno><Caja>PLAYA</Caja></CierreTurno>\
                     <CierreTurno><Fecha>05/03/2024 14:00:00</Fecha><IdCierreTurno>11</IdCierreTurno><Caja>SHOP</Caja></CierreTurno>\
                     </ArrayOfCierreTurno>",
                );
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let closures = fetch_closures(&client, 1, 2, "2024-03-05").await.unwrap();
        assert_eq!(closures.len(), 2);
        assert_eq!(closures[1].id_cierre_turno, Some(11));
    }

    #[tokio::test]
    async fn day_without_closures_stores_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Cierres/GetUltimosCierresTurno");
                then.status(200).body("<ArrayOfCierreTurno />");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        assert_eq!(sync_day(&client, 1, 2, "2024-03-05").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn closure_detail_passes_the_closure_timestamp() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/Cierres/GetInformacionCierreTurno")
                    .query_param("fechaHoraCierre", "05/03/2024 06:00:00");
                then.status(200).body(
                    "<InformacionCierreTurno><TotalLitrosDespachados>1500.5</TotalLitrosDespachados></InformacionCierreTurno>",
                );
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let doc = fetch_closure_info(&client, 1, 2, "05/03/2024 06:00:00")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(parse_closure_info(&doc).total_litros_despachados, 1500.5);
    }

    #[test]
    fn register_name_follows_the_closure_register() {
        let mut catalog = StationMappings::default();
        catalog.estaciones.insert(1, "Ruta 9".into());
        catalog.cajas.insert(2, "PLAYA".into());
        catalog.cajas.insert(5, "SHOP".into());

        let closure = ShiftClosure {
            fecha: Some("05/03/2024 06:00".into()),
            id_cierre_turno: Some(77),
            numero_turno: Some(1),
            id_caja: Some(5),
            caja: Some("Shop central".into()),
            id_cierre_caja_tesoreria: None,
        };
        let origin = closure_origin(&closure, 1, 2, &catalog);
        assert_eq!(origin.caja_id, 5);
        assert_eq!(origin.nombre_caja.as_deref(), Some("SHOP"));
        assert_eq!(origin.nombre_estacion.as_deref(), Some("Ruta 9"));

        let unnamed = ShiftClosure {
            id_caja: Some(9),
            ..closure.clone()
        };
        let origin = closure_origin(&unnamed, 1, 2, &catalog);
        assert_eq!(origin.caja_id, 9);
        assert_eq!(origin.nombre_caja.as_deref(), Some("Shop central"));

        let without_register = ShiftClosure {
            id_caja: None,
            ..closure
        };
        let origin = closure_origin(&without_register, 1, 2, &catalog);
        assert_eq!(origin.caja_id, 2);
        assert_eq!(origin.nombre_caja.as_deref(), Some("PLAYA"));
    }
}
