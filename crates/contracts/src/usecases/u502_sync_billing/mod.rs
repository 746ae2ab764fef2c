pub mod request;
pub mod response;

pub use request::{BillingSyncQuery, IngestLogQuery, PassthroughQuery, SyncBillingRequest};
pub use response::{BillingSyncResult, HistoryPeriodResult, HistorySummary, HistorySyncResult, SyncCounts};

use crate::usecases::common::UseCaseMetadata;

pub struct SyncBilling;

impl UseCaseMetadata for SyncBilling {
    fn usecase_index() -> &'static str {
        "u502"
    }

    fn usecase_name() -> &'static str {
        "sync_billing"
    }

    fn display_name() -> &'static str {
        "Sincronizar facturacion"
    }

    fn description() -> &'static str {
        "Facturas de venta y recibos de cuenta corriente"
    }
}
