pub mod request;
pub mod response;

pub use request::{ClosureDetailQuery, ClosureListQuery, SyncClosuresRequest, SyncRangeQuery};
pub use response::{ClosureSyncResult, DateRange};

use crate::usecases::common::UseCaseMetadata;

pub struct SyncClosures;

impl UseCaseMetadata for SyncClosures {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "sync_closures"
    }

    fn display_name() -> &'static str {
        "Sincronizar cierres de turno"
    }

    fn description() -> &'static str {
        "Descarga los cierres de turno por dia y los vuelca en datos_metricas y cierres_turno"
    }
}
