pub mod request;
pub mod response;

pub use request::{PositionHistoryQuery, PositionsQuery, SyncPositionsRequest};
pub use response::PositionSyncResult;

use crate::usecases::common::UseCaseMetadata;

pub struct SyncPositions;

impl UseCaseMetadata for SyncPositions {
    fn usecase_index() -> &'static str {
        "u503"
    }

    fn usecase_name() -> &'static str {
        "sync_positions"
    }

    fn display_name() -> &'static str {
        "Sincronizar posiciones de vehiculos"
    }
}
