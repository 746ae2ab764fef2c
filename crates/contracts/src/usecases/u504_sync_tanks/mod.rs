pub mod response;

pub use response::TankSyncResult;

use crate::usecases::common::UseCaseMetadata;

pub struct SyncTanks;

impl UseCaseMetadata for SyncTanks {
    fn usecase_index() -> &'static str {
        "u504"
    }

    fn usecase_name() -> &'static str {
        "sync_tanks"
    }

    fn display_name() -> &'static str {
        "Actualizar niveles de tanques"
    }
}
