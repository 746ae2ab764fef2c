pub mod response;

pub use response::{CatalogSyncResult, RecategorizeResult};

use crate::usecases::common::UseCaseMetadata;

pub struct SyncCatalog;

impl UseCaseMetadata for SyncCatalog {
    fn usecase_index() -> &'static str {
        "u505"
    }

    fn usecase_name() -> &'static str {
        "sync_catalog"
    }

    fn display_name() -> &'static str {
        "Sincronizar articulos"
    }

    fn description() -> &'static str {
        "Combustibles y productos del proveedor, con su categoria"
    }
}
