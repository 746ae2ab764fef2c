pub mod u501_sync_closures;
pub mod u502_sync_billing;
pub mod u503_sync_positions;
pub mod u504_sync_tanks;

pub use u501_sync_closures::U501SyncClosuresManager;
pub use u502_sync_billing::U502SyncBillingManager;
pub use u503_sync_positions::U503SyncPositionsManager;
pub use u504_sync_tanks::U504SyncTanksManager;
