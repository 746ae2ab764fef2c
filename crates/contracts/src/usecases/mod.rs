pub mod common;
pub mod u501_sync_closures;
pub mod u502_sync_billing;
pub mod u503_sync_positions;
pub mod u504_sync_tanks;
pub mod u505_sync_catalog;
