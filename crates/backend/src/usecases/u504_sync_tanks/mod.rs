pub mod executor;

pub use executor::SyncTanksExecutor;
