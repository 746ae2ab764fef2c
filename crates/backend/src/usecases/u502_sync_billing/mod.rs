pub mod executor;

pub use executor::SyncBillingExecutor;
