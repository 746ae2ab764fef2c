pub mod executor;

pub use executor::SyncClosuresExecutor;
