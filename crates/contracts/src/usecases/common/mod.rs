//! Types shared by every sync use case

pub mod progress;
pub mod response;
pub mod usecase_metadata;

pub use progress::{
    AggregateImportStatus, AggregateProgress, ImportError, ImportProgress, ImportStatus,
};
pub use response::{ImportResponse, ImportStartStatus};
pub use usecase_metadata::UseCaseMetadata;
