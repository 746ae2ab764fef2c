pub mod aggregate;
pub mod progress;
