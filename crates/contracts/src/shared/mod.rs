pub mod date_range;
pub mod logger;
pub mod response;
