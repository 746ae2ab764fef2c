//! DTO shared between the reporting backend and its HTTP clients.

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod system;
pub mod usecases;
