//! Domain layer for the fieldflow workflow engine
//!
//! This module contains the project model, the lifecycle stages, the
//! activity log model and the ports the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
