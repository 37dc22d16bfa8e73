//! Declaration desk: request lifecycle and batch document generation for
//! administrative declaration letters.

pub mod config;
pub mod error;
pub mod infra;
pub mod telemetry;
pub mod workflows;
