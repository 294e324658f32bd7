//! Pixel source adapters.
//!
//! Source adapters can be layered on pixel sources.
//! An adapter implements each source trait that the source it wraps implements.

pub mod performance_metrics;
pub mod usage_log;
