//! Adapters layer: Concrete implementations of ports.
//!
//! - `forest`: random forest evaluation over exported tree arrays
//! - `artifacts`: download-if-missing resolution of model files
//! - `sanitize`: PII filtering for logs

pub mod artifacts;
pub mod forest;
pub mod sanitize;
