//! Provider registry module.
//!
//! Orchestrates reverse-geocoding providers:
//! - Priority ordering
//! - Per-provider retry with exponential backoff
//! - Fallback to the next provider once retries are exhausted
//! - Attempt diagnostics

mod diagnostics;
mod registry;

pub use diagnostics::{FetchDiagnostics, ProviderAttempt};
pub use registry::GeocoderRegistry;
