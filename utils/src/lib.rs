//! Shared infrastructure utilities for voxcalc.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename) for
//!   history and exports
//! - **`security`**: Secret redaction for solver diagnostics

pub mod atomic_write;
pub mod security;

pub use atomic_write::{atomic_write, recover_bak_file};
pub use security::{SecretRedactor, redact_api_keys, sanitize_diagnostic};
