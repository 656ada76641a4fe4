//! Shared utilities for tickerdesk
//!
//! Currently just tracing subscriber setup used by the binary.

pub mod logging;

pub use logging::{LogFormat, init_tracing, init_tracing_with};
