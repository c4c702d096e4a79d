//! Core infrastructure
//!
//! Logging macros and the synchronized state abstraction used by the low
//! power manager.

pub mod logging;
pub mod traits;
