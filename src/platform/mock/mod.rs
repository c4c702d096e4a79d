//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use kineis_lpm::platform::mock::{MockPower, MockRetention};
//! use kineis_lpm::platform::traits::{PowerInterface, RetentionStore};
//! use kineis_lpm_core::LowPowerMode;
//!
//! let power = MockPower::new();
//! let retention = MockRetention::new();
//! power.enter_low_power(LowPowerMode::Sleep).unwrap();
//! assert!(retention.restore().is_none());
//! ```

#![cfg(any(test, feature = "mock"))]

mod gpio;
mod power;
mod retention;

pub use gpio::MockGpio;
pub use power::MockPower;
pub use retention::MockRetention;
