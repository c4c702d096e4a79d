#![cfg_attr(not(test), no_std)]

//! kineis_lpm - Low power mode manager for Kineis satellite IoT devices
//!
//! This library arbitrates low power transitions between firmware modules
//! and drives the MCU power controller. Mode types, arbitration, policy and
//! the retention record live in the `kineis_lpm_core` crate.

// Platform abstraction layer (power, wake-up, GPIO, retention)
pub mod platform;

// Logging macros and synchronized state
pub mod core;

// Mode transition engine, hooks and configuration
pub mod lpm;

// Built-in clients
pub mod clients;

// AT and SPI console commands
pub mod console;

pub use kineis_lpm_core as lpm_core;
pub use lpm::{LowPowerManager, LpmConfig, LpmState, Transition};
