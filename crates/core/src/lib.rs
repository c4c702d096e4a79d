//! kineis_lpm_core - Pure no_std logic of the Kineis low power manager
//!
//! This crate contains the platform-agnostic part of the low power manager:
//! everything that can be tested on host without any feature flags or
//! hardware access.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Clients and platform hooks injected via traits
//!
//! # Modules
//!
//! - [`mode`]: Low power modes and the allowed-mode bitmap
//! - [`client`]: Client trait and fixed-capacity registry
//! - [`policy`]: Allowed modes and per-mode platform hooks
//! - [`arbiter`]: Effective mode decision
//! - [`context`]: Manager context and retention record
//! - [`wakeup`]: Wake-up source descriptors
//! - [`stats`]: Transition counters
//! - [`error`]: Error type shared by all operations

#![no_std]

pub mod arbiter;
pub mod client;
pub mod context;
pub mod error;
pub mod mode;
pub mod policy;
pub mod stats;
pub mod wakeup;

pub use arbiter::decide;
pub use client::{ClientEntry, ClientId, ClientRegistry, LpmClient, MAX_CLIENTS};
pub use context::{LpmContext, RetentionRecord, RETENTION_MAGIC};
pub use error::LpmError;
pub use mode::{AllowedModes, LowPowerMode};
pub use policy::{ModeHook, ModeHooks, PolicyStore};
pub use stats::TransitionStats;
pub use wakeup::{
    RtcAlarm, UartPort, UartWake, UartWakeEvent, WakeEdge, WakePin, WakeSource, WAKE_PIN_COUNT,
};
