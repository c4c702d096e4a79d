//! Low power mode management
//!
//! - [`manager`]: Transition engine over clients, policy and platform
//! - [`config`]: Build-time configuration
//! - [`hooks`]: Ready-made per-mode platform hooks

pub mod config;
pub mod hooks;
pub mod manager;

pub use config::LpmConfig;
pub use hooks::{FnHook, GpioParkHook, HookChain};
pub use manager::{LowPowerManager, LpmState, Transition};
