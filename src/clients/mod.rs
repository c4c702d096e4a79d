//! Built-in low power manager clients
//!
//! - [`StackClient`]: Kineis radio stack, tolerance follows the stack
//!   resources in use
//! - [`UartClient`]: console UART, keeps the system in SLEEP while a
//!   transfer is running

pub mod kstk;
pub mod uart;

pub use kstk::{StackClient, StackResources};
pub use uart::UartClient;
