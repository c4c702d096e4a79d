//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod gpio;
pub mod power;
pub mod retention;
pub mod wakeup;

// Re-export trait interfaces
pub use gpio::{GpioInterface, GpioMode};
pub use power::PowerInterface;
pub use retention::RetentionStore;
pub use wakeup::WakeupInterface;
