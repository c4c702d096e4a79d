//! Platform abstraction layer
//!
//! Hardware access of the low power manager: power controller, wake-up
//! sources, GPIO parking and retention memory. All register-level code is
//! isolated in this module.

pub mod error;
pub mod retention;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "stm32wl")]
pub mod stm32wl;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use retention::BackupRegisterRetention;
pub use traits::{GpioInterface, PowerInterface, RetentionStore, WakeupInterface};
