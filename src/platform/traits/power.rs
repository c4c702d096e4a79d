//! Power controller interface trait
//!
//! This module defines the low power entry primitive that platform
//! implementations must provide.

use crate::platform::Result;
use kineis_lpm_core::LowPowerMode;

/// Power controller interface
///
/// # Blocking Contract
///
/// `enter_low_power` is a blocking, non-cancellable call. It programs the
/// power controller, executes the wait-for-interrupt instruction and returns
/// only once a wake-up event occurred. On real hardware STANDBY and SHUTDOWN
/// never return: the wake-up goes through a reset and the boot path calls
/// `LowPowerManager::resume`.
///
/// Methods take `&self` so the manager can drive the controller without
/// holding its state lock. Implementations touch memory-mapped registers or
/// use interior mutability.
pub trait PowerInterface {
    /// Enter `mode` and block until wake-up
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Power` if the controller refused the mode.
    /// The system is then still in run mode.
    fn enter_low_power(&self, mode: LowPowerMode) -> Result<()>;

    /// Clear latched wake-up flags
    ///
    /// Called after wake-up so that a stale flag does not abort the next
    /// entry.
    fn clear_wakeup_flags(&self) {}
}
