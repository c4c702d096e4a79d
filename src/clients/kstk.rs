//! Kineis stack client
//!
//! The radio stack reports which of its resources are in use. The deepest
//! mode it can survive follows from that status:
//!
//! | Resources in use        | Deepest mode |
//! |-------------------------|--------------|
//! | none                    | SHUTDOWN     |
//! | TX timeout timer        | SLEEP        |
//! | anything else           | STANDBY      |
//!
//! The TX timeout timer is only able to wake the MCU from SLEEP. The other
//! timers are backed by the RTC, which survives STANDBY.

use core::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use kineis_lpm_core::{LowPowerMode, LpmClient};

bitflags! {
    /// Stack resources currently in use
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StackResources: u8 {
        /// Periodic TX timer armed
        const TX_PERIOD = 0x01;
        /// TX timeout timer armed
        const TX_TIMEOUT = 0x02;
        /// RF front end powered
        const RF_ACTIVE = 0x04;
        /// RX window timer armed
        const RX_WINDOW = 0x08;
    }
}

/// Kineis stack client
///
/// The stack updates the resource status from its own context with
/// [`set_resources`](Self::set_resources); the manager reads it during
/// arbitration.
///
/// # Example
///
/// ```
/// use kineis_lpm::clients::{StackClient, StackResources};
/// use kineis_lpm_core::{LowPowerMode, LpmClient};
///
/// let stack = StackClient::new();
/// assert_eq!(stack.deepest_mode(), LowPowerMode::Shutdown);
///
/// stack.set_resources(StackResources::TX_TIMEOUT);
/// assert_eq!(stack.deepest_mode(), LowPowerMode::Sleep);
/// ```
#[derive(Debug, Default)]
pub struct StackClient {
    resources: AtomicU8,
}

impl StackClient {
    /// Idle stack
    pub const fn new() -> Self {
        Self {
            resources: AtomicU8::new(0),
        }
    }

    /// Replace the resource status
    pub fn set_resources(&self, resources: StackResources) {
        self.resources.store(resources.bits(), Ordering::Release);
    }

    /// Mark `resources` as in use
    pub fn acquire(&self, resources: StackResources) {
        self.resources.fetch_or(resources.bits(), Ordering::AcqRel);
    }

    /// Mark `resources` as released
    pub fn release(&self, resources: StackResources) {
        self.resources.fetch_and(!resources.bits(), Ordering::AcqRel);
    }

    /// Current resource status
    pub fn resources(&self) -> StackResources {
        StackResources::from_bits_truncate(self.resources.load(Ordering::Acquire))
    }
}

impl LpmClient for StackClient {
    fn deepest_mode(&self) -> LowPowerMode {
        let resources = self.resources();
        if resources.is_empty() {
            LowPowerMode::Shutdown
        } else if resources.contains(StackResources::TX_TIMEOUT) {
            LowPowerMode::Sleep
        } else {
            LowPowerMode::Standby
        }
    }

    fn name(&self) -> &'static str {
        "kstk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_stack_tolerates_shutdown() {
        let stack = StackClient::new();
        assert_eq!(stack.deepest_mode(), LowPowerMode::Shutdown);
    }

    #[test]
    fn test_tx_timeout_limits_to_sleep() {
        let stack = StackClient::new();
        stack.set_resources(StackResources::TX_PERIOD | StackResources::TX_TIMEOUT);
        assert_eq!(stack.deepest_mode(), LowPowerMode::Sleep);
    }

    #[test]
    fn test_other_resources_limit_to_standby() {
        let stack = StackClient::new();
        stack.acquire(StackResources::TX_PERIOD);
        assert_eq!(stack.deepest_mode(), LowPowerMode::Standby);

        stack.acquire(StackResources::RX_WINDOW);
        stack.release(StackResources::TX_PERIOD);
        assert_eq!(stack.resources(), StackResources::RX_WINDOW);
        assert_eq!(stack.deepest_mode(), LowPowerMode::Standby);

        stack.release(StackResources::RX_WINDOW);
        assert_eq!(stack.deepest_mode(), LowPowerMode::Shutdown);
    }

    #[test]
    fn test_notifications_always_accept() {
        let stack = StackClient::new();
        stack.set_resources(StackResources::RF_ACTIVE);
        for mode in LowPowerMode::ALL {
            assert!(stack.on_enter(mode).is_ok());
            assert!(stack.on_exit(mode).is_ok());
        }
    }
}
