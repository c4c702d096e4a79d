//! Console UART client
//!
//! An RX start bit can wake the MCU from STOP, so an idle console allows
//! STOP. A transfer in flight needs the UART clocked and holds the system
//! in SLEEP.

use core::sync::atomic::{AtomicBool, Ordering};

use kineis_lpm_core::{LowPowerMode, LpmClient};

/// Console UART client
#[derive(Debug, Default)]
pub struct UartClient {
    active: AtomicBool,
}

impl UartClient {
    /// Idle UART
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// A transfer started (called from the UART driver)
    pub fn begin_transfer(&self) {
        self.active.store(true, Ordering::Release);
    }

    /// The transfer completed
    pub fn end_transfer(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// True while a transfer is running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl LpmClient for UartClient {
    fn deepest_mode(&self) -> LowPowerMode {
        if self.is_active() {
            LowPowerMode::Sleep
        } else {
            LowPowerMode::Stop
        }
    }

    fn on_enter(&self, mode: LowPowerMode) -> Result<(), &'static str> {
        // A transfer may have started after arbitration
        if self.is_active() && mode > LowPowerMode::Sleep {
            return Err("transfer in progress");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "uart"
    }
}
