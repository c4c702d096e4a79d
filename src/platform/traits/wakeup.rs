//! Wake-up source interface trait

use crate::platform::Result;
use kineis_lpm_core::{RtcAlarm, UartWake, WakePin};

/// Wake-up source configuration
///
/// Descriptors reaching these methods are already validated by the manager.
pub trait WakeupInterface {
    /// Arm a dedicated wake-up pin
    fn configure_pin(&self, pin: WakePin) -> Result<()>;

    /// Program the periodic RTC wake-up timer
    fn configure_rtc(&self, alarm: RtcAlarm) -> Result<()>;

    /// Allow a UART to wake the system on reception
    fn configure_uart(&self, uart: UartWake) -> Result<()>;

    /// Disarm every wake-up source
    fn disable_all(&self) -> Result<()>;
}
