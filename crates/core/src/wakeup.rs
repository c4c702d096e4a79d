//! Wake-up Source Descriptors
//!
//! Describes the hardware events that bring the system out of a low power
//! mode. Descriptors are validated here and forwarded to the platform by the
//! manager.
//!
//! # Reachability
//!
//! Not every source can wake every mode:
//!
//! | Source    | Deepest mode it wakes from |
//! |-----------|----------------------------|
//! | Wake pin  | SHUTDOWN                   |
//! | RTC alarm | STANDBY                    |
//! | UART RX   | STOP                       |

use crate::error::LpmError;
use crate::mode::LowPowerMode;

/// Number of dedicated wake-up pins
pub const WAKE_PIN_COUNT: u8 = 3;

/// RTC wake-up timer resolution
pub const RTC_TICK_MS: u32 = 1000;

/// Longest RTC wake-up period (16-bit counter of 1 s ticks)
pub const RTC_MAX_PERIOD_MS: u32 = (u16::MAX as u32 + 1) * RTC_TICK_MS;

/// Signal edge that triggers a wake-up pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeEdge {
    /// Low to high transition
    Rising,
    /// High to low transition
    Falling,
}

/// Dedicated wake-up pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakePin {
    /// Pin number, starting at 1
    pub pin: u8,
    /// Active edge
    pub edge: WakeEdge,
}

impl WakePin {
    /// Check the pin number
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidWakeSource` if `pin` is outside
    /// `1..=WAKE_PIN_COUNT`.
    pub fn validate(&self) -> Result<(), LpmError> {
        if self.pin == 0 || self.pin > WAKE_PIN_COUNT {
            return Err(LpmError::InvalidWakeSource);
        }
        Ok(())
    }

    /// Zero-based wake-up line index, as used by per-line register fields
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn line(&self) -> Result<usize, LpmError> {
        self.validate()?;
        Ok(usize::from(self.pin - 1))
    }
}

/// Periodic RTC wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcAlarm {
    /// Wake-up period in milliseconds
    pub period_ms: u32,
}

impl RtcAlarm {
    /// Check the period against the timer range
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidWakeSource` if the period is shorter than
    /// one tick, longer than `RTC_MAX_PERIOD_MS` or not a whole number of
    /// ticks.
    pub fn validate(&self) -> Result<(), LpmError> {
        if self.period_ms < RTC_TICK_MS
            || self.period_ms > RTC_MAX_PERIOD_MS
            || self.period_ms % RTC_TICK_MS != 0
        {
            return Err(LpmError::InvalidWakeSource);
        }
        Ok(())
    }

    /// Wake-up timer reload value
    ///
    /// The timer fires one tick after reaching zero, hence the decrement.
    pub fn reload(&self) -> Result<u16, LpmError> {
        self.validate()?;
        let ticks = self.period_ms / RTC_TICK_MS - 1;
        u16::try_from(ticks).map_err(|_| LpmError::InvalidWakeSource)
    }
}

/// UART able to wake the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartPort {
    /// Low power UART
    Lpuart1,
    /// USART1
    Usart1,
    /// USART2
    Usart2,
}

/// UART event that triggers the wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartWakeEvent {
    /// Start bit detected
    StartBit,
    /// Receive data register not empty
    RxNotEmpty,
    /// Received byte matches a 7-bit address
    AddressMatch(u8),
}

/// UART RX wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartWake {
    /// Port listening during STOP
    pub port: UartPort,
    /// Wake-up event
    pub event: UartWakeEvent,
}

impl UartWake {
    /// Check the event parameters
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidWakeSource` for an address wider than
    /// 7 bits.
    pub fn validate(&self) -> Result<(), LpmError> {
        match self.event {
            UartWakeEvent::AddressMatch(address) if address > 0x7F => {
                Err(LpmError::InvalidWakeSource)
            }
            _ => Ok(()),
        }
    }
}

/// Any wake-up source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSource {
    /// Wake-up pin
    Pin(WakePin),
    /// RTC wake-up timer
    Rtc(RtcAlarm),
    /// UART reception
    Uart(UartWake),
}

impl WakeSource {
    /// Validate the descriptor
    pub fn validate(&self) -> Result<(), LpmError> {
        match self {
            WakeSource::Pin(pin) => pin.validate(),
            WakeSource::Rtc(alarm) => alarm.validate(),
            WakeSource::Uart(uart) => uart.validate(),
        }
    }

    /// Deepest mode this source can wake the system from
    pub const fn deepest_mode(&self) -> LowPowerMode {
        match self {
            WakeSource::Pin(_) => LowPowerMode::Shutdown,
            WakeSource::Rtc(_) => LowPowerMode::Standby,
            WakeSource::Uart(_) => LowPowerMode::Stop,
        }
    }

    /// True if this source can end `mode`
    pub fn can_wake(&self, mode: LowPowerMode) -> bool {
        mode <= self.deepest_mode()
    }
}
