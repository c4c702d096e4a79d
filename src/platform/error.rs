//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their register-level failures to these
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Low power entry failed
    Power(PowerError),
    /// Wake-up source configuration failed
    Wakeup(WakeupError),
    /// GPIO operation failed
    Gpio(GpioError),
    /// Retention memory access failed
    Retention(RetentionError),
}

/// Power controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    /// Mode not supported by this platform
    UnsupportedMode,
    /// A pending wake-up event prevented entry
    WakeupPending,
}

/// Wake-up configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeupError {
    /// Pin has no wake-up function
    InvalidPin,
    /// RTC wake-up timer could not be programmed
    RtcBusy,
    /// UART cannot wake the system from low power
    UnsupportedUart,
}

/// GPIO-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// Pin configuration is locked until the next reset
    Locked,
}

/// Retention memory errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionError {
    /// Backup domain is write protected
    WriteProtected,
    /// Readback after write did not match
    VerifyFailed,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Power(e) => write!(f, "Power error: {:?}", e),
            PlatformError::Wakeup(e) => write!(f, "Wake-up error: {:?}", e),
            PlatformError::Gpio(e) => write!(f, "GPIO error: {:?}", e),
            PlatformError::Retention(e) => write!(f, "Retention error: {:?}", e),
        }
    }
}

impl PlatformError {
    /// Short error name for logging
    pub const fn as_str(&self) -> &'static str {
        match self {
            PlatformError::Power(_) => "power",
            PlatformError::Wakeup(_) => "wake-up",
            PlatformError::Gpio(_) => "gpio",
            PlatformError::Retention(_) => "retention",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        let error = PlatformError::Power(PowerError::WakeupPending);
        assert_eq!(format!("{}", error), "Power error: WakeupPending");
        assert_eq!(error.as_str(), "power");
    }

    #[test]
    fn test_gpio_error_display() {
        let error = PlatformError::Gpio(GpioError::Locked);
        assert_eq!(format!("{}", error), "GPIO error: Locked");
        assert_eq!(error.as_str(), "gpio");
    }
}
