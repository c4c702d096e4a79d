//! GPIO interface trait
//!
//! Only the part of GPIO control the low power path needs: parking pins in
//! analog mode before sleep and putting them back afterwards.

use crate::platform::Result;

/// GPIO pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioMode {
    /// Input mode (high impedance)
    Input,
    /// Input mode with pull-up resistor
    InputPullUp,
    /// Input mode with pull-down resistor
    InputPullDown,
    /// Output mode (push-pull)
    OutputPushPull,
    /// Output mode (open-drain)
    OutputOpenDrain,
    /// Alternate function (peripheral owned)
    Alternate,
    /// Analog mode, Schmitt trigger disabled
    ///
    /// Lowest leakage state for an unused pin.
    Analog,
}

/// GPIO pin mode control
///
/// # Safety Invariants
///
/// - Only one owner per GPIO pin instance
pub trait GpioInterface {
    /// Set GPIO pin mode
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::Locked)` if the pin
    /// configuration is locked.
    fn set_mode(&mut self, mode: GpioMode) -> Result<()>;

    /// Get current GPIO pin mode
    fn mode(&self) -> GpioMode;
}
