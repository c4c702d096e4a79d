//! Mock GPIO implementation for testing

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode},
    Result,
};

/// Mock GPIO implementation
///
/// Tracks the pin mode and the number of mode changes for test
/// verification. A locked pin rejects mode changes like a pin whose
/// configuration lock register was set.
#[derive(Debug)]
pub struct MockGpio {
    mode: GpioMode,
    locked: bool,
    mode_changes: u32,
}

impl MockGpio {
    /// Create a new mock GPIO in output mode
    pub fn new_output() -> Self {
        Self::with_mode(GpioMode::OutputPushPull)
    }

    /// Create a new mock GPIO in input mode
    pub fn new_input() -> Self {
        Self::with_mode(GpioMode::Input)
    }

    /// Create a new mock GPIO in `mode`
    pub fn with_mode(mode: GpioMode) -> Self {
        Self {
            mode,
            locked: false,
            mode_changes: 0,
        }
    }

    /// Create a mock GPIO in `mode` whose configuration is locked
    pub fn locked(mode: GpioMode) -> Self {
        Self {
            locked: true,
            ..Self::with_mode(mode)
        }
    }

    /// Number of successful `set_mode` calls
    pub fn mode_changes(&self) -> u32 {
        self.mode_changes
    }
}

impl GpioInterface for MockGpio {
    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        if self.locked {
            return Err(PlatformError::Gpio(GpioError::Locked));
        }
        self.mode = mode;
        self.mode_changes += 1;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
