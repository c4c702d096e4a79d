//! Mock power controller for testing

use core::cell::{Cell, RefCell};

use heapless::Vec;
use kineis_lpm_core::{LowPowerMode, RtcAlarm, UartWake, WakePin};

use crate::platform::{
    error::{PlatformError, PowerError, WakeupError},
    traits::{PowerInterface, WakeupInterface},
    Result,
};

/// Number of hardware entries kept for inspection
const HISTORY_SIZE: usize = 32;

/// Mock power controller
///
/// Records every low power entry and wake-up configuration instead of
/// touching hardware. `enter_low_power` returns immediately, as if a wake-up
/// event fired right away.
///
/// # Example
///
/// ```
/// use kineis_lpm::platform::mock::MockPower;
/// use kineis_lpm::platform::traits::PowerInterface;
/// use kineis_lpm_core::LowPowerMode;
///
/// let power = MockPower::new();
/// power.enter_low_power(LowPowerMode::Stop).unwrap();
/// assert_eq!(power.entered().as_slice(), &[LowPowerMode::Stop]);
/// ```
#[derive(Debug, Default)]
pub struct MockPower {
    entered: RefCell<Vec<LowPowerMode, HISTORY_SIZE>>,
    fail_next: Cell<Option<PowerError>>,
    flag_clears: Cell<u32>,
    pins: RefCell<Vec<WakePin, 4>>,
    rtc: Cell<Option<RtcAlarm>>,
    uart: Cell<Option<UartWake>>,
    wakeup_failure: Cell<Option<WakeupError>>,
}

impl MockPower {
    /// Create a new mock power controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Modes entered so far, oldest first
    pub fn entered(&self) -> Vec<LowPowerMode, HISTORY_SIZE> {
        self.entered.borrow().clone()
    }

    /// Number of hardware entries
    pub fn entry_count(&self) -> usize {
        self.entered.borrow().len()
    }

    /// Make the next `enter_low_power` fail with `error`
    pub fn fail_next_entry(&self, error: PowerError) {
        self.fail_next.set(Some(error));
    }

    /// Make every wake-up configuration call fail with `error`
    pub fn fail_wakeup_config(&self, error: Option<WakeupError>) {
        self.wakeup_failure.set(error);
    }

    /// Number of `clear_wakeup_flags` calls
    pub fn flag_clears(&self) -> u32 {
        self.flag_clears.get()
    }

    /// Armed wake-up pins
    pub fn wake_pins(&self) -> Vec<WakePin, 4> {
        self.pins.borrow().clone()
    }

    /// Programmed RTC wake-up
    pub fn rtc_alarm(&self) -> Option<RtcAlarm> {
        self.rtc.get()
    }

    /// UART allowed to wake the system
    pub fn uart_wake(&self) -> Option<UartWake> {
        self.uart.get()
    }

    fn check_wakeup(&self) -> Result<()> {
        match self.wakeup_failure.get() {
            Some(error) => Err(PlatformError::Wakeup(error)),
            None => Ok(()),
        }
    }
}

impl PowerInterface for MockPower {
    fn enter_low_power(&self, mode: LowPowerMode) -> Result<()> {
        if let Some(error) = self.fail_next.take() {
            return Err(PlatformError::Power(error));
        }
        if mode == LowPowerMode::None {
            return Err(PlatformError::Power(PowerError::UnsupportedMode));
        }

        // Oldest entries are dropped once the history is full
        let mut entered = self.entered.borrow_mut();
        if entered.is_full() {
            entered.remove(0);
        }
        let _ = entered.push(mode);
        Ok(())
    }

    fn clear_wakeup_flags(&self) {
        self.flag_clears.set(self.flag_clears.get().saturating_add(1));
    }
}

impl WakeupInterface for MockPower {
    fn configure_pin(&self, pin: WakePin) -> Result<()> {
        self.check_wakeup()?;
        let mut pins = self.pins.borrow_mut();
        pins.retain(|armed| armed.pin != pin.pin);
        pins.push(pin)
            .map_err(|_| PlatformError::Wakeup(WakeupError::InvalidPin))
    }

    fn configure_rtc(&self, alarm: RtcAlarm) -> Result<()> {
        self.check_wakeup()?;
        self.rtc.set(Some(alarm));
        Ok(())
    }

    fn configure_uart(&self, uart: UartWake) -> Result<()> {
        self.check_wakeup()?;
        self.uart.set(Some(uart));
        Ok(())
    }

    fn disable_all(&self) -> Result<()> {
        self.pins.borrow_mut().clear();
        self.rtc.set(None);
        self.uart.set(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kineis_lpm_core::WakeEdge;

    #[test]
    fn test_mock_power_records_entries() {
        let power = MockPower::new();
        power.enter_low_power(LowPowerMode::Sleep).unwrap();
        power.enter_low_power(LowPowerMode::Standby).unwrap();

        assert_eq!(
            power.entered().as_slice(),
            &[LowPowerMode::Sleep, LowPowerMode::Standby]
        );
    }

    #[test]
    fn test_mock_power_injected_failure() {
        let power = MockPower::new();
        power.fail_next_entry(PowerError::WakeupPending);

        assert_eq!(
            power.enter_low_power(LowPowerMode::Stop),
            Err(PlatformError::Power(PowerError::WakeupPending))
        );
        assert_eq!(power.entry_count(), 0);

        // Only the next call fails
        assert!(power.enter_low_power(LowPowerMode::Stop).is_ok());
    }

    #[test]
    fn test_mock_power_history_wraps() {
        let power = MockPower::new();
        for _ in 0..HISTORY_SIZE {
            power.enter_low_power(LowPowerMode::Sleep).unwrap();
        }
        power.enter_low_power(LowPowerMode::Stop).unwrap();

        let entered = power.entered();
        assert_eq!(entered.len(), HISTORY_SIZE);
        assert_eq!(entered.last(), Some(&LowPowerMode::Stop));
    }

    #[test]
    fn test_mock_wakeup_pins_replace_same_pin() {
        let power = MockPower::new();
        power
            .configure_pin(WakePin {
                pin: 1,
                edge: WakeEdge::Rising,
            })
            .unwrap();
        power
            .configure_pin(WakePin {
                pin: 1,
                edge: WakeEdge::Falling,
            })
            .unwrap();

        let pins = power.wake_pins();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].edge, WakeEdge::Falling);

        power.disable_all().unwrap();
        assert!(power.wake_pins().is_empty());
    }
}
