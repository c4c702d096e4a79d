//! STM32WL55 power controller and wake-up sources

use cortex_m::asm;
use embassy_stm32::pac::{self, LPUART1, PWR, RTC, TAMP};
use kineis_lpm_core::{
    LowPowerMode, RtcAlarm, UartPort, UartWake, UartWakeEvent, WakeEdge, WakePin, WAKE_PIN_COUNT,
};

use crate::platform::{
    error::{PlatformError, PowerError, WakeupError},
    retention::BackupRegisterRetention,
    traits::{PowerInterface, WakeupInterface},
    Result,
};

/// Polling budget for the RTC wake-up timer write flag
const RTC_WUTWF_POLLS: u32 = 10_000;

/// PWR wake-up pin lines (WKUP1..WKUP3)
const WAKE_LINES: usize = WAKE_PIN_COUNT as usize;

/// STM32WL55 power controller
///
/// Only one instance may exist: it owns the PWR, RTC wake-up timer and
/// LPUART1 wake-up configuration.
pub struct Stm32wlPower {
    _private: (),
}

impl Stm32wlPower {
    /// Take ownership of the power controller
    ///
    /// # Safety
    ///
    /// Must be called once. The caller guarantees no other code drives the
    /// PWR low power configuration, the RTC wake-up timer or LPUART1 wake-up.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }

    /// Unlock the backup domain so backup registers accept writes
    pub fn enable_backup_access(&self) {
        PWR.cr1().modify(|w| w.set_dbp(true));
    }

    /// Retention store over TAMP backup registers 0 and 1
    ///
    /// Call [`enable_backup_access`](Self::enable_backup_access) first.
    pub fn retention(&self, magic: u32) -> BackupRegisterRetention {
        let base = TAMP.bkpr(0).as_ptr() as *mut u32;
        // SAFETY: TAMP_BKP0R and TAMP_BKP1R are reserved for the low power
        // manager and `self` is the unique owner of the power configuration
        unsafe { BackupRegisterRetention::new(base, magic) }
    }

    fn set_sleepdeep(enabled: bool) {
        // SAFETY: single writer of SCB_SCR
        let mut core = unsafe { cortex_m::Peripherals::steal() };
        if enabled {
            core.SCB.set_sleepdeep();
        } else {
            core.SCB.clear_sleepdeep();
        }
    }

    fn wait_for_interrupt() {
        asm::dsb();
        asm::wfi();
        asm::isb();
    }

    fn wakeup_pending() -> bool {
        let sr1 = PWR.sr1().read();
        (0..WAKE_LINES).any(|line| sr1.wuf(line))
    }

    fn with_rtc_unlocked<T>(f: impl FnOnce() -> T) -> T {
        RTC.wpr().write(|w| w.set_key(pac::rtc::vals::Key::DEACTIVATE1));
        RTC.wpr().write(|w| w.set_key(pac::rtc::vals::Key::DEACTIVATE2));
        let result = f();
        RTC.wpr().write(|w| w.set_key(pac::rtc::vals::Key::ACTIVATE));
        result
    }
}

impl PowerInterface for Stm32wlPower {
    fn enter_low_power(&self, mode: LowPowerMode) -> Result<()> {
        use pac::pwr::vals::Lpms;

        let lpms = match mode {
            LowPowerMode::None => return Err(PlatformError::Power(PowerError::UnsupportedMode)),
            LowPowerMode::Sleep => {
                Self::set_sleepdeep(false);
                Self::wait_for_interrupt();
                return Ok(());
            }
            LowPowerMode::Stop => Lpms::STOP2,
            LowPowerMode::Standby => Lpms::STANDBY,
            LowPowerMode::Shutdown => Lpms::SHUTDOWN,
        };

        // A latched wake-up flag makes STANDBY/SHUTDOWN exit immediately
        self.clear_wakeup_flags();
        if Self::wakeup_pending() {
            return Err(PlatformError::Power(PowerError::WakeupPending));
        }

        PWR.cr1().modify(|w| w.set_lpms(lpms));
        Self::set_sleepdeep(true);
        Self::wait_for_interrupt();

        // Only reached after STOP
        Self::set_sleepdeep(false);
        Ok(())
    }

    fn clear_wakeup_flags(&self) {
        PWR.scr().write(|w| {
            for line in 0..WAKE_LINES {
                w.set_cwuf(line, true);
            }
        });
        RTC.scr().write(|w| w.set_cwutf(pac::rtc::vals::Calrf::CLEAR));
    }
}

impl WakeupInterface for Stm32wlPower {
    fn configure_pin(&self, pin: WakePin) -> Result<()> {
        let line = pin
            .line()
            .map_err(|_| PlatformError::Wakeup(WakeupError::InvalidPin))?;

        // WP set selects the falling edge
        PWR.cr4().modify(|w| w.set_wp(line, pin.edge == WakeEdge::Falling));
        PWR.scr().write(|w| w.set_cwuf(line, true));
        PWR.cr3().modify(|w| w.set_ewup(line, true));
        Ok(())
    }

    fn configure_rtc(&self, alarm: RtcAlarm) -> Result<()> {
        let reload = alarm
            .reload()
            .map_err(|_| PlatformError::Wakeup(WakeupError::RtcBusy))?;

        Self::with_rtc_unlocked(|| {
            RTC.cr().modify(|w| {
                w.set_wute(false);
                w.set_wutie(false);
            });

            let mut polls = 0;
            while !RTC.icsr().read().wutwf() {
                polls += 1;
                if polls >= RTC_WUTWF_POLLS {
                    return Err(PlatformError::Wakeup(WakeupError::RtcBusy));
                }
            }

            RTC.wutr().write(|w| w.set_wut(reload));
            RTC.cr().modify(|w| {
                w.set_wucksel(pac::rtc::vals::Wucksel::CLOCKSPARE);
                w.set_wute(true);
                w.set_wutie(true);
            });
            RTC.scr().write(|w| w.set_cwutf(pac::rtc::vals::Calrf::CLEAR));
            Ok(())
        })?;

        // Internal wake-up line lets the RTC exit STANDBY
        PWR.cr3().modify(|w| w.set_eiwul(true));
        Ok(())
    }

    fn configure_uart(&self, uart: UartWake) -> Result<()> {
        use pac::usart::vals::Wus;

        // STOP maps to Stop 2, where only LPUART1 stays clocked
        if uart.port != UartPort::Lpuart1 {
            return Err(PlatformError::Wakeup(WakeupError::UnsupportedUart));
        }

        let wus = match uart.event {
            UartWakeEvent::StartBit => Wus::START,
            UartWakeEvent::RxNotEmpty => Wus::RXNE,
            UartWakeEvent::AddressMatch(address) => {
                LPUART1.cr2().modify(|w| w.set_add(address));
                Wus::ADDRESS
            }
        };

        LPUART1.cr3().modify(|w| {
            w.set_wus(wus);
            w.set_wufie(true);
        });
        LPUART1.cr1().modify(|w| w.set_uesm(true));
        Ok(())
    }

    fn disable_all(&self) -> Result<()> {
        PWR.cr3().modify(|w| {
            for line in 0..WAKE_LINES {
                w.set_ewup(line, false);
            }
            w.set_eiwul(false);
        });

        Self::with_rtc_unlocked(|| {
            RTC.cr().modify(|w| {
                w.set_wute(false);
                w.set_wutie(false);
            });
        });

        LPUART1.cr3().modify(|w| w.set_wufie(false));
        LPUART1.cr1().modify(|w| w.set_uesm(false));

        self.clear_wakeup_flags();
        Ok(())
    }
}
