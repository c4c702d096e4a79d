//! Per-mode platform hooks
//!
//! Ready-made [`ModeHook`] implementations for the usual platform actions
//! around low power entry:
//!
//! - [`FnHook`]: plain functions, e.g. UART kernel clock switch on entry
//!   and system clock restore after STOP
//! - [`GpioParkHook`]: park unused GPIOs in analog mode to cut leakage
//! - [`HookChain`]: run several hooks for the same mode

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;
use kineis_lpm_core::{LowPowerMode, ModeHook};

use crate::platform::traits::{GpioInterface, GpioMode};

/// Hook built from plain functions
///
/// # Example
///
/// ```rust,ignore
/// fn restore_clock_from_stop() { /* re-enable HSE, PLL */ }
///
/// static STOP_HOOK: FnHook = FnHook::new(None, Some(restore_clock_from_stop));
/// let hooks = ModeHooks::none().with(LowPowerMode::Stop, &STOP_HOOK);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnHook {
    enter: Option<fn()>,
    exit: Option<fn()>,
}

impl FnHook {
    /// Create a hook from optional enter and exit functions
    pub const fn new(enter: Option<fn()>, exit: Option<fn()>) -> Self {
        Self { enter, exit }
    }

    /// Hook with an enter function only
    pub const fn on_enter(enter: fn()) -> Self {
        Self::new(Some(enter), None)
    }
}

impl ModeHook for FnHook {
    fn on_enter(&self, _mode: LowPowerMode) {
        if let Some(enter) = self.enter {
            enter();
        }
    }

    fn on_exit(&self, _mode: LowPowerMode) {
        if let Some(exit) = self.exit {
            exit();
        }
    }
}

/// Parks GPIOs in analog mode while in low power
///
/// On entry each pin's mode is saved and the pin switched to
/// [`GpioMode::Analog`]. On exit the saved modes are put back. After
/// STANDBY and SHUTDOWN the reset restores the pins instead.
///
/// Pins owned by peripherals that must keep running (debug port, SPI,
/// LPTIM) must not be handed to this hook. A pin whose mode cannot be
/// changed is logged and left as is.
pub struct GpioParkHook<G: GpioInterface + Send, const N: usize> {
    pins: Mutex<RefCell<ParkedPins<G, N>>>,
}

struct ParkedPins<G, const N: usize> {
    pins: Vec<G, N>,
    saved: Vec<GpioMode, N>,
}

impl<G: GpioInterface + Send, const N: usize> GpioParkHook<G, N> {
    /// Create a hook over `pins`
    pub fn new(pins: Vec<G, N>) -> Self {
        Self {
            pins: Mutex::new(RefCell::new(ParkedPins {
                pins,
                saved: Vec::new(),
            })),
        }
    }

    /// Number of pins handled
    pub fn len(&self) -> usize {
        self.with_pins(|pins| pins.len())
    }

    /// True if no pin is handled
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inspect the pins
    pub fn with_pins<R>(&self, f: impl FnOnce(&[G]) -> R) -> R {
        critical_section::with(|cs| f(&self.pins.borrow_ref(cs).pins))
    }

    /// Give the pins back
    pub fn release(self) -> Vec<G, N> {
        self.pins.into_inner().into_inner().pins
    }
}

impl<G: GpioInterface + Send, const N: usize> ModeHook for GpioParkHook<G, N> {
    fn on_enter(&self, _mode: LowPowerMode) {
        critical_section::with(|cs| {
            let mut parked = self.pins.borrow_ref_mut(cs);
            let ParkedPins { pins, saved } = &mut *parked;
            saved.clear();

            for pin in pins.iter_mut() {
                // Capacity matches the pin list
                let _ = saved.push(pin.mode());
                if let Err(_e) = pin.set_mode(GpioMode::Analog) {
                    crate::log_warn!("GPIO park failed: {}", _e.as_str());
                }
            }
            crate::log_trace!("Parked {} GPIOs for {}", pins.len(), _mode.as_str());
        });
    }

    fn on_exit(&self, _mode: LowPowerMode) {
        critical_section::with(|cs| {
            let mut parked = self.pins.borrow_ref_mut(cs);
            let ParkedPins { pins, saved } = &mut *parked;

            for (pin, mode) in pins.iter_mut().zip(saved.iter()) {
                if let Err(_e) = pin.set_mode(*mode) {
                    crate::log_warn!("GPIO restore failed: {}", _e.as_str());
                }
            }
        });
    }
}

/// Several hooks for one mode
///
/// Enter hooks run in slice order, exit hooks in reverse order.
pub struct HookChain<'a> {
    hooks: &'a [&'a dyn ModeHook],
}

impl<'a> HookChain<'a> {
    /// Chain `hooks`
    pub const fn new(hooks: &'a [&'a dyn ModeHook]) -> Self {
        Self { hooks }
    }
}

impl ModeHook for HookChain<'_> {
    fn on_enter(&self, mode: LowPowerMode) {
        for hook in self.hooks {
            hook.on_enter(mode);
        }
    }

    fn on_exit(&self, mode: LowPowerMode) {
        for hook in self.hooks.iter().rev() {
            hook.on_exit(mode);
        }
    }
}
