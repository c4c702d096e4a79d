//! Low Power Policy Store
//!
//! Holds the environment configuration of the manager: which low power
//! modes are enabled and which platform hooks run around each of them.
//!
//! Hooks are resolved once at configuration time. A mode without a hook
//! needs no platform action beyond the generic entry sequence.

use core::fmt;

use crate::error::LpmError;
use crate::mode::{AllowedModes, LowPowerMode};

/// Platform procedure run around a low power mode
///
/// Typical enter actions: park GPIOs in analog mode, arm wake-up sources,
/// switch the UART kernel clock. Typical exit action: restore the system
/// clock after STOP.
///
/// Hooks cannot fail. They run only once every client accepted the
/// transition, so no partial hook state has to be undone.
///
/// Hooks are `Sync`: the hook table lives in the manager state, which may
/// be shared with interrupt handlers.
pub trait ModeHook: Sync {
    /// Called right before the hardware enters `mode`
    fn on_enter(&self, mode: LowPowerMode);

    /// Called right after wake-up from `mode`
    ///
    /// Never reached on real hardware for STANDBY and SHUTDOWN, which exit
    /// through a reset.
    fn on_exit(&self, _mode: LowPowerMode) {}
}

/// Per-mode hook table
#[derive(Clone, Copy, Default)]
pub struct ModeHooks<'a> {
    /// Hook for SLEEP
    pub sleep: Option<&'a dyn ModeHook>,
    /// Hook for STOP
    pub stop: Option<&'a dyn ModeHook>,
    /// Hook for STANDBY
    pub standby: Option<&'a dyn ModeHook>,
    /// Hook for SHUTDOWN
    pub shutdown: Option<&'a dyn ModeHook>,
}

impl<'a> ModeHooks<'a> {
    /// Table with no hook installed
    pub const fn none() -> Self {
        Self {
            sleep: None,
            stop: None,
            standby: None,
            shutdown: None,
        }
    }

    /// Install `hook` for `mode`
    ///
    /// Installing a hook for `None` has no effect.
    pub fn with(mut self, mode: LowPowerMode, hook: &'a dyn ModeHook) -> Self {
        match mode {
            LowPowerMode::None => {}
            LowPowerMode::Sleep => self.sleep = Some(hook),
            LowPowerMode::Stop => self.stop = Some(hook),
            LowPowerMode::Standby => self.standby = Some(hook),
            LowPowerMode::Shutdown => self.shutdown = Some(hook),
        }
        self
    }

    /// Hook installed for `mode`
    pub fn get(&self, mode: LowPowerMode) -> Option<&'a dyn ModeHook> {
        match mode {
            LowPowerMode::None => None,
            LowPowerMode::Sleep => self.sleep,
            LowPowerMode::Stop => self.stop,
            LowPowerMode::Standby => self.standby,
            LowPowerMode::Shutdown => self.shutdown,
        }
    }
}

impl fmt::Debug for ModeHooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeHooks")
            .field("sleep", &self.sleep.is_some())
            .field("stop", &self.stop.is_some())
            .field("standby", &self.standby.is_some())
            .field("shutdown", &self.shutdown.is_some())
            .finish()
    }
}

/// Environment configuration of the low power manager
#[derive(Debug, Clone, Copy)]
pub struct PolicyStore<'a> {
    allowed: AllowedModes,
    hooks: ModeHooks<'a>,
}

impl<'a> PolicyStore<'a> {
    /// Create a policy store
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidConfig` if `allowed` is empty: a manager
    /// that can never enter a low power mode is a configuration mistake.
    pub fn new(allowed: AllowedModes, hooks: ModeHooks<'a>) -> Result<Self, LpmError> {
        if allowed.is_empty() {
            return Err(LpmError::InvalidConfig);
        }
        Ok(Self { allowed, hooks })
    }

    /// Replace the allowed-mode bitmap
    ///
    /// An empty bitmap is accepted here and keeps the system in run mode.
    pub fn set_allowed_modes(&mut self, allowed: AllowedModes) {
        self.allowed = allowed;
    }

    /// Replace the hook table
    pub fn set_hooks(&mut self, hooks: ModeHooks<'a>) {
        self.hooks = hooks;
    }

    /// Current allowed-mode bitmap
    pub fn allowed_modes(&self) -> AllowedModes {
        self.allowed
    }

    /// Hook table
    pub fn hooks(&self) -> &ModeHooks<'a> {
        &self.hooks
    }

    /// Hook for `mode`, if any
    pub fn hook_for(&self, mode: LowPowerMode) -> Option<&'a dyn ModeHook> {
        self.hooks.get(mode)
    }
}
