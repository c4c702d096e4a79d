//! Low Power Manager
//!
//! Runs low power transitions across the registered clients.
//!
//! ## Responsibilities
//!
//! - Arbitrate the effective mode from the request, the clients and the
//!   allowed-mode bitmap
//! - Notify clients before entry (they may refuse) and after wake-up
//! - Run the per-mode platform hooks around the hardware entry
//! - Persist the context before STANDBY/SHUTDOWN and restore it at boot
//!
//! ## Transition Sequence
//!
//! ```text
//! claim ─► arbitrate ─► notify enter ─► enter hook ─► save retention
//!                            │                              │
//!                          veto                              ▼
//!                            │                       hardware entry
//!                            ▼                        (blocks until wake)
//!                         NotReady                          │
//!                                                           ▼
//! release ◄─ context update ◄─ notify exit ◄─ restore ◄─ exit hook
//! ```
//!
//! ## Concurrency
//!
//! One transition at a time: a second `enter`/`force_mode` while one is in
//! flight (including from inside a client callback) returns `Busy`. The
//! state lock is never held while a client, a hook or the hardware runs,
//! so callbacks may register and unregister clients.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

use heapless::Vec;
use kineis_lpm_core::stats::bump;
use kineis_lpm_core::{
    decide, AllowedModes, ClientEntry, ClientId, ClientRegistry, LowPowerMode, LpmClient,
    LpmContext, LpmError, ModeHook, ModeHooks, PolicyStore, RetentionRecord, RtcAlarm,
    TransitionStats, UartWake, WakePin, WakeSource, MAX_CLIENTS,
};

use crate::core::traits::SharedState;
use crate::platform::traits::{PowerInterface, RetentionStore, WakeupInterface};

use super::config::LpmConfig;

/// State guarded by the manager's lock
pub struct LpmState<'a, const N: usize = MAX_CLIENTS> {
    /// Registered clients
    pub registry: ClientRegistry<'a, N>,
    /// Allowed modes and hooks
    pub policy: PolicyStore<'a>,
    /// Current and last mode
    pub context: LpmContext,
    /// Transition counters
    pub stats: TransitionStats,
}

impl<'a, const N: usize> LpmState<'a, N> {
    /// Fresh state with no client registered
    pub fn new(policy: PolicyStore<'a>) -> Self {
        Self {
            registry: ClientRegistry::new(),
            policy,
            context: LpmContext::new(),
            stats: TransitionStats::new(),
        }
    }

    /// State for `config`
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidConfig` if `config` enables no mode.
    pub fn from_config(config: &LpmConfig, hooks: ModeHooks<'a>) -> Result<Self, LpmError> {
        config.validate()?;
        Ok(Self::new(config.policy(hooks)?))
    }
}

/// Outcome of a completed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Mode asked for by the caller
    pub requested: LowPowerMode,
    /// Mode actually entered (`None`: the system stayed awake)
    pub entered: LowPowerMode,
    /// Entered through `force_mode`
    pub forced: bool,
    /// Clients that received the enter notification
    pub notified: u8,
    /// Client refusals ignored by a forced transition
    pub overridden_vetoes: u8,
    /// Exit notifications that reported a failure
    pub exit_failures: u8,
}

impl Transition {
    fn awake(requested: LowPowerMode, forced: bool) -> Self {
        Self {
            requested,
            entered: LowPowerMode::None,
            forced,
            notified: 0,
            overridden_vetoes: 0,
            exit_failures: 0,
        }
    }
}

/// Releases the transition flag when dropped
struct TransitionGuard<'f> {
    flag: &'f AtomicBool,
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Clients that received the enter notification
struct Notified<'a, const N: usize> {
    clients: Vec<ClientEntry<'a>, N>,
    overridden: u8,
}

/// Low power manager
///
/// # Type Parameters
///
/// * `S` - Lock around [`LpmState`] (`LocalState` or `CriticalState`)
/// * `P` - Power controller and wake-up sources
/// * `R` - Retention memory
/// * `N` - Client capacity
///
/// # Example
///
/// ```rust,ignore
/// let state = LocalState::new(LpmState::from_config(&config, hooks)?);
/// let lpm = LowPowerManager::new(state, platform, retention);
/// lpm.resume();
/// lpm.register_client(&stack_client)?;
///
/// loop {
///     let _ = lpm.enter(LowPowerMode::Shutdown);
/// }
/// ```
pub struct LowPowerManager<'a, S, P, R, const N: usize = MAX_CLIENTS>
where
    S: SharedState<LpmState<'a, N>>,
    P: PowerInterface + WakeupInterface,
    R: RetentionStore,
{
    state: S,
    platform: P,
    retention: R,
    in_transition: AtomicBool,
    _clients: PhantomData<&'a ()>,
}

impl<'a, S, P, R, const N: usize> LowPowerManager<'a, S, P, R, N>
where
    S: SharedState<LpmState<'a, N>>,
    P: PowerInterface + WakeupInterface,
    R: RetentionStore,
{
    /// Create a manager over existing state
    pub fn new(state: S, platform: P, retention: R) -> Self {
        Self {
            state,
            platform,
            retention,
            in_transition: AtomicBool::new(false),
            _clients: PhantomData,
        }
    }

    /// Create a manager from a configuration
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidConfig` if `config` enables no mode.
    pub fn init(
        config: &LpmConfig,
        hooks: ModeHooks<'a>,
        platform: P,
        retention: R,
    ) -> Result<Self, LpmError>
    where
        S: From<LpmState<'a, N>>,
    {
        let state = LpmState::from_config(config, hooks).map_err(|e| {
            crate::log_error!("LPM init failed: {}", e.as_str());
            e
        })?;
        crate::log_info!("LPM init, allowed modes 0x{:X}", config.allowed_modes.bits());
        Ok(Self::new(S::from(state), platform, retention))
    }

    // ------------------------------------------------------------------
    // Client registry
    // ------------------------------------------------------------------

    /// Register a client
    ///
    /// # Errors
    ///
    /// Returns `LpmError::CapacityExceeded` if all slots are taken.
    pub fn register_client(&self, client: &'a dyn LpmClient) -> Result<ClientId, LpmError> {
        let result = self.state.with_mut(|s| s.registry.register(client));
        match result {
            Ok(_id) => crate::log_info!("LPM client {} registered as {}", client.name(), _id.raw()),
            Err(_) => crate::log_warn!("LPM client {} rejected: registry full", client.name()),
        }
        result
    }

    /// Unregister a client
    ///
    /// A client removed during a transition receives no further
    /// notification, including the exit notification of that transition.
    ///
    /// # Errors
    ///
    /// Returns `LpmError::ClientNotFound` if `id` is not registered.
    pub fn unregister_client(&self, id: ClientId) -> Result<(), LpmError> {
        let result = self.state.with_mut(|s| s.registry.unregister(id));
        match result {
            Ok(()) => crate::log_info!("LPM client {} unregistered", id.raw()),
            Err(_) => crate::log_warn!("LPM client {} not registered", id.raw()),
        }
        result
    }

    /// Number of registered clients
    pub fn client_count(&self) -> usize {
        self.state.with(|s| s.registry.len())
    }

    // ------------------------------------------------------------------
    // Policy
    // ------------------------------------------------------------------

    /// Replace the allowed-mode bitmap
    ///
    /// An empty bitmap is accepted and keeps the system awake.
    pub fn set_allowed_modes(&self, allowed: AllowedModes) {
        self.state.with_mut(|s| s.policy.set_allowed_modes(allowed));
        crate::log_info!("LPM allowed modes set to 0x{:X}", allowed.bits());
    }

    /// Current allowed-mode bitmap
    pub fn allowed_modes(&self) -> AllowedModes {
        self.state.with(|s| s.policy.allowed_modes())
    }

    /// Replace the per-mode hooks
    pub fn set_hooks(&self, hooks: ModeHooks<'a>) {
        self.state.with_mut(|s| s.policy.set_hooks(hooks));
    }

    // ------------------------------------------------------------------
    // Context
    // ------------------------------------------------------------------

    /// Mode being entered or active, `None` when awake
    pub fn mode(&self) -> LowPowerMode {
        self.state.with(|s| s.context.current_mode)
    }

    /// Last mode entered and exited
    pub fn last_mode(&self) -> LowPowerMode {
        self.state.with(|s| s.context.last_mode)
    }

    /// Copy of the context
    pub fn context(&self) -> LpmContext {
        self.state.with(|s| s.context)
    }

    /// Set the application data kept across STANDBY and SHUTDOWN (28 bits)
    pub fn set_reserved(&self, reserved: u32) {
        self.state.with_mut(|s| s.context.set_reserved(reserved));
    }

    /// Copy of the transition counters
    pub fn stats(&self) -> TransitionStats {
        self.state.with(|s| s.stats)
    }

    /// True while a transition is in progress
    pub fn is_busy(&self) -> bool {
        self.in_transition.load(Ordering::Acquire)
    }

    /// Power controller
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Retention memory
    pub fn retention(&self) -> &R {
        &self.retention
    }

    /// Restore the context after a reset
    ///
    /// Call once at boot, before the first transition. If the reset was a
    /// wake-up from STANDBY or SHUTDOWN, the saved record is applied to the
    /// context, cleared from retention memory and its mode returned.
    pub fn resume(&self) -> Option<LowPowerMode> {
        let record = self.retention.restore()?;
        self.state.with_mut(|s| s.context.restore(record));

        if let Err(_e) = self.retention.clear() {
            crate::log_warn!("LPM retention clear failed: {}", _e.as_str());
        }
        crate::log_info!("LPM resumed from {}", record.mode.as_str());
        Some(record.mode)
    }

    // ------------------------------------------------------------------
    // Wake-up sources
    // ------------------------------------------------------------------

    /// Arm wake-up pins
    ///
    /// Every descriptor is validated before any pin is armed.
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidWakeSource` if a descriptor is invalid or
    /// the platform rejects it.
    pub fn configure_wake_pins(&self, pins: &[WakePin]) -> Result<(), LpmError> {
        for pin in pins {
            pin.validate()?;
        }
        for pin in pins {
            self.platform.configure_pin(*pin).map_err(|_e| {
                crate::log_warn!("LPM wake pin {} rejected: {}", pin.pin, _e.as_str());
                LpmError::InvalidWakeSource
            })?;
        }
        Ok(())
    }

    /// Program the RTC wake-up timer
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidWakeSource` if the period is out of range
    /// or the platform rejects it.
    pub fn configure_wake_rtc(&self, alarm: RtcAlarm) -> Result<(), LpmError> {
        alarm.validate()?;
        self.platform.configure_rtc(alarm).map_err(|_e| {
            crate::log_warn!("LPM RTC wake-up rejected: {}", _e.as_str());
            LpmError::InvalidWakeSource
        })
    }

    /// Allow a UART to wake the system
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidWakeSource` if the descriptor is invalid or
    /// the platform rejects it.
    pub fn configure_wake_uart(&self, uart: UartWake) -> Result<(), LpmError> {
        uart.validate()?;
        self.platform.configure_uart(uart).map_err(|_e| {
            crate::log_warn!("LPM UART wake-up rejected: {}", _e.as_str());
            LpmError::InvalidWakeSource
        })
    }

    /// Arm any wake-up source
    pub fn configure_wake_source(&self, source: WakeSource) -> Result<(), LpmError> {
        match source {
            WakeSource::Pin(pin) => self.configure_wake_pins(&[pin]),
            WakeSource::Rtc(alarm) => self.configure_wake_rtc(alarm),
            WakeSource::Uart(uart) => self.configure_wake_uart(uart),
        }
    }

    /// Disarm every wake-up source
    pub fn disable_wake_sources(&self) -> Result<(), LpmError> {
        self.platform
            .disable_all()
            .map_err(|_| LpmError::InvalidWakeSource)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Enter the deepest low power mode everyone agrees on
    ///
    /// Blocks until wake-up. Returns immediately with `entered = None` if
    /// arbitration keeps the system awake.
    ///
    /// # Errors
    ///
    /// - `Busy` if a transition is already running
    /// - `PolicyViolation` if `requested` is disabled
    /// - `NotReady` if a client refused; nothing was changed
    /// - `EntryFailed` if the hardware refused; clients were restored
    pub fn enter(&self, requested: LowPowerMode) -> Result<Transition, LpmError> {
        let _guard = self.claim()?;

        let (allowed, clients) = self
            .state
            .with(|s| (s.policy.allowed_modes(), s.registry.snapshot()));

        let tolerances = clients.iter().map(|entry| entry.client.deepest_mode());
        let mode = decide(requested, allowed, tolerances).map_err(|e| {
            self.state.with_mut(|s| bump(&mut s.stats.policy_violations));
            crate::log_warn!("LPM {} not allowed", requested.as_str());
            e
        })?;

        if mode == LowPowerMode::None {
            self.state.with_mut(|s| s.stats.record_entry(LowPowerMode::None));
            crate::log_debug!("LPM request {} keeps system awake", requested.as_str());
            return Ok(Transition::awake(requested, false));
        }

        crate::log_debug!("LPM request {} arbitrated to {}", requested.as_str(), mode.as_str());
        let notified = self.notify_enter(&clients, mode, false)?;
        self.execute(requested, mode, notified, false)
    }

    /// Enter `mode` regardless of the clients
    ///
    /// Escape hatch for emergencies such as a low battery. Clients are not
    /// polled, and a refused enter notification is logged and ignored. The
    /// allowed-mode bitmap still applies.
    ///
    /// # Errors
    ///
    /// - `Busy` if a transition is already running
    /// - `PolicyViolation` if `mode` is disabled
    /// - `EntryFailed` if the hardware refused
    pub fn force_mode(&self, mode: LowPowerMode) -> Result<Transition, LpmError> {
        let _guard = self.claim()?;

        let (allowed, clients) = self
            .state
            .with(|s| (s.policy.allowed_modes(), s.registry.snapshot()));

        if !allowed.permits(mode) {
            self.state.with_mut(|s| bump(&mut s.stats.policy_violations));
            crate::log_warn!("LPM forced {} not allowed", mode.as_str());
            return Err(LpmError::PolicyViolation { requested: mode });
        }
        if mode == LowPowerMode::None {
            return Ok(Transition::awake(mode, true));
        }

        crate::log_warn!("LPM forcing {}", mode.as_str());
        self.state.with_mut(|s| bump(&mut s.stats.forced));
        let notified = self.notify_enter(&clients, mode, true)?;
        self.execute(mode, mode, notified, true)
    }

    fn claim(&self) -> Result<TransitionGuard<'_>, LpmError> {
        if self
            .in_transition
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.state.with_mut(|s| bump(&mut s.stats.busy));
            crate::log_warn!("LPM transition already in progress");
            return Err(LpmError::Busy);
        }
        Ok(TransitionGuard {
            flag: &self.in_transition,
        })
    }

    fn is_registered(&self, id: ClientId) -> bool {
        self.state.with(|s| s.registry.contains(id))
    }

    /// Enter notification in registration order
    ///
    /// Clients removed since the snapshot are skipped.
    fn notify_enter(
        &self,
        clients: &Vec<ClientEntry<'a>, N>,
        mode: LowPowerMode,
        forced: bool,
    ) -> Result<Notified<'a, N>, LpmError> {
        let mut notified = Notified {
            clients: Vec::new(),
            overridden: 0,
        };

        for entry in clients {
            if !self.is_registered(entry.id) {
                continue;
            }

            if let Err(_reason) = entry.client.on_enter(mode) {
                if !forced {
                    self.state.with_mut(|s| bump(&mut s.stats.vetoes));
                    crate::log_info!(
                        "LPM {} refused by {}: {}",
                        mode.as_str(),
                        entry.client.name(),
                        _reason
                    );
                    return Err(LpmError::NotReady {
                        mode,
                        client: entry.id,
                    });
                }
                notified.overridden = notified.overridden.saturating_add(1);
                self.state.with_mut(|s| bump(&mut s.stats.overridden_vetoes));
                crate::log_warn!(
                    "LPM forced {} despite {}: {}",
                    mode.as_str(),
                    entry.client.name(),
                    _reason
                );
            }

            // Same capacity as the snapshot
            let _ = notified.clients.push(*entry);
        }

        Ok(notified)
    }

    /// Hooks, retention, hardware entry and exit sequence
    fn execute(
        &self,
        requested: LowPowerMode,
        mode: LowPowerMode,
        notified: Notified<'a, N>,
        forced: bool,
    ) -> Result<Transition, LpmError> {
        let (hook, record) = self
            .state
            .with(|s| (s.policy.hook_for(mode), s.context.record_for(mode)));

        if let Some(hook) = hook {
            hook.on_enter(mode);
        }

        let retained = mode.is_destructive() && self.save_record(record);

        let prior = self.state.with_mut(|s| {
            let prior = s.context.current_mode;
            s.context.current_mode = mode;
            prior
        });
        crate::log_info!("LPM entering {}", mode.as_str());

        // Blocks until wake-up
        let entry = self.platform.enter_low_power(mode);

        self.platform.clear_wakeup_flags();
        self.run_exit_hook(hook, mode);
        if retained {
            self.restore_record();
        }
        let exit_failures = self.notify_exit(&notified.clients, mode);

        self.state.with_mut(|s| match entry {
            Ok(()) => {
                s.context.current_mode = LowPowerMode::None;
                s.context.last_mode = mode;
                s.stats.record_entry(mode);
            }
            Err(_) => {
                s.context.current_mode = prior;
                bump(&mut s.stats.entry_failures);
            }
        });

        if let Err(_e) = entry {
            crate::log_error!("LPM {} entry failed: {}", mode.as_str(), _e.as_str());
            return Err(LpmError::EntryFailed { mode });
        }
        crate::log_info!("LPM woke up from {}", mode.as_str());

        Ok(Transition {
            requested,
            entered: mode,
            forced,
            notified: saturate_u8(notified.clients.len()),
            overridden_vetoes: notified.overridden,
            exit_failures,
        })
    }

    fn save_record(&self, record: RetentionRecord) -> bool {
        match self.retention.save(record) {
            Ok(()) => true,
            Err(_e) => {
                // The transition goes on; only last_mode is lost after reset
                crate::log_error!("LPM retention save failed: {}", _e.as_str());
                false
            }
        }
    }

    fn restore_record(&self) {
        if let Some(record) = self.retention.restore() {
            self.state.with_mut(|s| s.context.reserved = record.reserved);
        }
        if let Err(_e) = self.retention.clear() {
            crate::log_warn!("LPM retention clear failed: {}", _e.as_str());
        }
    }

    fn run_exit_hook(&self, hook: Option<&'a dyn ModeHook>, mode: LowPowerMode) {
        if let Some(hook) = hook {
            hook.on_exit(mode);
        }
    }

    /// Exit notification to the notified clients still registered
    fn notify_exit(&self, notified: &Vec<ClientEntry<'a>, N>, mode: LowPowerMode) -> u8 {
        let mut failures = 0u8;

        for entry in notified {
            if !self.is_registered(entry.id) {
                continue;
            }
            if let Err(_reason) = entry.client.on_exit(mode) {
                failures = failures.saturating_add(1);
                self.state.with_mut(|s| bump(&mut s.stats.exit_failures));
                crate::log_warn!(
                    "LPM {} exit failed for {}: {}",
                    mode.as_str(),
                    entry.client.name(),
                    _reason
                );
            }
        }

        failures
    }
}

fn saturate_u8(value: usize) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}
