//! Lock around the low power manager state.
//!
//! The manager keeps its registry, policy and context behind the
//! `SharedState` trait so the same engine runs on target (critical-section
//! mutex) and on host (RefCell).

/// Access to the manager state under a lock.
///
/// - `CriticalState<T>`: critical-section mutex, shareable with interrupt
///   handlers
/// - `LocalState<T>`: single execution context and host tests
///
/// Closures passed to `with`/`with_mut` must be short: the manager never
/// calls a client, a hook or the hardware while holding the state.
///
/// # Example
///
/// ```
/// use kineis_lpm::core::traits::{LocalState, SharedState};
/// use kineis_lpm::lpm_core::{AllowedModes, LowPowerMode, ModeHooks, PolicyStore};
/// use kineis_lpm::LpmState;
///
/// fn disable_standby<S: SharedState<LpmState<'static>>>(state: &S) {
///     state.with_mut(|s| {
///         let allowed = s.policy.allowed_modes() - AllowedModes::STANDBY;
///         s.policy.set_allowed_modes(allowed);
///     });
/// }
///
/// let policy = PolicyStore::new(AllowedModes::all(), ModeHooks::none()).unwrap();
/// let state: LocalState<LpmState<'static>> = LpmState::new(policy).into();
///
/// disable_standby(&state);
/// assert!(!state.with(|s| s.policy.allowed_modes().permits(LowPowerMode::Standby)));
/// ```
pub trait SharedState<T> {
    /// Read the state.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Update the state.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

#[cfg(feature = "embassy")]
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Critical-section protected state.
///
/// Access runs inside a critical section, so the manager can be shared
/// between thread mode and interrupt handlers (e.g. a wake-up ISR calling
/// `mode()`). `Sync` as long as `T` is `Send`, which holds for
/// `LpmState` since clients and hooks are `Sync`.
#[cfg(feature = "embassy")]
pub struct CriticalState<T> {
    inner: Mutex<CriticalSectionRawMutex, core::cell::RefCell<T>>,
}

#[cfg(feature = "embassy")]
impl<T> CriticalState<T> {
    /// Wrap `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(core::cell::RefCell::new(value)),
        }
    }
}

#[cfg(feature = "embassy")]
impl<T> From<T> for CriticalState<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(feature = "embassy")]
impl<T> SharedState<T> for CriticalState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// State for a single execution context.
///
/// Uses `RefCell` runtime borrow checking. Suitable for bare-metal super
/// loops without interrupt access to the manager and for host tests.
///
/// # Panics
///
/// Panics if borrowing rules are violated (e.g. calling `with_mut` from
/// inside `with`).
pub struct LocalState<T> {
    inner: core::cell::RefCell<T>,
}

impl<T> LocalState<T> {
    /// Wrap `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: core::cell::RefCell::new(value),
        }
    }
}

impl<T> From<T> for LocalState<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> SharedState<T> for LocalState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }
}
