//! Low Power Manager Clients
//!
//! A client is a firmware module that must be told about low power
//! transitions and may restrict them (radio stack, UART console, sensors).
//!
//! # Lifecycle
//!
//! 1. `deepest_mode()` - Polled during arbitration
//! 2. `on_enter(mode)` - Called before the hardware enters `mode`, may refuse
//! 3. `on_exit(mode)` - Called after wake-up from `mode`
//!
//! Clients are registered by reference into a fixed-capacity
//! [`ClientRegistry`]. Callbacks take `&self` and clients are `Sync`: they
//! keep their own state in atomics or critical-section mutexes, so the
//! registry can be shared with interrupt handlers.

use core::fmt;

use heapless::Vec;

use crate::error::LpmError;
use crate::mode::LowPowerMode;

/// Default maximum number of registered clients
pub const MAX_CLIENTS: usize = 5;

/// Low power manager client
pub trait LpmClient: Sync {
    /// Deepest low power mode this client can survive right now
    fn deepest_mode(&self) -> LowPowerMode;

    /// Notification that `mode` is about to be entered
    ///
    /// Returns `Err` with a reason if the client is not ready, which aborts
    /// the transition (ignored for forced transitions).
    fn on_enter(&self, _mode: LowPowerMode) -> Result<(), &'static str> {
        Ok(())
    }

    /// Notification that the system woke up from `mode`
    ///
    /// Errors are logged by the manager but do not fail the transition.
    fn on_exit(&self, _mode: LowPowerMode) -> Result<(), &'static str> {
        Ok(())
    }

    /// Client name for logging
    fn name(&self) -> &'static str {
        "client"
    }
}

/// Handle returned by [`ClientRegistry::register`]
///
/// Ids are never reused while the client they designate is registered, so
/// a stale id cannot reach a newer client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u32);

impl ClientId {
    /// Build an id from its raw value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Registered client slot
#[derive(Clone, Copy)]
pub struct ClientEntry<'a> {
    /// Registration handle
    pub id: ClientId,
    /// Client callbacks
    pub client: &'a dyn LpmClient,
}

impl fmt::Debug for ClientEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientEntry")
            .field("id", &self.id)
            .field("name", &self.client.name())
            .finish()
    }
}

/// Fixed-capacity client table
///
/// Entries are kept in registration order; unregistering a client shifts the
/// later ones down so iteration order always matches registration order.
pub struct ClientRegistry<'a, const N: usize = MAX_CLIENTS> {
    entries: Vec<ClientEntry<'a>, N>,
    next_id: u32,
}

impl<'a, const N: usize> ClientRegistry<'a, N> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a client
    ///
    /// # Errors
    ///
    /// Returns `LpmError::CapacityExceeded` if all `N` slots are taken.
    pub fn register(&mut self, client: &'a dyn LpmClient) -> Result<ClientId, LpmError> {
        if self.entries.is_full() {
            return Err(LpmError::CapacityExceeded);
        }

        let id = self.allocate_id();
        self.entries
            .push(ClientEntry { id, client })
            .map_err(|_| LpmError::CapacityExceeded)?;
        Ok(id)
    }

    /// Remove a client
    ///
    /// # Errors
    ///
    /// Returns `LpmError::ClientNotFound` if `id` is not registered.
    pub fn unregister(&mut self, id: ClientId) -> Result<(), LpmError> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() == before {
            return Err(LpmError::ClientNotFound);
        }
        Ok(())
    }

    /// Check whether `id` is currently registered
    pub fn contains(&self, id: ClientId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Look up a client by id
    pub fn get(&self, id: ClientId) -> Option<&'a dyn LpmClient> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.client)
    }

    /// Iterate over registered clients in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ClientEntry<'a>> {
        self.entries.iter()
    }

    /// Copy of the current table
    ///
    /// The manager walks the copy with the registry unlocked so callbacks
    /// can register or unregister clients.
    pub fn snapshot(&self) -> Vec<ClientEntry<'a>, N> {
        self.entries.clone()
    }

    /// Number of registered clients
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no client is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if every slot is taken
    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// Maximum number of clients
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Remove every client
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn allocate_id(&mut self) -> ClientId {
        // Skip ids still held after the counter wraps
        loop {
            let id = ClientId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.contains(id) {
                return id;
            }
        }
    }
}

impl<const N: usize> Default for ClientRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
