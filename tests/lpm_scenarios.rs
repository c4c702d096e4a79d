//! Host scenarios for the low power manager public API

use std::sync::atomic::{AtomicU32, Ordering};

use kineis_lpm::clients::{StackClient, StackResources, UartClient};
use kineis_lpm::console::{handle_at, handle_spi, CMD_READ_LPM};
use kineis_lpm::core::traits::LocalState;
use kineis_lpm::lpm_core::{
    AllowedModes, LowPowerMode, LpmClient, LpmError, ModeHooks, PolicyStore, RetentionRecord,
    MAX_CLIENTS,
};
use kineis_lpm::platform::mock::{MockPower, MockRetention};
use kineis_lpm::platform::traits::RetentionStore;
use kineis_lpm::{LowPowerManager, LpmState};

type Manager<'a> = LowPowerManager<'a, LocalState<LpmState<'a>>, MockPower, MockRetention>;

fn manager<'a>(allowed: AllowedModes) -> Manager<'a> {
    let policy = PolicyStore::new(allowed, ModeHooks::none()).unwrap();
    LowPowerManager::new(
        LocalState::new(LpmState::new(policy)),
        MockPower::new(),
        MockRetention::new(),
    )
}

/// Client with a fixed tolerance that counts notifications
struct Fixed {
    deepest: LowPowerMode,
    ready: bool,
    exits: AtomicU32,
}

impl Fixed {
    fn new(deepest: LowPowerMode) -> Self {
        Self {
            deepest,
            ready: true,
            exits: AtomicU32::new(0),
        }
    }

    fn not_ready(deepest: LowPowerMode) -> Self {
        Self {
            ready: false,
            ..Self::new(deepest)
        }
    }

    fn exits(&self) -> u32 {
        self.exits.load(Ordering::Relaxed)
    }
}

impl LpmClient for Fixed {
    fn deepest_mode(&self) -> LowPowerMode {
        self.deepest
    }

    fn on_enter(&self, _mode: LowPowerMode) -> Result<(), &'static str> {
        if self.ready {
            Ok(())
        } else {
            Err("not ready")
        }
    }

    fn on_exit(&self, _mode: LowPowerMode) -> Result<(), &'static str> {
        self.exits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[test]
fn shallowest_client_tolerance_wins() {
    let a = Fixed::new(LowPowerMode::Stop);
    let b = Fixed::new(LowPowerMode::Sleep);
    let lpm = manager(AllowedModes::all());
    lpm.register_client(&a).unwrap();
    lpm.register_client(&b).unwrap();

    let transition = lpm.enter(LowPowerMode::Standby).unwrap();

    assert_eq!(transition.entered, LowPowerMode::Sleep);
    assert_eq!(lpm.platform().entered().as_slice(), &[LowPowerMode::Sleep]);
    assert_eq!(a.exits(), 1);
    assert_eq!(b.exits(), 1);
}

#[test]
fn disabled_request_is_a_policy_violation() {
    let lpm = manager(AllowedModes::STANDBY | AllowedModes::SHUTDOWN);

    assert_eq!(
        lpm.enter(LowPowerMode::Sleep),
        Err(LpmError::PolicyViolation {
            requested: LowPowerMode::Sleep
        })
    );
    assert_eq!(lpm.mode(), LowPowerMode::None);
    assert_eq!(lpm.platform().entry_count(), 0);
    assert_eq!(lpm.stats().policy_violations, 1);
}

#[test]
fn client_tolerance_clamped_to_bitmap() {
    let a = Fixed::new(LowPowerMode::Standby);
    let lpm = manager(AllowedModes::SLEEP | AllowedModes::SHUTDOWN);
    lpm.register_client(&a).unwrap();

    let transition = lpm.enter(LowPowerMode::Shutdown).unwrap();

    assert_eq!(transition.entered, LowPowerMode::Sleep);
}

#[test]
fn sixth_client_is_rejected() {
    let clients: Vec<Fixed> = (0..=MAX_CLIENTS)
        .map(|_| Fixed::new(LowPowerMode::Shutdown))
        .collect();
    let lpm = manager(AllowedModes::all());

    let ids: Vec<_> = clients[..MAX_CLIENTS]
        .iter()
        .map(|client| lpm.register_client(client).unwrap())
        .collect();

    assert_eq!(
        lpm.register_client(&clients[MAX_CLIENTS]),
        Err(LpmError::CapacityExceeded)
    );
    assert_eq!(lpm.client_count(), MAX_CLIENTS);

    lpm.enter(LowPowerMode::Stop).unwrap();
    assert!(clients[..MAX_CLIENTS].iter().all(|c| c.exits() == 1));
    assert_eq!(clients[MAX_CLIENTS].exits(), 0);

    // A freed slot is reusable and ids stay unique
    lpm.unregister_client(ids[0]).unwrap();
    let id = lpm.register_client(&clients[MAX_CLIENTS]).unwrap();
    assert!(!ids.contains(&id));
}

#[test]
fn refusing_client_aborts_entry() {
    let a = Fixed::new(LowPowerMode::Shutdown);
    let b = Fixed::not_ready(LowPowerMode::Shutdown);
    let lpm = manager(AllowedModes::all());
    lpm.register_client(&a).unwrap();
    let b_id = lpm.register_client(&b).unwrap();

    assert_eq!(
        lpm.enter(LowPowerMode::Stop),
        Err(LpmError::NotReady {
            mode: LowPowerMode::Stop,
            client: b_id
        })
    );
    assert_eq!(lpm.mode(), LowPowerMode::None);
    assert_eq!(a.exits(), 0);
    assert_eq!(b.exits(), 0);
    assert_eq!(lpm.platform().entry_count(), 0);
}

#[test]
fn forced_shutdown_bypasses_refusal() {
    let a = Fixed::not_ready(LowPowerMode::Sleep);
    let lpm = manager(AllowedModes::all());
    lpm.register_client(&a).unwrap();
    lpm.set_reserved(0x0ABC);

    let transition = lpm.force_mode(LowPowerMode::Shutdown).unwrap();

    assert_eq!(transition.entered, LowPowerMode::Shutdown);
    assert_eq!(transition.overridden_vetoes, 1);
    assert_eq!(lpm.platform().entered().as_slice(), &[LowPowerMode::Shutdown]);
    assert_eq!(lpm.retention().save_count(), 1);
    assert_eq!(a.exits(), 1);
    assert_eq!(lpm.last_mode(), LowPowerMode::Shutdown);
}

#[test]
fn mode_query_is_idempotent() {
    let lpm = manager(AllowedModes::all());
    assert_eq!(lpm.mode(), lpm.mode());

    lpm.enter(LowPowerMode::Stop).unwrap();
    let first = lpm.context();
    assert_eq!(lpm.context(), first);
    assert_eq!(lpm.mode(), LowPowerMode::None);
}

#[test]
fn context_survives_standby_reset() {
    let before = manager(AllowedModes::all());
    before.set_reserved(0x0123_4567);
    let record = RetentionRecord::new(LowPowerMode::Standby, before.context().reserved);
    before.retention().save(record).unwrap();

    // Backup registers carried over the reset
    let retention = MockRetention::new();
    retention.set_raw(before.retention().raw());
    let policy = PolicyStore::new(AllowedModes::all(), ModeHooks::none()).unwrap();
    let after: Manager<'_> =
        LowPowerManager::new(LocalState::new(LpmState::new(policy)), MockPower::new(), retention);

    assert_eq!(after.resume(), Some(LowPowerMode::Standby));
    assert_eq!(after.last_mode(), LowPowerMode::Standby);
    assert_eq!(after.context().reserved, 0x0123_4567);
    assert_eq!(after.retention().restore(), None);
}

#[test]
fn builtin_clients_drive_arbitration() {
    let stack = StackClient::new();
    let uart = UartClient::new();
    let lpm = manager(AllowedModes::all());
    lpm.register_client(&stack).unwrap();
    lpm.register_client(&uart).unwrap();

    assert_eq!(lpm.enter(LowPowerMode::Shutdown).unwrap().entered, LowPowerMode::Stop);

    stack.set_resources(StackResources::TX_TIMEOUT);
    assert_eq!(lpm.enter(LowPowerMode::Shutdown).unwrap().entered, LowPowerMode::Sleep);

    stack.set_resources(StackResources::empty());
    uart.begin_transfer();
    assert_eq!(lpm.enter(LowPowerMode::Stop).unwrap().entered, LowPowerMode::Sleep);
}

#[test]
fn console_changes_policy() {
    let lpm = manager(AllowedModes::all());

    assert_eq!(handle_at(&lpm, "AT+LPM=0x3\r\n").as_str(), "+OK\r\n");
    assert_eq!(handle_spi(&lpm, &[CMD_READ_LPM]), Ok(0x03));
    assert_eq!(
        lpm.enter(LowPowerMode::Standby),
        Err(LpmError::PolicyViolation {
            requested: LowPowerMode::Standby
        })
    );
    assert_eq!(lpm.enter(LowPowerMode::Stop).unwrap().entered, LowPowerMode::Stop);
}
