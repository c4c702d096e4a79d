//! Low Power Mode Arbitration
//!
//! Chooses the single low power mode to enter from the caller's request,
//! the deepest mode each client can survive, and the allowed-mode bitmap.
//!
//! # Policy
//!
//! The shallowest candidate wins: the system never goes deeper than the
//! most conservative client, even if the caller asked for more. If that mode
//! is disabled, the arbiter steps down to the deepest enabled mode below it.

use crate::error::LpmError;
use crate::mode::{AllowedModes, LowPowerMode};

/// Decide the effective low power mode
///
/// # Arguments
///
/// * `requested` - Mode asked for by the caller
/// * `allowed` - Current allowed-mode bitmap
/// * `tolerances` - Deepest mode tolerated by each registered client
///
/// # Returns
///
/// The effective mode, never deeper than `requested` or any tolerance and
/// always permitted by `allowed`. With no tolerances the request is used
/// as is.
///
/// # Errors
///
/// Returns `LpmError::PolicyViolation` if `requested` is disabled in
/// `allowed`.
pub fn decide<I>(
    requested: LowPowerMode,
    allowed: AllowedModes,
    tolerances: I,
) -> Result<LowPowerMode, LpmError>
where
    I: IntoIterator<Item = LowPowerMode>,
{
    if requested == LowPowerMode::None {
        return Ok(LowPowerMode::None);
    }

    if !allowed.permits(requested) {
        return Err(LpmError::PolicyViolation { requested });
    }

    let shallowest = tolerances.into_iter().fold(requested, LowPowerMode::min);

    Ok(allowed.clamp(shallowest))
}

#[cfg(test)]
mod tests {
    use super::*;

    use LowPowerMode::{None as Run, Shutdown, Sleep, Standby, Stop};

    #[test]
    fn test_no_clients_uses_request() {
        for mode in LowPowerMode::ALL {
            assert_eq!(decide(mode, AllowedModes::all(), []), Ok(mode));
        }
    }

    #[test]
    fn test_shallowest_client_wins() {
        // Client A tolerates STOP, client B tolerates SLEEP
        assert_eq!(
            decide(Standby, AllowedModes::all(), [Stop, Sleep]),
            Ok(Sleep)
        );
    }

    #[test]
    fn test_request_shallower_than_clients() {
        assert_eq!(
            decide(Sleep, AllowedModes::all(), [Shutdown, Standby]),
            Ok(Sleep)
        );
    }

    #[test]
    fn test_client_none_keeps_system_awake() {
        assert_eq!(
            decide(Shutdown, AllowedModes::all(), [Standby, Run, Stop]),
            Ok(Run)
        );
    }

    #[test]
    fn test_disallowed_request_is_policy_violation() {
        let allowed = AllowedModes::STANDBY | AllowedModes::SHUTDOWN;
        assert_eq!(
            decide(Sleep, allowed, []),
            Err(LpmError::PolicyViolation { requested: Sleep })
        );
        assert_eq!(
            decide(Stop, AllowedModes::empty(), [Shutdown]),
            Err(LpmError::PolicyViolation { requested: Stop })
        );
    }

    #[test]
    fn test_disallowed_candidate_steps_down() {
        // Clients limit to STANDBY, which is disabled: fall back to STOP
        let allowed = AllowedModes::SLEEP | AllowedModes::STOP | AllowedModes::SHUTDOWN;
        assert_eq!(decide(Shutdown, allowed, [Standby]), Ok(Stop));

        // Nothing enabled below the candidate: stay awake
        let allowed = AllowedModes::STANDBY | AllowedModes::SHUTDOWN;
        assert_eq!(decide(Shutdown, allowed, [Stop]), Ok(Run));
    }

    #[test]
    fn test_none_request_is_noop() {
        assert_eq!(decide(Run, AllowedModes::empty(), [Sleep]), Ok(Run));
    }

    #[test]
    fn test_exhaustive_min_property() {
        let allowed_sets = [
            AllowedModes::all(),
            AllowedModes::SLEEP | AllowedModes::STANDBY,
            AllowedModes::STOP,
            AllowedModes::SHUTDOWN | AllowedModes::SLEEP,
        ];

        for allowed in allowed_sets {
            for requested in LowPowerMode::ALL {
                for a in LowPowerMode::ALL {
                    for b in LowPowerMode::ALL {
                        let result = decide(requested, allowed, [a, b]);
                        if !allowed.permits(requested) {
                            assert!(result.is_err());
                            continue;
                        }

                        let mode = result.unwrap();
                        let expected_min = requested.min(a).min(b);
                        assert!(mode <= expected_min);
                        assert!(allowed.permits(mode));
                        if allowed.permits(expected_min) {
                            assert_eq!(mode, expected_min);
                        }
                        if a == Run || b == Run {
                            assert_eq!(mode, Run);
                        }
                    }
                }
            }
        }
    }
}
