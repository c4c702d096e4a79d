//! Low Power Manager Error Types
//!
//! Defines the errors returned by registry, policy, arbitration and
//! transition operations. All errors are returned synchronously to the
//! caller; none of them is fatal except [`LpmError::EntryFailed`].

use core::fmt;

use crate::client::ClientId;
use crate::mode::LowPowerMode;

/// Errors from low power manager operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpmError {
    /// Client registry is full
    CapacityExceeded,
    /// Client id is unknown or was already unregistered
    ClientNotFound,
    /// Requested or forced mode is not enabled in the allowed-mode bitmap
    PolicyViolation {
        /// Mode the caller asked for
        requested: LowPowerMode,
    },
    /// A client refused the enter notification
    ///
    /// Expected during normal operation. The caller decides whether to
    /// retry with a shallower mode or to defer.
    NotReady {
        /// Mode that was about to be entered
        mode: LowPowerMode,
        /// Client that refused
        client: ClientId,
    },
    /// A transition is already in progress
    Busy,
    /// Invalid configuration (e.g. empty allowed-mode bitmap at init)
    InvalidConfig,
    /// Wake-up source descriptor rejected
    InvalidWakeSource,
    /// Hardware low power entry failed, the system stayed in its prior mode
    EntryFailed {
        /// Mode that could not be entered
        mode: LowPowerMode,
    },
}

impl LpmError {
    /// Short error name for logging
    pub const fn as_str(&self) -> &'static str {
        match self {
            LpmError::CapacityExceeded => "capacity exceeded",
            LpmError::ClientNotFound => "client not found",
            LpmError::PolicyViolation { .. } => "policy violation",
            LpmError::NotReady { .. } => "client not ready",
            LpmError::Busy => "transition in progress",
            LpmError::InvalidConfig => "invalid configuration",
            LpmError::InvalidWakeSource => "invalid wake-up source",
            LpmError::EntryFailed { .. } => "low power entry failed",
        }
    }
}

impl fmt::Display for LpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpmError::PolicyViolation { requested } => {
                write!(f, "Low power mode {} is not allowed", requested)
            }
            LpmError::NotReady { mode, client } => {
                write!(f, "Client {} not ready to enter {}", client.raw(), mode)
            }
            LpmError::EntryFailed { mode } => write!(f, "Failed to enter {}", mode),
            LpmError::CapacityExceeded => write!(f, "Client registry is full"),
            LpmError::ClientNotFound => write!(f, "Client not registered"),
            LpmError::Busy => write!(f, "Low power transition already in progress"),
            LpmError::InvalidConfig => write!(f, "Invalid low power configuration"),
            LpmError::InvalidWakeSource => write!(f, "Invalid wake-up source"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_lpm_error_display() {
        let error = LpmError::PolicyViolation {
            requested: LowPowerMode::Stop,
        };
        assert_eq!(format!("{}", error), "Low power mode STOP is not allowed");

        let error = LpmError::NotReady {
            mode: LowPowerMode::Standby,
            client: ClientId::from_raw(3),
        };
        assert_eq!(format!("{}", error), "Client 3 not ready to enter STANDBY");

        assert_eq!(
            format!("{}", LpmError::Busy),
            "Low power transition already in progress"
        );
        assert_eq!(
            format!("{}", LpmError::CapacityExceeded),
            "Client registry is full"
        );
    }

    #[test]
    fn test_lpm_error_as_str() {
        assert_eq!(LpmError::ClientNotFound.as_str(), "client not found");
        assert_eq!(
            LpmError::EntryFailed {
                mode: LowPowerMode::Stop
            }
            .as_str(),
            "low power entry failed"
        );
    }
}
