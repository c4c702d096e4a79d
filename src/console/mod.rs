//! Console commands for the low power policy
//!
//! Host side access to the allowed-mode bitmap, over the AT command UART
//! and over the SPI command interface.
//!
//! # AT Commands
//!
//! | Command          | Response            |
//! |------------------|---------------------|
//! | `AT+LPM=?`       | `+LPM=0x<HEX>\r\n`  |
//! | `AT+LPM=0x<HEX>` | `+OK\r\n`           |
//! | malformed        | `+ERROR=<code>\r\n` |
//!
//! Unknown bits in a written bitmap are dropped.
//!
//! # SPI Commands
//!
//! | Byte   | Command       | Reply                                   |
//! |--------|---------------|-----------------------------------------|
//! | `0x11` | READ_LPM      | bitmap                                  |
//! | `0x12` | WRITE_LPM_REQ | command byte                            |
//! | `0x13` | WRITE_LPM     | command byte, or [`SPI_NACK`] on error  |
//!
//! Unlike the AT command, WRITE_LPM rejects unknown bits.

use core::fmt::{self, Write};

use heapless::String;
use kineis_lpm_core::AllowedModes;

use crate::core::traits::SharedState;
use crate::lpm::manager::{LowPowerManager, LpmState};
use crate::platform::traits::{PowerInterface, RetentionStore, WakeupInterface};

/// Maximum AT response length
pub const RESPONSE_LEN: usize = 32;

/// AT response line
pub type Response = String<RESPONSE_LEN>;

/// SPI READ_LPM command
pub const CMD_READ_LPM: u8 = 0x11;
/// SPI WRITE_LPM_REQ command
pub const CMD_WRITE_LPM_REQ: u8 = 0x12;
/// SPI WRITE_LPM command
pub const CMD_WRITE_LPM: u8 = 0x13;
/// SPI reply byte for a rejected command
pub const SPI_NACK: u8 = 0x00;

const AT_LPM_PREFIX: &str = "AT+LPM";

/// Console command errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// Missing or malformed parameter
    ParameterFormat,
    /// Command not handled here
    UnknownCommand,
}

impl ConsoleError {
    /// Numeric code reported in `+ERROR=<code>`
    pub const fn code(self) -> i32 {
        match self {
            ConsoleError::ParameterFormat => 2,
            ConsoleError::UnknownCommand => 6,
        }
    }

    /// Short error name for logging
    pub const fn as_str(self) -> &'static str {
        match self {
            ConsoleError::ParameterFormat => "parameter format",
            ConsoleError::UnknownCommand => "unknown command",
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::ParameterFormat => write!(f, "Invalid command parameter"),
            ConsoleError::UnknownCommand => write!(f, "Unknown command"),
        }
    }
}

/// Policy access needed by the console
pub trait LpmControl {
    /// Current allowed-mode bitmap
    fn allowed_modes(&self) -> AllowedModes;

    /// Replace the allowed-mode bitmap
    fn set_allowed_modes(&self, allowed: AllowedModes);
}

impl<'a, S, P, R, const N: usize> LpmControl for LowPowerManager<'a, S, P, R, N>
where
    S: SharedState<LpmState<'a, N>>,
    P: PowerInterface + WakeupInterface,
    R: RetentionStore,
{
    fn allowed_modes(&self) -> AllowedModes {
        LowPowerManager::allowed_modes(self)
    }

    fn set_allowed_modes(&self, allowed: AllowedModes) {
        LowPowerManager::set_allowed_modes(self, allowed)
    }
}

/// Handle one AT command line
///
/// Trailing CR/LF are ignored. Always produces a response line.
pub fn handle_at<C: LpmControl + ?Sized>(lpm: &C, line: &str) -> Response {
    match run_at(lpm, line.trim_end_matches(['\r', '\n'])) {
        Ok(response) => response,
        Err(e) => {
            crate::log_warn!("AT+LPM rejected: {}", e.as_str());
            error_response(e)
        }
    }
}

fn run_at<C: LpmControl + ?Sized>(lpm: &C, line: &str) -> Result<Response, ConsoleError> {
    let param = line
        .strip_prefix(AT_LPM_PREFIX)
        .ok_or(ConsoleError::UnknownCommand)?
        .strip_prefix('=')
        .ok_or(ConsoleError::ParameterFormat)?;

    let mut response = Response::new();
    if param == "?" {
        write!(response, "+LPM=0x{:X}\r\n", lpm.allowed_modes().bits())
            .map_err(|_| ConsoleError::ParameterFormat)?;
        return Ok(response);
    }

    let allowed = AllowedModes::parse_hex(param).ok_or(ConsoleError::ParameterFormat)?;
    lpm.set_allowed_modes(allowed);
    response
        .push_str("+OK\r\n")
        .map_err(|_| ConsoleError::ParameterFormat)?;
    Ok(response)
}

/// `+ERROR=<code>` response line
pub fn error_response(error: ConsoleError) -> Response {
    let mut response = Response::new();
    // Fits in RESPONSE_LEN
    let _ = write!(response, "+ERROR={}\r\n", error.code());
    response
}

/// Handle one SPI command frame
///
/// `frame[0]` is the command byte, followed by its data. Returns the reply
/// byte; on error the transport answers [`SPI_NACK`].
pub fn handle_spi<C: LpmControl + ?Sized>(lpm: &C, frame: &[u8]) -> Result<u8, ConsoleError> {
    let (&command, data) = frame.split_first().ok_or(ConsoleError::UnknownCommand)?;

    match command {
        CMD_READ_LPM => Ok(lpm.allowed_modes().bits()),
        CMD_WRITE_LPM_REQ => Ok(command),
        CMD_WRITE_LPM => {
            let raw = *data.first().ok_or(ConsoleError::ParameterFormat)?;
            let allowed = AllowedModes::from_bits(raw).ok_or_else(|| {
                crate::log_warn!("SPI WRITE_LPM rejected bitmap 0x{:X}", raw);
                ConsoleError::ParameterFormat
            })?;
            lpm.set_allowed_modes(allowed);
            Ok(command)
        }
        _ => {
            crate::log_debug!("SPI command 0x{:X} not handled", command);
            Err(ConsoleError::UnknownCommand)
        }
    }
}

/// Reply byte for a [`handle_spi`] result
pub fn spi_reply(result: Result<u8, ConsoleError>) -> u8 {
    result.unwrap_or(SPI_NACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Policy {
        allowed: Cell<AllowedModes>,
    }

    impl Policy {
        fn new(allowed: AllowedModes) -> Self {
            Self {
                allowed: Cell::new(allowed),
            }
        }
    }

    impl LpmControl for Policy {
        fn allowed_modes(&self) -> AllowedModes {
            self.allowed.get()
        }

        fn set_allowed_modes(&self, allowed: AllowedModes) {
            self.allowed.set(allowed);
        }
    }

    #[test]
    fn test_at_query() {
        let policy = Policy::new(AllowedModes::SLEEP | AllowedModes::STANDBY);
        assert_eq!(handle_at(&policy, "AT+LPM=?\r\n").as_str(), "+LPM=0x5\r\n");
    }

    #[test]
    fn test_at_write_masks_unknown_bits() {
        let policy = Policy::new(AllowedModes::all());
        assert_eq!(handle_at(&policy, "AT+LPM=0x32").as_str(), "+OK\r\n");
        assert_eq!(policy.allowed_modes(), AllowedModes::STOP);
    }

    #[test]
    fn test_at_errors() {
        let policy = Policy::new(AllowedModes::all());

        assert_eq!(handle_at(&policy, "AT+LPM=zz").as_str(), "+ERROR=2\r\n");
        assert_eq!(handle_at(&policy, "AT+LPM=").as_str(), "+ERROR=2\r\n");
        assert_eq!(handle_at(&policy, "AT+LPM").as_str(), "+ERROR=2\r\n");
        assert_eq!(handle_at(&policy, "AT+PING").as_str(), "+ERROR=6\r\n");
        assert_eq!(policy.allowed_modes(), AllowedModes::all());
    }

    #[test]
    fn test_spi_read_and_write() {
        let policy = Policy::new(AllowedModes::STOP);

        assert_eq!(handle_spi(&policy, &[CMD_READ_LPM]), Ok(0x02));
        assert_eq!(handle_spi(&policy, &[CMD_WRITE_LPM_REQ]), Ok(CMD_WRITE_LPM_REQ));
        assert_eq!(handle_spi(&policy, &[CMD_WRITE_LPM, 0x09]), Ok(CMD_WRITE_LPM));
        assert_eq!(
            policy.allowed_modes(),
            AllowedModes::SLEEP | AllowedModes::SHUTDOWN
        );
    }

    #[test]
    fn test_spi_write_rejects_unknown_bits() {
        let policy = Policy::new(AllowedModes::STOP);

        let result = handle_spi(&policy, &[CMD_WRITE_LPM, 0x11]);
        assert_eq!(result, Err(ConsoleError::ParameterFormat));
        assert_eq!(spi_reply(result), SPI_NACK);
        assert_eq!(handle_spi(&policy, &[CMD_WRITE_LPM]), Err(ConsoleError::ParameterFormat));
        assert_eq!(policy.allowed_modes(), AllowedModes::STOP);
    }

    #[test]
    fn test_spi_unknown_command() {
        let policy = Policy::new(AllowedModes::all());
        assert_eq!(handle_spi(&policy, &[0x42]), Err(ConsoleError::UnknownCommand));
        assert_eq!(handle_spi(&policy, &[]), Err(ConsoleError::UnknownCommand));
    }
}
