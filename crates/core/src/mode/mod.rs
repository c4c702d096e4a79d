//! Low Power Mode Types
//!
//! Defines the low power modes handled by the manager and the bitmap used to
//! enable or disable each of them.
//!
//! # Depth Ordering
//!
//! Modes are totally ordered from shallowest to deepest:
//!
//! ```text
//! None < Sleep < Stop < Standby < Shutdown
//! ```
//!
//! Deeper modes save more power but lose more volatile state. `Standby` and
//! `Shutdown` exit through a reset of the microcontroller.
//!
//! # Numeric Values
//!
//! Each mode's numeric value is also its bit in [`AllowedModes`]. `None` has
//! no bit: run mode is always permitted.

use bitflags::bitflags;
use core::fmt;

/// Low power mode
///
/// Variants are declared from shallowest to deepest so the derived ordering
/// is the depth ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum LowPowerMode {
    /// Run mode, no low power state
    #[default]
    None = 0x00,
    /// CPU clock stopped, peripherals running
    Sleep = 0x01,
    /// Most clocks stopped, RAM and registers retained
    Stop = 0x02,
    /// Only backup domain retained, exit through reset
    Standby = 0x04,
    /// Lowest consumption, backup registers only, exit through reset
    Shutdown = 0x08,
}

impl LowPowerMode {
    /// All modes from shallowest to deepest
    pub const ALL: [LowPowerMode; 5] = [
        LowPowerMode::None,
        LowPowerMode::Sleep,
        LowPowerMode::Stop,
        LowPowerMode::Standby,
        LowPowerMode::Shutdown,
    ];

    /// Decode a raw mode value
    ///
    /// Returns `None` for values that are not exactly one mode.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(LowPowerMode::None),
            0x01 => Some(LowPowerMode::Sleep),
            0x02 => Some(LowPowerMode::Stop),
            0x04 => Some(LowPowerMode::Standby),
            0x08 => Some(LowPowerMode::Shutdown),
            _ => None,
        }
    }

    /// Raw numeric value
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Bit of this mode in the allowed-mode bitmap (empty for `None`)
    pub const fn bit(self) -> AllowedModes {
        AllowedModes::from_bits_truncate(self as u8)
    }

    /// Next shallower mode (`None` stays `None`)
    pub const fn shallower(self) -> Self {
        match self {
            LowPowerMode::None | LowPowerMode::Sleep => LowPowerMode::None,
            LowPowerMode::Stop => LowPowerMode::Sleep,
            LowPowerMode::Standby => LowPowerMode::Stop,
            LowPowerMode::Shutdown => LowPowerMode::Standby,
        }
    }

    /// True if RAM and CPU registers do not survive this mode
    ///
    /// The context must be saved to retention memory before entering.
    pub const fn is_destructive(self) -> bool {
        matches!(self, LowPowerMode::Standby | LowPowerMode::Shutdown)
    }

    /// Mode name for logging and console output
    pub const fn as_str(self) -> &'static str {
        match self {
            LowPowerMode::None => "NONE",
            LowPowerMode::Sleep => "SLEEP",
            LowPowerMode::Stop => "STOP",
            LowPowerMode::Standby => "STANDBY",
            LowPowerMode::Shutdown => "SHUTDOWN",
        }
    }
}

impl fmt::Display for LowPowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Bitmap of low power modes the system may enter
    ///
    /// Bit values match [`LowPowerMode`] numeric values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AllowedModes: u8 {
        /// SLEEP permitted
        const SLEEP = 0x01;
        /// STOP permitted
        const STOP = 0x02;
        /// STANDBY permitted
        const STANDBY = 0x04;
        /// SHUTDOWN permitted
        const SHUTDOWN = 0x08;
    }
}

impl AllowedModes {
    /// Check whether `mode` may be entered
    ///
    /// `None` is always permitted.
    pub fn permits(self, mode: LowPowerMode) -> bool {
        mode == LowPowerMode::None || self.contains(mode.bit())
    }

    /// Deepest permitted mode
    pub fn deepest(self) -> LowPowerMode {
        self.clamp(LowPowerMode::Shutdown)
    }

    /// Deepest permitted mode that is not deeper than `mode`
    ///
    /// Walks towards shallower modes until one is permitted, ending at
    /// `None`.
    pub fn clamp(self, mode: LowPowerMode) -> LowPowerMode {
        let mut candidate = mode;
        while !self.permits(candidate) {
            candidate = candidate.shallower();
        }
        candidate
    }

    /// Parse a hexadecimal bitmap such as `0x0F` or `f`
    ///
    /// Unknown bits are dropped. Returns `None` if the text is not a valid
    /// hexadecimal byte.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty() {
            return None;
        }
        u16::from_str_radix(digits, 16)
            .ok()
            .map(|raw| Self::from_bits_truncate(raw as u8))
    }
}

impl Default for AllowedModes {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_depth_ordering() {
        assert!(LowPowerMode::None < LowPowerMode::Sleep);
        assert!(LowPowerMode::Sleep < LowPowerMode::Stop);
        assert!(LowPowerMode::Stop < LowPowerMode::Standby);
        assert!(LowPowerMode::Standby < LowPowerMode::Shutdown);
        assert_eq!(
            LowPowerMode::Stop.min(LowPowerMode::Sleep),
            LowPowerMode::Sleep
        );
    }

    #[test]
    fn test_from_raw() {
        for mode in LowPowerMode::ALL {
            assert_eq!(LowPowerMode::from_raw(mode.raw()), Some(mode));
        }
        assert_eq!(LowPowerMode::from_raw(0x03), None);
        assert_eq!(LowPowerMode::from_raw(0x10), None);
    }

    #[test]
    fn test_destructive_modes() {
        assert!(!LowPowerMode::None.is_destructive());
        assert!(!LowPowerMode::Sleep.is_destructive());
        assert!(!LowPowerMode::Stop.is_destructive());
        assert!(LowPowerMode::Standby.is_destructive());
        assert!(LowPowerMode::Shutdown.is_destructive());
    }

    #[test]
    fn test_none_always_permitted() {
        assert!(AllowedModes::empty().permits(LowPowerMode::None));
        assert!(!AllowedModes::empty().permits(LowPowerMode::Sleep));
    }

    #[test]
    fn test_clamp_steps_down_to_permitted_mode() {
        let allowed = AllowedModes::SLEEP | AllowedModes::STANDBY;
        assert_eq!(allowed.clamp(LowPowerMode::Shutdown), LowPowerMode::Standby);
        assert_eq!(allowed.clamp(LowPowerMode::Stop), LowPowerMode::Sleep);
        assert_eq!(
            AllowedModes::SHUTDOWN.clamp(LowPowerMode::Standby),
            LowPowerMode::None
        );
        assert_eq!(allowed.deepest(), LowPowerMode::Standby);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(AllowedModes::parse_hex("0x0F"), Some(AllowedModes::all()));
        assert_eq!(
            AllowedModes::parse_hex("0X5"),
            Some(AllowedModes::SLEEP | AllowedModes::STANDBY)
        );
        assert_eq!(AllowedModes::parse_hex("3"), Some(AllowedModes::SLEEP | AllowedModes::STOP));
        // Unknown bits are dropped
        assert_eq!(AllowedModes::parse_hex("0xF1"), Some(AllowedModes::SLEEP));
        assert_eq!(AllowedModes::parse_hex("0x"), None);
        assert_eq!(AllowedModes::parse_hex("zz"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", LowPowerMode::Standby), "STANDBY");
    }
}
