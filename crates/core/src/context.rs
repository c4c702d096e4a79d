//! Low Power Context and Retention Record
//!
//! [`LpmContext`] tracks which mode the system is in. The subset that must
//! survive STANDBY and SHUTDOWN is the [`RetentionRecord`], written to
//! always-on memory before a destructive transition.
//!
//! # Record Layout
//!
//! The record packs into one 32-bit word:
//!
//! ```text
//! 31      28 27                                   0
//! +---------+--------------------------------------+
//! |  mode   |               reserved               |
//! +---------+--------------------------------------+
//! ```
//!
//! It is stored next to a magic word so that backup memory left with
//! garbage after a full power loss is not mistaken for a record.

use crate::mode::LowPowerMode;

/// Default magic word marking a valid retention record ("LPM1")
pub const RETENTION_MAGIC: u32 = 0x4C50_4D31;

/// Mask of the reserved field
pub const RESERVED_MASK: u32 = 0x0FFF_FFFF;

const MODE_SHIFT: u32 = 28;

/// Mode state of the low power manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LpmContext {
    /// Mode being entered or currently active (`None` when awake)
    pub current_mode: LowPowerMode,
    /// Last mode fully entered and exited
    pub last_mode: LowPowerMode,
    /// Application data carried across destructive modes (28 bits)
    pub reserved: u32,
}

impl LpmContext {
    /// Context of a freshly booted system
    pub const fn new() -> Self {
        Self {
            current_mode: LowPowerMode::None,
            last_mode: LowPowerMode::None,
            reserved: 0,
        }
    }

    /// Record to save before entering `mode`
    pub fn record_for(&self, mode: LowPowerMode) -> RetentionRecord {
        RetentionRecord::new(mode, self.reserved)
    }

    /// Apply a record read back after wake-up
    ///
    /// The record's mode becomes `last_mode`: the system is awake again.
    pub fn restore(&mut self, record: RetentionRecord) {
        self.current_mode = LowPowerMode::None;
        self.last_mode = record.mode;
        self.reserved = record.reserved;
    }

    /// Set the reserved field, truncated to 28 bits
    pub fn set_reserved(&mut self, reserved: u32) {
        self.reserved = reserved & RESERVED_MASK;
    }
}

/// Context subset persisted across STANDBY and SHUTDOWN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionRecord {
    /// Mode entered when the record was written
    pub mode: LowPowerMode,
    /// Reserved field (28 bits)
    pub reserved: u32,
}

impl RetentionRecord {
    /// Create a record, truncating `reserved` to 28 bits
    pub const fn new(mode: LowPowerMode, reserved: u32) -> Self {
        Self {
            mode,
            reserved: reserved & RESERVED_MASK,
        }
    }

    /// Pack into a single word
    pub const fn pack(&self) -> u32 {
        ((self.mode.raw() as u32) << MODE_SHIFT) | (self.reserved & RESERVED_MASK)
    }

    /// Unpack a word written by [`pack`](Self::pack)
    ///
    /// Returns `None` if the mode nibble is not a valid mode.
    pub const fn unpack(word: u32) -> Option<Self> {
        match LowPowerMode::from_raw((word >> MODE_SHIFT) as u8) {
            Some(mode) => Some(Self {
                mode,
                reserved: word & RESERVED_MASK,
            }),
            None => None,
        }
    }

    /// Storage words: `[magic, packed record]`
    pub const fn to_words(&self, magic: u32) -> [u32; 2] {
        [magic, self.pack()]
    }

    /// Decode storage words
    ///
    /// Returns `None` unless the magic matches and the record is valid.
    pub const fn from_words(words: [u32; 2], magic: u32) -> Option<Self> {
        if words[0] != magic {
            return None;
        }
        Self::unpack(words[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        let record = RetentionRecord::new(LowPowerMode::Standby, 0x0123_4567);
        assert_eq!(record.pack(), 0x4123_4567);

        let record = RetentionRecord::new(LowPowerMode::Shutdown, 0);
        assert_eq!(record.pack(), 0x8000_0000);
    }

    #[test]
    fn test_reserved_truncated() {
        let record = RetentionRecord::new(LowPowerMode::Sleep, 0xFFFF_FFFF);
        assert_eq!(record.reserved, RESERVED_MASK);
        assert_eq!(record.pack() >> 28, 0x1);
    }

    #[test]
    fn test_unpack_rejects_invalid_mode() {
        assert_eq!(RetentionRecord::unpack(0x3000_0000), None);
        assert_eq!(RetentionRecord::unpack(0xF000_0001), None);
    }

    #[test]
    fn test_words_roundtrip_and_magic() {
        let record = RetentionRecord::new(LowPowerMode::Shutdown, 42);
        let words = record.to_words(RETENTION_MAGIC);
        assert_eq!(RetentionRecord::from_words(words, RETENTION_MAGIC), Some(record));

        // Backup memory after power loss
        assert_eq!(RetentionRecord::from_words([0, 0], RETENTION_MAGIC), None);
        assert_eq!(RetentionRecord::from_words(words, 0xDEAD_BEEF), None);
    }

    #[test]
    fn test_context_restore() {
        let mut context = LpmContext::new();
        context.set_reserved(0x1234);
        context.current_mode = LowPowerMode::Standby;

        let record = context.record_for(LowPowerMode::Standby);
        let mut rebooted = LpmContext::default();
        rebooted.restore(record);

        assert_eq!(rebooted.current_mode, LowPowerMode::None);
        assert_eq!(rebooted.last_mode, LowPowerMode::Standby);
        assert_eq!(rebooted.reserved, 0x1234);
    }
}
