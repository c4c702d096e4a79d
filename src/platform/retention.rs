//! Backup register retention store
//!
//! Stores the retention record in two consecutive 32-bit backup registers
//! (magic word, then packed record). Backup registers live in the always-on
//! domain and keep their content through STANDBY and SHUTDOWN.

use core::ptr;

use kineis_lpm_core::RetentionRecord;

use crate::platform::{
    error::{PlatformError, RetentionError},
    traits::RetentionStore,
    Result,
};

const MAGIC_INDEX: usize = 0;
const RECORD_INDEX: usize = 1;

/// Retention store over memory-mapped backup registers
///
/// All accesses are volatile. The magic word is invalidated first and
/// written last, so a reset in the middle of `save` leaves no valid record.
pub struct BackupRegisterRetention {
    base: *mut u32,
    magic: u32,
}

impl BackupRegisterRetention {
    /// Create a store over the two words at `base`
    ///
    /// # Safety
    ///
    /// `base` must point to two consecutive, word-aligned 32-bit registers
    /// (or memory words) valid for volatile reads and writes for the
    /// lifetime of the store, and not used by anything else.
    pub const unsafe fn new(base: *mut u32, magic: u32) -> Self {
        Self { base, magic }
    }

    fn read(&self, index: usize) -> u32 {
        // SAFETY: index < 2 and `new` guarantees both words are valid
        unsafe { ptr::read_volatile(self.base.add(index)) }
    }

    fn write(&self, index: usize, value: u32) {
        // SAFETY: index < 2 and `new` guarantees both words are valid
        unsafe { ptr::write_volatile(self.base.add(index), value) }
    }
}

impl RetentionStore for BackupRegisterRetention {
    fn save(&self, record: RetentionRecord) -> Result<()> {
        let [magic, packed] = record.to_words(self.magic);

        self.write(MAGIC_INDEX, !magic);
        self.write(RECORD_INDEX, packed);
        self.write(MAGIC_INDEX, magic);

        // Writes are silently dropped while the backup domain is locked
        if self.read(RECORD_INDEX) != packed || self.read(MAGIC_INDEX) != magic {
            return Err(PlatformError::Retention(RetentionError::VerifyFailed));
        }
        Ok(())
    }

    fn restore(&self) -> Option<RetentionRecord> {
        RetentionRecord::from_words([self.read(MAGIC_INDEX), self.read(RECORD_INDEX)], self.magic)
    }

    fn clear(&self) -> Result<()> {
        self.write(MAGIC_INDEX, 0);
        self.write(RECORD_INDEX, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kineis_lpm_core::{LowPowerMode, RETENTION_MAGIC};
    use serial_test::serial;

    // Process-wide stand-in for the backup register bank
    static mut BACKUP_AREA: [u32; 2] = [0; 2];

    fn backup_store() -> BackupRegisterRetention {
        // SAFETY: tests touching BACKUP_AREA are serialized
        unsafe {
            let area = ptr::addr_of_mut!(BACKUP_AREA);
            ptr::write_volatile(area, [0; 2]);
            BackupRegisterRetention::new(area as *mut u32, RETENTION_MAGIC)
        }
    }

    #[test]
    #[serial]
    fn test_backup_roundtrip() {
        let store = backup_store();
        let record = RetentionRecord::new(LowPowerMode::Standby, 0x00C0_FFEE);

        store.save(record).unwrap();
        assert_eq!(store.restore(), Some(record));
    }

    #[test]
    #[serial]
    fn test_backup_layout() {
        let store = backup_store();
        store
            .save(RetentionRecord::new(LowPowerMode::Shutdown, 5))
            .unwrap();

        // SAFETY: serialized access
        let words = unsafe { ptr::read_volatile(ptr::addr_of!(BACKUP_AREA)) };
        assert_eq!(words, [RETENTION_MAGIC, 0x8000_0005]);
    }

    #[test]
    #[serial]
    fn test_backup_empty_after_power_loss() {
        let store = backup_store();
        assert_eq!(store.restore(), None);
    }

    #[test]
    #[serial]
    fn test_backup_clear() {
        let store = backup_store();
        store
            .save(RetentionRecord::new(LowPowerMode::Standby, 0))
            .unwrap();
        store.clear().unwrap();
        assert_eq!(store.restore(), None);
    }
}
