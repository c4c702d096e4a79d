//! Mock retention memory for testing

use core::cell::Cell;

use kineis_lpm_core::{RetentionRecord, RETENTION_MAGIC};

use crate::platform::{
    error::{PlatformError, RetentionError},
    traits::RetentionStore,
    Result,
};

/// Mock retention memory
///
/// Two words of simulated backup registers, laid out like
/// [`BackupRegisterRetention`](crate::platform::retention::BackupRegisterRetention).
///
/// # Example
///
/// ```
/// use kineis_lpm::platform::mock::MockRetention;
/// use kineis_lpm::platform::traits::RetentionStore;
/// use kineis_lpm_core::{LowPowerMode, RetentionRecord};
///
/// let retention = MockRetention::new();
/// let record = RetentionRecord::new(LowPowerMode::Standby, 7);
/// retention.save(record).unwrap();
/// assert_eq!(retention.restore(), Some(record));
/// ```
#[derive(Debug)]
pub struct MockRetention {
    words: Cell<[u32; 2]>,
    magic: u32,
    write_protected: Cell<bool>,
    saves: Cell<u32>,
}

impl MockRetention {
    /// Create an empty retention memory
    pub fn new() -> Self {
        Self {
            words: Cell::new([0; 2]),
            magic: RETENTION_MAGIC,
            write_protected: Cell::new(false),
            saves: Cell::new(0),
        }
    }

    /// Retention memory holding `record`, as found after a STANDBY reset
    pub fn with_record(record: RetentionRecord) -> Self {
        let retention = Self::new();
        retention.words.set(record.to_words(retention.magic));
        retention
    }

    /// Overwrite the raw words (simulates garbage after power loss)
    pub fn set_raw(&self, words: [u32; 2]) {
        self.words.set(words);
    }

    /// Raw words
    pub fn raw(&self) -> [u32; 2] {
        self.words.get()
    }

    /// Reject writes (simulates a locked backup domain)
    pub fn set_write_protected(&self, protected: bool) {
        self.write_protected.set(protected);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }

    fn check_writable(&self) -> Result<()> {
        if self.write_protected.get() {
            return Err(PlatformError::Retention(RetentionError::WriteProtected));
        }
        Ok(())
    }
}

impl Default for MockRetention {
    fn default() -> Self {
        Self::new()
    }
}

impl RetentionStore for MockRetention {
    fn save(&self, record: RetentionRecord) -> Result<()> {
        self.check_writable()?;
        self.words.set(record.to_words(self.magic));
        self.saves.set(self.saves.get().saturating_add(1));
        Ok(())
    }

    fn restore(&self) -> Option<RetentionRecord> {
        RetentionRecord::from_words(self.words.get(), self.magic)
    }

    fn clear(&self) -> Result<()> {
        self.check_writable()?;
        self.words.set([0; 2]);
        Ok(())
    }
}
