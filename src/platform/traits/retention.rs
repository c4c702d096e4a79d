//! Retention memory interface trait
//!
//! Retention memory survives every low power mode including SHUTDOWN (RTC or
//! TAMP backup registers). It holds one [`RetentionRecord`].

use crate::platform::Result;
use kineis_lpm_core::RetentionRecord;

/// Retention store interface
///
/// # Invariants
///
/// - `restore` after `save` returns the saved record
/// - `restore` never returns a record that was not saved (garbage after a
///   full power loss reads as `None`)
/// - `restore` after `clear` returns `None`
pub trait RetentionStore {
    /// Persist `record`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Retention` if the memory cannot be written.
    fn save(&self, record: RetentionRecord) -> Result<()>;

    /// Read the persisted record, if any
    fn restore(&self) -> Option<RetentionRecord>;

    /// Invalidate the persisted record
    fn clear(&self) -> Result<()>;
}
