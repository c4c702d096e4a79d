//! Transition statistics
//!
//! Counters updated by the transition engine. All counters saturate.

use crate::mode::LowPowerMode;

/// Low power transition counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionStats {
    entries: [u32; 4],
    /// Requests arbitrated to run mode
    pub stayed_awake: u32,
    /// Transitions aborted by a client veto
    pub vetoes: u32,
    /// Forced transitions
    pub forced: u32,
    /// Client vetoes ignored by forced transitions
    pub overridden_vetoes: u32,
    /// Exit notifications reporting failure
    pub exit_failures: u32,
    /// Requests rejected by the allowed-mode bitmap
    pub policy_violations: u32,
    /// Hardware entry failures
    pub entry_failures: u32,
    /// Requests rejected while a transition was in progress
    pub busy: u32,
}

impl TransitionStats {
    /// Zeroed counters
    pub const fn new() -> Self {
        Self {
            entries: [0; 4],
            stayed_awake: 0,
            vetoes: 0,
            forced: 0,
            overridden_vetoes: 0,
            exit_failures: 0,
            policy_violations: 0,
            entry_failures: 0,
            busy: 0,
        }
    }

    /// Count a completed entry into `mode`
    pub fn record_entry(&mut self, mode: LowPowerMode) {
        match Self::slot(mode) {
            Some(index) => bump(&mut self.entries[index]),
            None => bump(&mut self.stayed_awake),
        }
    }

    /// Number of completed entries into `mode`
    pub fn entries(&self, mode: LowPowerMode) -> u32 {
        match Self::slot(mode) {
            Some(index) => self.entries[index],
            None => self.stayed_awake,
        }
    }

    /// Completed entries into any low power mode
    pub fn total_entries(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, count| total.saturating_add(*count))
    }

    fn slot(mode: LowPowerMode) -> Option<usize> {
        match mode {
            LowPowerMode::None => None,
            LowPowerMode::Sleep => Some(0),
            LowPowerMode::Stop => Some(1),
            LowPowerMode::Standby => Some(2),
            LowPowerMode::Shutdown => Some(3),
        }
    }
}

/// Saturating increment
pub fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_entries() {
        let mut stats = TransitionStats::new();
        stats.record_entry(LowPowerMode::Sleep);
        stats.record_entry(LowPowerMode::Sleep);
        stats.record_entry(LowPowerMode::Shutdown);
        stats.record_entry(LowPowerMode::None);

        assert_eq!(stats.entries(LowPowerMode::Sleep), 2);
        assert_eq!(stats.entries(LowPowerMode::Stop), 0);
        assert_eq!(stats.entries(LowPowerMode::Shutdown), 1);
        assert_eq!(stats.stayed_awake, 1);
        assert_eq!(stats.total_entries(), 3);
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = TransitionStats::new();
        stats.vetoes = u32::MAX;
        bump(&mut stats.vetoes);
        assert_eq!(stats.vetoes, u32::MAX);
    }
}
