//! Outcome classification shared across mount workers.
//!
//! Every mount attempt ends in exactly one of four classes: mounted,
//! skipped, failed, or an input error that never reached a worker. Workers
//! record formatted result lines into duplicate-free sets behind one coarse
//! mutex; the lock is held only for the insert, never across a mount call,
//! so contention stays negligible next to the mount itself.

use std::collections::BTreeSet;

use parking_lot::Mutex;

/// Terminal classification of one mount attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountDisposition {
    /// Mounted successfully with the named filesystem type.
    Mounted { fstype: &'static str },

    /// Target already looked like a mount point; nothing was done.
    Skipped,

    /// No attempt succeeded; `reason` is the operator-facing message.
    Failed { reason: String },
}

/// Drained snapshot of one orchestration call's results.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutcomeReport {
    /// Successfully mounted images.
    pub mounted: BTreeSet<String>,

    /// Images skipped because they were already mounted.
    pub skipped: BTreeSet<String>,

    /// Images for which every attempt failed.
    pub failed: BTreeSet<String>,

    /// Selection-parsing errors, independent of mount outcomes.
    pub input_errors: BTreeSet<String>,
}

impl OutcomeReport {
    /// True if there is nothing to display.
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
            && self.skipped.is_empty()
            && self.failed.is_empty()
            && self.input_errors.is_empty()
    }
}

#[derive(Debug, Default)]
struct OutcomeSets {
    mounted: BTreeSet<String>,
    skipped: BTreeSet<String>,
    failed: BTreeSet<String>,
    input_errors: BTreeSet<String>,
    claimed: BTreeSet<usize>,
}

/// Mutex-guarded classification sets owned by the orchestrator.
///
/// Also carries the claimed-index set used to guarantee that one index is
/// processed at most once per orchestration call even if submission paths
/// overlap.
#[derive(Debug, Default)]
pub struct OutcomeLog {
    inner: Mutex<OutcomeSets>,
}

impl OutcomeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful mount.
    pub fn record_mounted(&self, line: String) {
        self.inner.lock().mounted.insert(line);
    }

    /// Records an already-mounted skip.
    pub fn record_skipped(&self, line: String) {
        self.inner.lock().skipped.insert(line);
    }

    /// Records a terminal per-image failure.
    pub fn record_failed(&self, line: String) {
        self.inner.lock().failed.insert(line);
    }

    /// Records a selection-parsing error.
    pub fn record_input_error(&self, line: String) {
        self.inner.lock().input_errors.insert(line);
    }

    /// Claims `index` for processing. Returns false if it was already
    /// claimed in this call.
    pub fn claim(&self, index: usize) -> bool {
        self.inner.lock().claimed.insert(index)
    }

    /// Number of entries across the four classification sets.
    pub fn len(&self) -> usize {
        let sets = self.inner.lock();
        sets.mounted.len() + sets.skipped.len() + sets.failed.len() + sets.input_errors.len()
    }

    /// True if all four classification sets are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains everything into a report, clearing the log (including the
    /// claimed-index set) for the next orchestration call.
    pub fn take(&self) -> OutcomeReport {
        let mut sets = self.inner.lock();
        let report = OutcomeReport {
            mounted: std::mem::take(&mut sets.mounted),
            skipped: std::mem::take(&mut sets.skipped),
            failed: std::mem::take(&mut sets.failed),
            input_errors: std::mem::take(&mut sets.input_errors),
        };
        sets.claimed.clear();
        report
    }

    /// Records a disposition under the image's formatted result line.
    pub fn record(&self, disposition: MountDisposition, line: String) {
        match disposition {
            MountDisposition::Mounted { .. } => self.record_mounted(line),
            MountDisposition::Skipped => self.record_skipped(line),
            MountDisposition::Failed { .. } => self.record_failed(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_take() {
        let log = OutcomeLog::new();
        log.record_mounted("a mounted".to_string());
        log.record_skipped("b skipped".to_string());
        log.record_failed("c failed".to_string());
        log.record_input_error("invalid index '9'".to_string());

        assert_eq!(log.len(), 4);

        let report = log.take();
        assert_eq!(report.mounted.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.input_errors.contains("invalid index '9'"));

        // Taking clears the log.
        assert!(log.is_empty());
        assert!(log.take().is_empty());
    }

    #[test]
    fn test_sets_deduplicate() {
        let log = OutcomeLog::new();
        log.record_failed("same line".to_string());
        log.record_failed("same line".to_string());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_claim_is_once_per_call() {
        let log = OutcomeLog::new();
        assert!(log.claim(3));
        assert!(!log.claim(3));

        // A fresh call (after take) may claim the index again.
        log.take();
        assert!(log.claim(3));
    }

    #[test]
    fn test_claims_do_not_count_as_outcomes() {
        let log = OutcomeLog::new();
        log.claim(1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_record_dispatches_by_disposition() {
        let log = OutcomeLog::new();
        log.record(
            MountDisposition::Mounted { fstype: "iso9660" },
            "m".to_string(),
        );
        log.record(MountDisposition::Skipped, "s".to_string());
        log.record(
            MountDisposition::Failed {
                reason: "unsupported filesystem".to_string(),
            },
            "f".to_string(),
        );

        let report = log.take();
        assert!(report.mounted.contains("m"));
        assert!(report.skipped.contains("s"));
        assert!(report.failed.contains("f"));
    }
}
