use std::sync::atomic::{AtomicU64, Ordering};

use lookout_core::RuleId;

use crate::{AlertRepository, StoreResult};

/// Atomic counter assigning monotonically increasing rule ids.
#[derive(Debug)]
pub struct RuleSequencer {
    counter: AtomicU64,
}

impl RuleSequencer {
    /// Create a sequencer that continues after `last_id`.
    pub fn new(last_id: u64) -> Self {
        Self {
            counter: AtomicU64::new(last_id),
        }
    }

    /// Resume from the highest id the repository has persisted.
    pub fn bootstrap(repo: &dyn AlertRepository) -> StoreResult<Self> {
        let last = repo.latest_rule_id()?.unwrap_or(0);
        Ok(Self::new(last))
    }

    /// Next unused rule id.
    pub fn next(&self) -> RuleId {
        RuleId(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
