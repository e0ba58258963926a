use std::collections::BTreeMap;

use lookout_alerts::{AlertRepository, AlertRule, StoreResult};
use lookout_core::{RuleId, UserId};
use parking_lot::RwLock;

/// Volatile repository for tests and runs without a database path.
#[derive(Debug, Default)]
pub struct MemoryAlertRepository {
    rows: RwLock<BTreeMap<RuleId, AlertRule>>,
}

impl AlertRepository for MemoryAlertRepository {
    fn save(&self, rule: &AlertRule) -> StoreResult<()> {
        self.rows.write().insert(rule.id, rule.clone());
        Ok(())
    }

    fn load_user(&self, user_id: UserId) -> StoreResult<Vec<AlertRule>> {
        Ok(self
            .rows
            .read()
            .values()
            .filter(|rule| rule.user_id == user_id)
            .cloned()
            .collect())
    }

    fn load_all(&self) -> StoreResult<Vec<AlertRule>> {
        Ok(self.rows.read().values().cloned().collect())
    }

    fn delete(&self, rule_id: RuleId) -> StoreResult<bool> {
        Ok(self.rows.write().remove(&rule_id).is_some())
    }

    fn latest_rule_id(&self) -> StoreResult<Option<u64>> {
        Ok(self.rows.read().keys().next_back().map(|id| id.0))
    }
}
