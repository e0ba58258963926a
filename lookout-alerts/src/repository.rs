use lookout_core::{RuleId, UserId};

use crate::{AlertRule, StoreResult};

/// Abstraction over durable alert-rule storage.
///
/// The book treats `save` and `delete` as durable: a mutation only reports
/// success to the user after the backend has acknowledged the write.
pub trait AlertRepository: Send + Sync {
    /// Insert or replace a rule keyed by its id.
    fn save(&self, rule: &AlertRule) -> StoreResult<()>;

    /// All rules owned by `user_id`, ascending by rule id.
    fn load_user(&self, user_id: UserId) -> StoreResult<Vec<AlertRule>>;

    /// Every persisted rule, ascending by rule id.
    fn load_all(&self) -> StoreResult<Vec<AlertRule>>;

    /// Remove a rule; `false` when no such rule exists.
    fn delete(&self, rule_id: RuleId) -> StoreResult<bool>;

    /// Highest rule id ever persisted, used to bootstrap the sequencer.
    fn latest_rule_id(&self) -> StoreResult<Option<u64>>;
}
