use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use lookout_core::{RuleId, Symbol, UserId};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::{
    AlertError, AlertRepository, AlertResult, AlertRule, Direction, FiredAlert, RuleSequencer,
    RuleState,
};

/// Registry owning every alert rule, backed by durable storage.
///
/// All mutations funnel through one mutex, giving the single-writer
/// discipline rule updates need; evaluation for one symbol only ever touches
/// that symbol's rules. The `BTreeMap` keeps rules ordered by id so
/// evaluation and listing are deterministic.
pub struct AlertBook {
    repo: Arc<dyn AlertRepository>,
    sequencer: RuleSequencer,
    rules: Mutex<BTreeMap<RuleId, AlertRule>>,
}

impl AlertBook {
    /// Load persisted rules and resume the id sequence after them.
    pub fn open(repo: Arc<dyn AlertRepository>) -> AlertResult<Self> {
        let sequencer = RuleSequencer::bootstrap(repo.as_ref())?;
        let rules = repo
            .load_all()?
            .into_iter()
            .map(|rule| (rule.id, rule))
            .collect();
        Ok(Self {
            repo,
            sequencer,
            rules: Mutex::new(rules),
        })
    }

    /// Create a rule; the write is durable before the id is returned.
    pub fn create(
        &self,
        user_id: UserId,
        symbol: Symbol,
        direction: Direction,
        threshold: Decimal,
    ) -> AlertResult<RuleId> {
        if threshold <= Decimal::ZERO {
            return Err(AlertError::InvalidThreshold(threshold));
        }
        let mut rules = self.rules.lock();
        let id = self.sequencer.next();
        let rule = AlertRule::new(id, user_id, symbol, direction, threshold);
        self.repo.save(&rule)?;
        rules.insert(id, rule);
        debug!(rule_id = %id, user = %user_id, "alert rule created");
        Ok(id)
    }

    /// Rules owned by `user_id`, ascending by id.
    pub fn list(&self, user_id: UserId) -> Vec<AlertRule> {
        self.rules
            .lock()
            .values()
            .filter(|rule| rule.user_id == user_id && rule.state != RuleState::Removed)
            .cloned()
            .collect()
    }

    /// Remove a rule owned by `user_id`; `false` when absent or not owned.
    /// The delete is durable before success is reported.
    pub fn remove(&self, user_id: UserId, rule_id: RuleId) -> AlertResult<bool> {
        let mut rules = self.rules.lock();
        match rules.get(&rule_id) {
            Some(rule) if rule.user_id == user_id => {}
            _ => return Ok(false),
        }
        self.repo.delete(rule_id)?;
        rules.remove(&rule_id);
        debug!(rule_id = %rule_id, user = %user_id, "alert rule removed");
        Ok(true)
    }

    /// Evaluate every active rule for `symbol` against the latest price.
    ///
    /// Returns newly fired alerts in ascending rule-id order and transitions
    /// each fired rule. Idempotent: re-evaluating the same price fires
    /// nothing, because fired rules are no longer active. A persistence
    /// failure for one rule is logged and does not affect the others.
    pub fn evaluate(&self, symbol: &Symbol, latest_price: Decimal) -> Vec<FiredAlert> {
        let now = Utc::now();
        let mut rules = self.rules.lock();
        let mut fired = Vec::new();
        for rule in rules.values_mut() {
            if rule.symbol != *symbol {
                continue;
            }
            if let Some(alert) = rule.try_fire(latest_price, now) {
                if let Err(err) = self.repo.save(rule) {
                    warn!(rule_id = %rule.id, error = %err, "failed to persist fired state");
                }
                fired.push(alert);
            }
        }
        fired
    }

    /// Drop fired rules older than `retention`, returning how many went.
    pub fn prune_fired(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut rules = self.rules.lock();
        let stale: Vec<RuleId> = rules
            .values()
            .filter(|rule| {
                rule.state == RuleState::Fired
                    && rule.fired_at.map(|at| at < cutoff).unwrap_or(false)
            })
            .map(|rule| rule.id)
            .collect();
        for id in &stale {
            if let Err(err) = self.repo.delete(*id) {
                warn!(rule_id = %id, error = %err, "failed to prune fired rule");
                continue;
            }
            rules.remove(id);
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::RwLock;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    use super::*;
    use crate::StoreResult;

    /// Minimal in-process repository; the real backends live in lookout-store.
    #[derive(Default)]
    struct FakeRepo {
        rows: RwLock<HashMap<RuleId, AlertRule>>,
    }

    impl AlertRepository for FakeRepo {
        fn save(&self, rule: &AlertRule) -> StoreResult<()> {
            self.rows.write().insert(rule.id, rule.clone());
            Ok(())
        }

        fn load_user(&self, user_id: UserId) -> StoreResult<Vec<AlertRule>> {
            let mut rules: Vec<_> = self
                .rows
                .read()
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            rules.sort_by_key(|r| r.id);
            Ok(rules)
        }

        fn load_all(&self) -> StoreResult<Vec<AlertRule>> {
            let mut rules: Vec<_> = self.rows.read().values().cloned().collect();
            rules.sort_by_key(|r| r.id);
            Ok(rules)
        }

        fn delete(&self, rule_id: RuleId) -> StoreResult<bool> {
            Ok(self.rows.write().remove(&rule_id).is_some())
        }

        fn latest_rule_id(&self) -> StoreResult<Option<u64>> {
            Ok(self.rows.read().keys().map(|id| id.0).max())
        }
    }

    fn book() -> AlertBook {
        AlertBook::open(Arc::new(FakeRepo::default())).unwrap()
    }

    #[test]
    fn create_assigns_ascending_ids_and_persists() {
        let book = book();
        let a = book
            .create(UserId(1), "BTC".into(), Direction::Above, dec!(110))
            .unwrap();
        let b = book
            .create(UserId(1), "ETH".into(), Direction::Below, dec!(90))
            .unwrap();
        assert!(b > a);
        assert_eq!(book.list(UserId(1)).len(), 2);
        assert!(book.list(UserId(2)).is_empty());
    }

    #[test]
    fn rejects_non_positive_thresholds() {
        let book = book();
        assert!(matches!(
            book.create(UserId(1), "BTC".into(), Direction::Above, dec!(0)),
            Err(AlertError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn fires_once_and_never_again() {
        let book = book();
        let id = book
            .create(UserId(1), "BTC".into(), Direction::Above, dec!(110))
            .unwrap();

        let fired = book.evaluate(&Symbol::from("BTC"), dec!(112));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].rule_id, id);
        assert_eq!(fired[0].observed_price, dec!(112));

        // Higher price, same rule: nothing new fires.
        assert!(book.evaluate(&Symbol::from("BTC"), dec!(115)).is_empty());
        // Re-running the same price is idempotent too.
        assert!(book.evaluate(&Symbol::from("BTC"), dec!(112)).is_empty());
    }

    #[test]
    fn evaluation_is_scoped_to_one_symbol() {
        let book = book();
        book.create(UserId(1), "BTC".into(), Direction::Above, dec!(100))
            .unwrap();
        book.create(UserId(1), "ETH".into(), Direction::Above, dec!(100))
            .unwrap();

        let fired = book.evaluate(&Symbol::from("BTC"), dec!(150));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].symbol, Symbol::from("BTC"));

        let eth_rules = book.list(UserId(1));
        let eth = eth_rules
            .iter()
            .find(|r| r.symbol == Symbol::from("ETH"))
            .unwrap();
        assert_eq!(eth.state, RuleState::Active);
    }

    #[test]
    fn fired_alerts_come_out_in_rule_id_order() {
        let book = book();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(
                book.create(UserId(1), "BTC".into(), Direction::Above, dec!(100))
                    .unwrap(),
            );
        }
        let fired = book.evaluate(&Symbol::from("BTC"), dec!(120));
        let fired_ids: Vec<_> = fired.iter().map(|a| a.rule_id).collect();
        assert_eq!(fired_ids, ids);
    }

    #[test]
    fn remove_respects_ownership() {
        let book = book();
        let id = book
            .create(UserId(1), "BTC".into(), Direction::Below, dec!(90))
            .unwrap();
        assert!(!book.remove(UserId(2), id).unwrap());
        assert!(book.remove(UserId(1), id).unwrap());
        assert!(!book.remove(UserId(1), id).unwrap());
        assert!(book.evaluate(&Symbol::from("BTC"), dec!(10)).is_empty());
    }

    #[test]
    fn reopening_resumes_the_id_sequence() {
        let repo = Arc::new(FakeRepo::default());
        let first = AlertBook::open(repo.clone()).unwrap();
        let a = first
            .create(UserId(1), "BTC".into(), Direction::Above, dec!(100))
            .unwrap();
        drop(first);

        let second = AlertBook::open(repo).unwrap();
        let b = second
            .create(UserId(1), "BTC".into(), Direction::Above, dec!(200))
            .unwrap();
        assert!(b > a);
        assert_eq!(second.list(UserId(1)).len(), 2);
    }

    #[test]
    fn prune_drops_only_stale_fired_rules() {
        let book = book();
        book.create(UserId(1), "BTC".into(), Direction::Above, dec!(100))
            .unwrap();
        book.create(UserId(1), "BTC".into(), Direction::Above, dec!(999_999))
            .unwrap();
        book.evaluate(&Symbol::from("BTC"), dec!(150));

        // Freshly fired: retained under a 24 h retention window.
        assert_eq!(book.prune_fired(Duration::hours(24)), 0);
        // Zero retention: the fired rule goes, the active one stays.
        assert_eq!(book.prune_fired(Duration::zero()), 1);
        assert_eq!(book.list(UserId(1)).len(), 1);
    }
}
