use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lookout_alerts::{AlertRepository, AlertRule, Direction, RuleState, StoreError, StoreResult};
use lookout_core::{RuleId, Symbol, UserId};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

const ALERT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS alert_rules (
    rule_id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    symbol TEXT NOT NULL,
    direction TEXT NOT NULL,
    threshold TEXT NOT NULL,
    created_at TEXT NOT NULL,
    state TEXT NOT NULL,
    fired_at TEXT
);
CREATE INDEX IF NOT EXISTS alert_idx_user
    ON alert_rules(user_id);
CREATE INDEX IF NOT EXISTS alert_idx_symbol_state
    ON alert_rules(symbol, state);
"#;

/// SQLite-backed rule repository used by durable deployments.
///
/// Decimal and timestamp columns are stored as TEXT so values survive the
/// round trip without precision loss.
#[derive(Clone, Debug)]
pub struct SqliteAlertRepository {
    path: PathBuf,
}

impl SqliteAlertRepository {
    pub fn new(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let repo = Self { path: path.into() };
        let conn = repo.connect()?;
        conn.execute_batch(ALERT_SCHEMA).map_err(db_err)?;
        Ok(repo)
    }

    fn connect(&self) -> StoreResult<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|err| StoreError::Storage(err.to_string()))?;
            }
        }
        let conn = Connection::open(&self.path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .map_err(db_err)?;
        Ok(conn)
    }

    fn load_where(&self, clause: &str, params: &[&dyn rusqlite::ToSql]) -> StoreResult<Vec<AlertRule>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT rule_id, user_id, symbol, direction, threshold, created_at, state, fired_at
             FROM alert_rules {clause} ORDER BY rule_id ASC"
        );
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let mut rows = stmt.query(params).map_err(db_err)?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            rules.push(row_to_rule(row)?);
        }
        Ok(rules)
    }
}

impl AlertRepository for SqliteAlertRepository {
    fn save(&self, rule: &AlertRule) -> StoreResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO alert_rules (
                rule_id, user_id, symbol, direction, threshold, created_at, state, fired_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                rule.id.0 as i64,
                rule.user_id.0,
                rule.symbol.as_str(),
                rule.direction.as_str(),
                rule.threshold.to_string(),
                rule.created_at.to_rfc3339(),
                rule.state.as_str(),
                rule.fired_at.map(|at| at.to_rfc3339()),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn load_user(&self, user_id: UserId) -> StoreResult<Vec<AlertRule>> {
        self.load_where("WHERE user_id = ?1", &[&user_id.0])
    }

    fn load_all(&self) -> StoreResult<Vec<AlertRule>> {
        self.load_where("", &[])
    }

    fn delete(&self, rule_id: RuleId) -> StoreResult<bool> {
        let conn = self.connect()?;
        let affected = conn
            .execute(
                "DELETE FROM alert_rules WHERE rule_id = ?1",
                params![rule_id.0 as i64],
            )
            .map_err(db_err)?;
        Ok(affected > 0)
    }

    fn latest_rule_id(&self) -> StoreResult<Option<u64>> {
        let conn = self.connect()?;
        let max: Option<Option<i64>> = conn
            .query_row("SELECT MAX(rule_id) FROM alert_rules", [], |row| {
                row.get::<_, Option<i64>>(0)
            })
            .optional()
            .map_err(db_err)?;
        Ok(max.flatten().map(|value| value as u64))
    }
}

fn db_err(err: rusqlite::Error) -> StoreError {
    StoreError::Storage(err.to_string())
}

fn row_to_rule(row: &rusqlite::Row<'_>) -> StoreResult<AlertRule> {
    let rule_id: i64 = row.get(0).map_err(db_err)?;
    let user_id: i64 = row.get(1).map_err(db_err)?;
    let symbol: String = row.get(2).map_err(db_err)?;
    let direction: String = row.get(3).map_err(db_err)?;
    let threshold: String = row.get(4).map_err(db_err)?;
    let created_at: String = row.get(5).map_err(db_err)?;
    let state: String = row.get(6).map_err(db_err)?;
    let fired_at: Option<String> = row.get(7).map_err(db_err)?;

    Ok(AlertRule {
        id: RuleId(rule_id as u64),
        user_id: UserId(user_id),
        symbol: Symbol::from(symbol.as_str()),
        direction: Direction::from_str(&direction).map_err(StoreError::Serialization)?,
        threshold: Decimal::from_str(&threshold)
            .map_err(|err| StoreError::Serialization(format!("invalid decimal {threshold}: {err}")))?,
        created_at: parse_timestamp(&created_at)?,
        state: RuleState::from_str(&state).map_err(StoreError::Serialization)?,
        fired_at: fired_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| StoreError::Serialization(format!("invalid timestamp {raw}: {err}")))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    use super::*;

    fn rule(id: u64, user: i64, symbol: &str) -> AlertRule {
        AlertRule::new(
            RuleId(id),
            UserId(user),
            Symbol::from(symbol),
            Direction::Above,
            dec!(110.5),
        )
    }

    #[test]
    fn rules_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("alerts.db");
        {
            let repo = SqliteAlertRepository::new(&db_path).unwrap();
            repo.save(&rule(1, 7, "BTC")).unwrap();
            repo.save(&rule(2, 7, "ETH")).unwrap();
            repo.save(&rule(3, 8, "BTC")).unwrap();
        }

        let repo = SqliteAlertRepository::new(&db_path).unwrap();
        let all = repo.load_all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].threshold, dec!(110.5));
        assert_eq!(repo.load_user(UserId(7)).unwrap().len(), 2);
        assert_eq!(repo.latest_rule_id().unwrap(), Some(3));
    }

    #[test]
    fn save_is_an_upsert() {
        let dir = tempdir().unwrap();
        let repo = SqliteAlertRepository::new(dir.path().join("alerts.db")).unwrap();
        let mut r = rule(1, 7, "BTC");
        repo.save(&r).unwrap();

        r.state = RuleState::Fired;
        r.fired_at = Some(Utc::now());
        repo.save(&r).unwrap();

        let all = repo.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].state, RuleState::Fired);
        assert!(all[0].fired_at.is_some());
    }

    #[test]
    fn delete_reports_whether_a_row_went() {
        let dir = tempdir().unwrap();
        let repo = SqliteAlertRepository::new(dir.path().join("alerts.db")).unwrap();
        repo.save(&rule(5, 7, "BTC")).unwrap();
        assert!(repo.delete(RuleId(5)).unwrap());
        assert!(!repo.delete(RuleId(5)).unwrap());
        assert_eq!(repo.latest_rule_id().unwrap(), None);
    }
}
