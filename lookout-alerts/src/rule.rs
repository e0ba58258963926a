use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lookout_core::{RuleId, Symbol, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the threshold triggers the alert.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }

    /// True when `price` satisfies the trigger condition for `threshold`.
    pub fn crossed(self, price: Decimal, threshold: Decimal) -> bool {
        match self {
            Direction::Above => price >= threshold,
            Direction::Below => price <= threshold,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "above" => Ok(Direction::Above),
            "below" => Ok(Direction::Below),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Lifecycle state of an alert rule. `Fired` is terminal: a rule notifies
/// exactly once and is never re-armed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    Active,
    Fired,
    Removed,
}

impl RuleState {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleState::Active => "active",
            RuleState::Fired => "fired",
            RuleState::Removed => "removed",
        }
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RuleState::Active),
            "fired" => Ok(RuleState::Fired),
            "removed" => Ok(RuleState::Removed),
            other => Err(format!("unknown rule state: {other}")),
        }
    }
}

/// A user-owned price threshold watched by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: RuleId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub direction: Direction,
    pub threshold: Decimal,
    pub created_at: DateTime<Utc>,
    pub state: RuleState,
    /// Set when the rule transitions to `Fired`; used for retention pruning.
    pub fired_at: Option<DateTime<Utc>>,
}

impl AlertRule {
    pub fn new(
        id: RuleId,
        user_id: UserId,
        symbol: Symbol,
        direction: Direction,
        threshold: Decimal,
    ) -> Self {
        Self {
            id,
            user_id,
            symbol,
            direction,
            threshold,
            created_at: Utc::now(),
            state: RuleState::Active,
            fired_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == RuleState::Active
    }

    /// Transition to `Fired`, producing the event to deliver. Returns `None`
    /// for rules that are not active or whose condition is not met.
    pub fn try_fire(&mut self, observed_price: Decimal, at: DateTime<Utc>) -> Option<FiredAlert> {
        if !self.is_active() || !self.direction.crossed(observed_price, self.threshold) {
            return None;
        }
        self.state = RuleState::Fired;
        self.fired_at = Some(at);
        Some(FiredAlert {
            rule_id: self.id,
            user_id: self.user_id,
            symbol: self.symbol.clone(),
            direction: self.direction,
            threshold: self.threshold,
            observed_price,
            fired_at: at,
        })
    }
}

/// Ephemeral event produced when a rule's condition becomes true.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiredAlert {
    pub rule_id: RuleId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub direction: Direction,
    pub threshold: Decimal,
    pub observed_price: Decimal,
    pub fired_at: DateTime<Utc>,
}
