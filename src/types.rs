//! Shared types for the PUNTER decision core.
//!
//! These types form the data model used across all modules: the outcome
//! field registry, the per-outcome aggregate record, inbound snapshots,
//! and the decision handed back to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome field registry
// ---------------------------------------------------------------------------

/// Identifier for each attribute an outcome record can expose.
///
/// Two groups exist: fields taken verbatim from a snapshot
/// (`TotalUsers`, `TotalPoints`, the display fields) and fields that only
/// exist after aggregate computation (`PercentageUsers`, `Odds`,
/// `OddsPercentage`, `TopPoints`) — the latter default to zero until the
/// first ingest computes them.
///
/// `DecisionUsers` and `DecisionPoints` never exist on a record; they are
/// aliases of the totals fields resolved against the chosen outcome of a
/// decision (see [`OutcomeField::decision_alias`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeField {
    TotalUsers,
    TotalPoints,
    PercentageUsers,
    Odds,
    OddsPercentage,
    TopPoints,
    DecisionUsers,
    DecisionPoints,
    Title,
    Color,
    Id,
}

impl OutcomeField {
    /// All known fields (useful for iteration).
    pub const ALL: &'static [OutcomeField] = &[
        OutcomeField::TotalUsers,
        OutcomeField::TotalPoints,
        OutcomeField::PercentageUsers,
        OutcomeField::Odds,
        OutcomeField::OddsPercentage,
        OutcomeField::TopPoints,
        OutcomeField::DecisionUsers,
        OutcomeField::DecisionPoints,
        OutcomeField::Title,
        OutcomeField::Color,
        OutcomeField::Id,
    ];

    /// Canonical name, as used in persisted filter configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeField::TotalUsers => "TOTAL_USERS",
            OutcomeField::TotalPoints => "TOTAL_POINTS",
            OutcomeField::PercentageUsers => "PERCENTAGE_USERS",
            OutcomeField::Odds => "ODDS",
            OutcomeField::OddsPercentage => "ODDS_PERCENTAGE",
            OutcomeField::TopPoints => "TOP_POINTS",
            OutcomeField::DecisionUsers => "DECISION_USERS",
            OutcomeField::DecisionPoints => "DECISION_POINTS",
            OutcomeField::Title => "TITLE",
            OutcomeField::Color => "COLOR",
            OutcomeField::Id => "ID",
        }
    }

    /// Whether the field only exists after aggregate computation.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            OutcomeField::PercentageUsers
                | OutcomeField::Odds
                | OutcomeField::OddsPercentage
                | OutcomeField::TopPoints
        )
    }

    /// Resolve decision-scoped fields to the totals field they alias.
    /// All other fields map to themselves.
    pub fn decision_alias(&self) -> OutcomeField {
        match self {
            OutcomeField::DecisionUsers => OutcomeField::TotalUsers,
            OutcomeField::DecisionPoints => OutcomeField::TotalPoints,
            other => *other,
        }
    }
}

impl fmt::Display for OutcomeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reverse lookup: parse a canonical field name back to its identifier.
/// Unknown names are a structural error (malformed persisted configuration).
impl std::str::FromStr for OutcomeField {
    type Err = WagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutcomeField::ALL
            .iter()
            .find(|field| field.as_str() == s)
            .copied()
            .ok_or_else(|| WagerError::UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Choice
// ---------------------------------------------------------------------------

/// Which of the two outcomes to back: `A` is outcome 0, `B` is outcome 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
}

impl Choice {
    /// Index of the chosen outcome slot.
    pub fn index(&self) -> usize {
        match self {
            Choice::A => 0,
            Choice::B => 1,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::A => write!(f, "A"),
            Choice::B => write!(f, "B"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots (inbound)
// ---------------------------------------------------------------------------

/// A single stake observed on an outcome, as reported upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeEntry {
    pub points: u64,
}

/// Raw per-outcome snapshot supplied by the event-polling collaborator.
///
/// Raw totals are required; a payload missing them fails deserialization.
/// Everything else is optional, and unknown upstream keys are discarded by
/// the typed projection into [`Outcome`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeSnapshot {
    pub total_users: u64,
    pub total_points: u64,
    #[serde(default)]
    pub top_predictors: Vec<StakeEntry>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub id: String,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Aggregate record for one of the two outcomes of a wagering event.
///
/// Exactly two instances exist per event, index-addressed 0/1, mutated in
/// place on every ingest. No history is retained beyond the latest snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outcome {
    pub total_users: u64,
    pub total_points: u64,
    pub percentage_users: f64,
    pub odds: f64,
    pub odds_percentage: f64,
    /// Largest single stake observed on this outcome.
    pub top_points: u64,
    pub title: String,
    pub color: String,
    pub id: String,
}

impl Outcome {
    /// Project a snapshot down to the fixed field whitelist. Derived
    /// aggregates start at zero until the first ingest computes them.
    pub fn from_snapshot(snapshot: &OutcomeSnapshot) -> Self {
        Outcome {
            total_users: snapshot.total_users,
            total_points: snapshot.total_points,
            title: snapshot.title.clone(),
            color: snapshot.color.clone(),
            id: snapshot.id.clone(),
            ..Outcome::default()
        }
    }

    /// Resolve a field to its numeric value on this record for filter
    /// evaluation. Decision-scoped fields resolve to the totals they alias;
    /// display fields have no numeric value.
    pub fn metric(&self, field: OutcomeField) -> Result<f64, WagerError> {
        match field {
            OutcomeField::TotalUsers | OutcomeField::DecisionUsers => Ok(self.total_users as f64),
            OutcomeField::TotalPoints | OutcomeField::DecisionPoints => {
                Ok(self.total_points as f64)
            }
            OutcomeField::PercentageUsers => Ok(self.percentage_users),
            OutcomeField::Odds => Ok(self.odds),
            OutcomeField::OddsPercentage => Ok(self.odds_percentage),
            OutcomeField::TopPoints => Ok(self.top_points as f64),
            OutcomeField::Title | OutcomeField::Color | OutcomeField::Id => {
                Err(WagerError::NonNumericMetric(field))
            }
        }
    }

    /// Recompute the derived aggregates from this record's raw totals and
    /// the event-wide sums. Callers must uphold `event_users > 0` and
    /// `self.total_points > 0`; the engine guards this before calling.
    ///
    /// Invariants afterwards: `odds * total_points ≈ event_points` and
    /// `odds_percentage ≈ 100 / odds`, within 2-decimal rounding.
    pub(crate) fn recompute_derived(&mut self, event_users: u64, event_points: u64) {
        self.percentage_users = round2(100.0 * self.total_users as f64 / event_users as f64);
        self.odds = round2(event_points as f64 / self.total_points as f64);
        self.odds_percentage = round2(100.0 / self.odds);
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}), Points: {}, Users: {} ({}%), Odds: {} ({}%)",
            self.title,
            self.color,
            compact(self.total_points),
            compact(self.total_users),
            self.percentage_users,
            self.odds,
            self.odds_percentage,
        )
    }
}

// ---------------------------------------------------------------------------
// Decision (outbound)
// ---------------------------------------------------------------------------

/// The engine's output: which outcome to back and how many points to stake.
/// Fully recomputed on every `calculate` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub choice: Option<Choice>,
    pub amount: u64,
    pub outcome_id: Option<String>,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.choice {
            Some(choice) => write!(
                f,
                "Choice={}, Amount={}, Id={}",
                choice,
                compact(self.amount),
                self.outcome_id.as_deref().unwrap_or("?"),
            ),
            None => write!(f, "No wager"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Domain-specific error types for PUNTER.
#[derive(Debug, thiserror::Error)]
pub enum WagerError {
    #[error("Unknown outcome field: {0}")]
    UnknownField(String),

    #[error("Field {0} has no numeric value")]
    NonNumericMetric(OutcomeField),

    #[error("Filter on {0} requires a computed decision")]
    DecisionRequired(OutcomeField),
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to two decimals, matching how the upstream UI reports aggregates.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compact magnitude formatting for large point/user counts: `999`,
/// `12.5k`, `1.2M`, `3B`.
pub fn compact(n: u64) -> String {
    const SCALES: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "k")];
    for (scale, suffix) in SCALES {
        if n as f64 >= scale {
            let scaled = format!("{:.1}", n as f64 / scale);
            let trimmed = scaled.strip_suffix(".0").unwrap_or(&scaled).to_string();
            return format!("{trimmed}{suffix}");
        }
    }
    n.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
