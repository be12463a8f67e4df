//! Wager strategies — the rules that pick which outcome to back.
//!
//! Every rule compares a single aggregate across the two outcome slots;
//! the `Smart` rule switches between two of them based on how lopsided
//! the crowd is.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::types::{Choice, Outcome};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Decision strategy for a wagering event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Back the outcome with the most users.
    MostVoted,
    /// Back the outcome with the larger odds.
    HighOdds,
    /// Back the outcome with the larger implied probability.
    Percentage,
    /// Follow the odds when the crowd is balanced, the crowd otherwise.
    Smart,
}

impl Strategy {
    /// All known strategies (useful for iteration).
    pub const ALL: &'static [Strategy] = &[
        Strategy::MostVoted,
        Strategy::HighOdds,
        Strategy::Percentage,
        Strategy::Smart,
    ];

    /// Pick the outcome to back given the current aggregates.
    ///
    /// Tie-break for every rule: outcome 0 wins all non-strict comparisons,
    /// so `B` is chosen only when outcome 1's metric is strictly greater.
    pub fn choose(&self, outcomes: &[Outcome; 2], percentage_gap: u32) -> Choice {
        match self {
            Strategy::MostVoted => pick(outcomes, |o| o.total_users as f64),
            Strategy::HighOdds => pick(outcomes, |o| o.odds),
            Strategy::Percentage => pick(outcomes, |o| o.odds_percentage),
            Strategy::Smart => {
                let gap = (outcomes[0].percentage_users - outcomes[1].percentage_users).abs();
                if gap < percentage_gap as f64 {
                    debug!(gap, percentage_gap, "Crowd balanced, following the odds");
                    pick(outcomes, |o| o.odds)
                } else {
                    debug!(gap, percentage_gap, "Crowd lopsided, following the crowd");
                    pick(outcomes, |o| o.total_users as f64)
                }
            }
        }
    }
}

/// Choose by a single metric. Outcome 0 wins unless outcome 1's value is
/// strictly greater.
fn pick(outcomes: &[Outcome; 2], metric: impl Fn(&Outcome) -> f64) -> Choice {
    if metric(&outcomes[1]) > metric(&outcomes[0]) {
        Choice::B
    } else {
        Choice::A
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::MostVoted => write!(f, "MOST_VOTED"),
            Strategy::HighOdds => write!(f, "HIGH_ODDS"),
            Strategy::Percentage => write!(f, "PERCENTAGE"),
            Strategy::Smart => write!(f, "SMART"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
