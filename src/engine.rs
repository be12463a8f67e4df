//! Wager engine.
//!
//! Holds the two outcome records and the settings for one wagering event;
//! ingests snapshots, maintains derived aggregates, and produces the final
//! decision. One engine instance per live event, exclusively owned by
//! whichever task is polling that event — no internal concurrency.

use rand::Rng;
use std::fmt;
use tracing::debug;

use crate::config::BetSettings;
use crate::types::{compact, Decision, Outcome, OutcomeSnapshot, WagerError};

// ---------------------------------------------------------------------------
// Stealth jitter
// ---------------------------------------------------------------------------

/// Source of the stealth-mode stake reduction, drawn uniformly from
/// `[1, 5)`. Injected so tests can supply a deterministic value.
pub trait StealthJitter {
    fn draw(&mut self) -> f64;
}

/// Default jitter backed by the thread-local RNG.
pub struct RandomJitter;

impl StealthJitter for RandomJitter {
    fn draw(&mut self) -> f64 {
        rand::thread_rng().gen_range(1.0..5.0)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Decision engine for one binary-outcome wagering event.
pub struct WagerEngine {
    outcomes: [Outcome; 2],
    decision: Decision,
    total_users: u64,
    total_points: u64,
    settings: BetSettings,
    jitter: Box<dyn StealthJitter>,
    ingested: bool,
}

impl WagerEngine {
    /// Build an engine from the event's initial outcome pair. Event-wide
    /// totals and derived aggregates stay at zero until the first ingest.
    pub fn new(outcomes: &[OutcomeSnapshot; 2], settings: BetSettings) -> Self {
        Self::with_jitter(outcomes, settings, Box::new(RandomJitter))
    }

    /// Build an engine with an injected stealth jitter source.
    pub fn with_jitter(
        outcomes: &[OutcomeSnapshot; 2],
        settings: BetSettings,
        jitter: Box<dyn StealthJitter>,
    ) -> Self {
        Self {
            outcomes: [
                Outcome::from_snapshot(&outcomes[0]),
                Outcome::from_snapshot(&outcomes[1]),
            ],
            decision: Decision::default(),
            total_users: 0,
            total_points: 0,
            settings,
            jitter,
            ingested: false,
        }
    }

    /// The two outcome records, index-addressed 0/1.
    pub fn outcomes(&self) -> &[Outcome; 2] {
        &self.outcomes
    }

    /// The most recently computed decision.
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn settings(&self) -> &BetSettings {
        &self.settings
    }

    /// Event-wide user count (sum across both outcomes).
    pub fn total_users(&self) -> u64 {
        self.total_users
    }

    /// Event-wide points staked (sum across both outcomes).
    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    /// Ingest a fresh pair of outcome snapshots, in arrival order.
    ///
    /// Raw totals are overwritten; a non-empty stake list updates the
    /// outcome's top stake; derived aggregates are recomputed from the
    /// latest raw totals only when the event has users and both sides have
    /// points — otherwise they retain their previous values.
    pub fn update_outcomes(&mut self, snapshots: &[OutcomeSnapshot; 2]) {
        for (outcome, snapshot) in self.outcomes.iter_mut().zip(snapshots) {
            outcome.total_users = snapshot.total_users;
            outcome.total_points = snapshot.total_points;
            if let Some(top) = snapshot.top_predictors.iter().map(|s| s.points).max() {
                outcome.top_points = top;
            }
        }

        self.total_users = self.outcomes[0].total_users + self.outcomes[1].total_users;
        self.total_points = self.outcomes[0].total_points + self.outcomes[1].total_points;

        if self.total_users > 0
            && self.outcomes[0].total_points > 0
            && self.outcomes[1].total_points > 0
        {
            let (event_users, event_points) = (self.total_users, self.total_points);
            for outcome in &mut self.outcomes {
                outcome.recompute_derived(event_users, event_points);
            }
            debug!(
                total_users = self.total_users,
                total_points = self.total_points,
                odds_0 = self.outcomes[0].odds,
                odds_1 = self.outcomes[1].odds,
                "Aggregates recomputed"
            );
        }

        self.ingested = true;
    }

    /// Check the configured filter condition against the current state.
    ///
    /// Returns `(skip, compared_value)`; with no filter configured the
    /// wager is never vetoed and the compared value is zero.
    pub fn skip(&self) -> Result<(bool, f64), WagerError> {
        match &self.settings.filter_condition {
            Some(filter) => {
                let (skip, compared) = filter.should_skip(&self.outcomes, self.decision.choice)?;
                if skip {
                    debug!(filter = %filter, compared, "Wager vetoed by filter condition");
                }
                Ok((skip, compared))
            }
            None => Ok((false, 0.0)),
        }
    }

    /// Compute the decision for the current outcome state and balance.
    ///
    /// The decision is reset and fully re-derived on every call. Before the
    /// first ingest the choice is still deterministic (tie-break applies to
    /// the zero-initialized totals) but no points are staked.
    pub fn calculate(&mut self, balance: u64) -> Decision {
        self.decision = Decision::default();

        let choice = self
            .settings
            .strategy
            .choose(&self.outcomes, self.settings.percentage_gap);
        let index = choice.index();
        self.decision.choice = Some(choice);
        self.decision.outcome_id = Some(self.outcomes[index].id.clone());

        if self.ingested {
            let staked = (balance.saturating_mul(self.settings.percentage as u64) / 100)
                .min(self.settings.max_points);
            self.decision.amount = self.apply_stealth(staked, self.outcomes[index].top_points);
        }

        debug!(
            strategy = %self.settings.strategy,
            choice = %choice,
            amount = self.decision.amount,
            "Decision computed"
        );
        self.decision.clone()
    }

    /// Stealth sizing: keep the stake strictly below the largest single
    /// stake observed on the chosen outcome, clamped at zero.
    fn apply_stealth(&mut self, amount: u64, top_points: u64) -> u64 {
        if !self.settings.stealth_mode || amount < top_points {
            return amount;
        }
        let reduction = self.jitter.draw();
        let reduced = (top_points as f64 - reduction).floor().max(0.0) as u64;
        debug!(
            amount,
            top_points, reduction, reduced, "Stealth mode reduced the stake"
        );
        reduced
    }
}

impl fmt::Display for WagerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WagerEngine(TotalUsers={}, TotalPoints={}, Decision={})\n\t\tOutcome0({})\n\t\tOutcome1({})",
            compact(self.total_users),
            compact(self.total_points),
            self.decision,
            self.outcomes[0],
            self.outcomes[1],
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
