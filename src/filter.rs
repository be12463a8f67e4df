//! Filter/skip predicate.
//!
//! An optional user-configured rule {metric, comparison, threshold} that
//! vetoes placing a wager. The configured condition states the requirement
//! that must hold to *allow* wagering; failing it skips the bet.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Choice, Outcome, OutcomeField, WagerError};

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Threshold comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Comparator {
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Comparator {
    /// Whether `value` satisfies the comparison against `threshold`.
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Gt => value > threshold,
            Comparator::Lt => value < threshold,
            Comparator::Gte => value >= threshold,
            Comparator::Lte => value <= threshold,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Gt => write!(f, "GT"),
            Comparator::Lt => write!(f, "LT"),
            Comparator::Gte => write!(f, "GTE"),
            Comparator::Lte => write!(f, "LTE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter condition
// ---------------------------------------------------------------------------

/// User-configured guard that vetoes wagering unless a chosen metric
/// satisfies a threshold comparison. Immutable once constructed; the
/// persisted structural form uses the keys `by`, `where`, `value` and
/// round-trips exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub by: OutcomeField,
    #[serde(rename = "where")]
    pub comparator: Comparator,
    pub value: f64,
}

impl FilterCondition {
    pub fn new(by: OutcomeField, comparator: Comparator, value: f64) -> Self {
        Self {
            by,
            comparator,
            value,
        }
    }

    /// Evaluate the predicate against the current outcome records.
    ///
    /// Returns `(skip, compared_value)`: `skip` is `false` when the
    /// configured condition holds and `true` when it does not. The compared
    /// value is resolved as:
    /// - whole-event totals (`TOTAL_USERS`/`TOTAL_POINTS`): the sum of that
    ///   field across both outcomes;
    /// - decision-scoped metrics: the totals field of the chosen outcome;
    /// - anything else numeric: that field on the chosen outcome alone.
    ///
    /// Metrics scoped to the chosen outcome require `choice`; evaluating
    /// them before a decision is an error, as is filtering on a display
    /// field.
    pub fn should_skip(
        &self,
        outcomes: &[Outcome; 2],
        choice: Option<Choice>,
    ) -> Result<(bool, f64), WagerError> {
        let field = self.by.decision_alias();
        let compared = match self.by {
            OutcomeField::TotalUsers | OutcomeField::TotalPoints => {
                outcomes[0].metric(field)? + outcomes[1].metric(field)?
            }
            _ => {
                let choice = choice.ok_or(WagerError::DecisionRequired(self.by))?;
                outcomes[choice.index()].metric(field)?
            }
        };
        Ok((!self.comparator.holds(compared, self.value), compared))
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterCondition(By={}, Where={}, Value={})",
            self.by, self.comparator, self.value,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_outcomes() -> [Outcome; 2] {
        let mut outcomes = [Outcome::default(), Outcome::default()];
        outcomes[0].total_users = 10;
        outcomes[0].total_points = 1000;
        outcomes[0].top_points = 400;
        outcomes[1].total_users = 90;
        outcomes[1].total_points = 9000;
        outcomes[1].top_points = 2500;
        for outcome in &mut outcomes {
            outcome.recompute_derived(100, 10000);
        }
        outcomes
    }

    // -- Comparator tests --

    #[test]
    fn test_comparator_holds() {
        assert!(Comparator::Gt.holds(5.0, 4.0));
        assert!(!Comparator::Gt.holds(4.0, 4.0));
        assert!(Comparator::Lt.holds(3.0, 4.0));
        assert!(!Comparator::Lt.holds(4.0, 4.0));
        assert!(Comparator::Gte.holds(4.0, 4.0));
        assert!(!Comparator::Gte.holds(3.9, 4.0));
        assert!(Comparator::Lte.holds(4.0, 4.0));
        assert!(!Comparator::Lte.holds(4.1, 4.0));
    }

    #[test]
    fn test_comparator_serialization() {
        assert_eq!(serde_json::to_string(&Comparator::Gte).unwrap(), "\"GTE\"");
        let parsed: Comparator = serde_json::from_str("\"LT\"").unwrap();
        assert_eq!(parsed, Comparator::Lt);
        let bad: Result<Comparator, _> = serde_json::from_str("\"NEQ\"");
        assert!(bad.is_err());
    }

    // -- should_skip tests --

    #[test]
    fn test_event_totals_are_summed() {
        let outcomes = make_outcomes();
        // Total points across both outcomes = 10000; require > 5000 to bet.
        let filter =
            FilterCondition::new(OutcomeField::TotalPoints, Comparator::Gt, 5000.0);
        let (skip, compared) = filter.should_skip(&outcomes, None).unwrap();
        assert!(!skip);
        assert_eq!(compared, 10000.0);
    }

    #[test]
    fn test_condition_failing_vetoes_the_wager() {
        let outcomes = make_outcomes();
        // Require more than 200 total users; only 100 are in.
        let filter = FilterCondition::new(OutcomeField::TotalUsers, Comparator::Gt, 200.0);
        let (skip, compared) = filter.should_skip(&outcomes, None).unwrap();
        assert!(skip);
        assert_eq!(compared, 100.0);
    }

    #[test]
    fn test_decision_scoped_metric_uses_chosen_outcome() {
        let outcomes = make_outcomes();
        let filter =
            FilterCondition::new(OutcomeField::DecisionPoints, Comparator::Gte, 5000.0);

        // Outcome 1 carries 9000 points — condition holds.
        let (skip, compared) = filter.should_skip(&outcomes, Some(Choice::B)).unwrap();
        assert!(!skip);
        assert_eq!(compared, 9000.0);

        // Outcome 0 carries only 1000 — condition fails, skip.
        let (skip, compared) = filter.should_skip(&outcomes, Some(Choice::A)).unwrap();
        assert!(skip);
        assert_eq!(compared, 1000.0);
    }

    #[test]
    fn test_per_outcome_metric_uses_chosen_outcome() {
        let outcomes = make_outcomes();
        // Only bet when the chosen outcome's odds reach 2.0.
        let filter = FilterCondition::new(OutcomeField::Odds, Comparator::Gte, 2.0);
        let (skip, compared) = filter.should_skip(&outcomes, Some(Choice::A)).unwrap();
        assert!(!skip);
        assert_eq!(compared, 10.0);

        let (skip, _) = filter.should_skip(&outcomes, Some(Choice::B)).unwrap();
        assert!(skip);
    }

    #[test]
    fn test_decision_scoped_metric_without_decision_is_error() {
        let outcomes = make_outcomes();
        let filter =
            FilterCondition::new(OutcomeField::DecisionUsers, Comparator::Gt, 10.0);
        let err = filter.should_skip(&outcomes, None).unwrap_err();
        assert!(matches!(
            err,
            WagerError::DecisionRequired(OutcomeField::DecisionUsers)
        ));
    }

    #[test]
    fn test_display_field_is_not_a_metric() {
        let outcomes = make_outcomes();
        let filter = FilterCondition::new(OutcomeField::Color, Comparator::Gt, 0.0);
        let err = filter.should_skip(&outcomes, Some(Choice::A)).unwrap_err();
        assert!(matches!(err, WagerError::NonNumericMetric(_)));
    }

    // -- structural form tests --

    #[test]
    fn test_structural_roundtrip() {
        for comparator in [
            Comparator::Gt,
            Comparator::Lt,
            Comparator::Gte,
            Comparator::Lte,
        ] {
            for field in OutcomeField::ALL {
                let filter = FilterCondition::new(*field, comparator, 2000.0);
                let json = serde_json::to_string(&filter).unwrap();
                let parsed: FilterCondition = serde_json::from_str(&json).unwrap();
                assert_eq!(parsed, filter);
            }
        }
    }

    #[test]
    fn test_structural_key_names_are_stable() {
        let filter =
            FilterCondition::new(OutcomeField::TotalUsers, Comparator::Gte, 2000.0);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "by": "TOTAL_USERS", "where": "GTE", "value": 2000.0 })
        );
    }

    #[test]
    fn test_unknown_field_name_is_error() {
        let result: Result<FilterCondition, _> = serde_json::from_value(serde_json::json!({
            "by": "TOTAL_VIEWERS",
            "where": "GT",
            "value": 1.0,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_display() {
        let filter =
            FilterCondition::new(OutcomeField::TotalUsers, Comparator::Gt, 2000.0);
        assert_eq!(
            format!("{filter}"),
            "FilterCondition(By=TOTAL_USERS, Where=GT, Value=2000)"
        );
    }
}
