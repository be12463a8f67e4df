//! Wager settings: one immutable instance per event.
//!
//! The persisted structural form uses the keys `strategy`, `percentage`,
//! `percentage_gap`, `max_points`, `stealth_mode`, `filter_condition`.
//! Defaults apply only to genuinely-absent fields — an explicit
//! `stealth_mode = false` is preserved as configured, never overwritten.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;

use crate::filter::FilterCondition;
use crate::strategy::Strategy;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Per-event wager settings. The engine only reads these; it never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetSettings {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    /// Stake as a percentage of the account balance.
    #[serde(default = "default_percentage")]
    pub percentage: u32,
    /// Crowd-balance gap below which the Smart strategy follows the odds.
    #[serde(default = "default_percentage_gap")]
    pub percentage_gap: u32,
    /// Hard cap on the stake, in points.
    #[serde(default = "default_max_points")]
    pub max_points: u64,
    /// Keep the stake strictly below the largest single stake observed.
    #[serde(default)]
    pub stealth_mode: bool,
    #[serde(default)]
    pub filter_condition: Option<FilterCondition>,
}

fn default_strategy() -> Strategy {
    Strategy::Smart
}

fn default_percentage() -> u32 {
    5
}

fn default_percentage_gap() -> u32 {
    20
}

fn default_max_points() -> u64 {
    50000
}

impl Default for BetSettings {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            percentage: default_percentage(),
            percentage_gap: default_percentage_gap(),
            max_points: default_max_points(),
            stealth_mode: false,
            filter_condition: None,
        }
    }
}

impl BetSettings {
    /// Load settings from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {path}"))?;
        let settings: BetSettings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {path}"))?;
        Ok(settings)
    }
}

impl fmt::Display for BetSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BetSettings(Strategy={}, Percentage={}, PercentageGap={}, MaxPoints={}, StealthMode={})",
            self.strategy,
            self.percentage,
            self.percentage_gap,
            self.max_points,
            self.stealth_mode,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
