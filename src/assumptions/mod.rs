//! Planning assumptions shared by every analytics module
//!
//! All rule-of-thumb constants (assumed returns, the 4% rule, the 10x income
//! target, contribution limits) live here so they can be overridden from a
//! JSON file without touching the calculations.

mod limits;

pub use limits::{ContributionLimits, LimitSummary};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default path for an assumptions override file
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions.json";

/// Container for all planning assumptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningAssumptions {
    /// Fallback annual return when the member has no stated rate
    pub default_return: f64,

    /// Spread applied for optimistic / pessimistic scenario variants
    pub scenario_return_spread: f64,

    /// Sustainable withdrawal rate (the 4% rule)
    pub safe_withdrawal_rate: f64,

    /// Retirement corpus target as a multiple of annual income
    pub target_income_multiple: f64,

    /// Share of income a retiree's withdrawals should replace
    pub income_replacement_target: f64,

    /// Share of pre-retirement income spent in retirement
    pub retirement_spending_ratio: f64,

    /// Planning horizon for longevity checks
    pub planning_life_expectancy: i32,

    /// Annual purchasing-power erosion used by the inflation-risk check
    pub inflation_erosion_rate: f64,

    /// Equity drawdown assumed by the market-risk check
    pub market_drawdown: f64,

    /// Equity drift (percentage points) tolerated before rebalancing
    pub drift_tolerance: f64,

    /// Inflation used to deflate projected payouts in target analysis
    pub payout_inflation: f64,

    /// Statutory contribution limits
    pub limits: ContributionLimits,
}

impl Default for PlanningAssumptions {
    fn default() -> Self {
        Self::default_planning()
    }
}

impl PlanningAssumptions {
    /// Standard planning assumptions
    pub fn default_planning() -> Self {
        Self {
            default_return: 0.07,
            scenario_return_spread: 0.02,
            safe_withdrawal_rate: 0.04,
            target_income_multiple: 10.0,
            income_replacement_target: 0.70,
            retirement_spending_ratio: 0.80,
            planning_life_expectancy: 90,
            inflation_erosion_rate: 0.03,
            market_drawdown: 0.30,
            drift_tolerance: 5.0,
            payout_inflation: 0.025,
            limits: ContributionLimits::default(),
        }
    }

    /// Load assumptions from a JSON file; missing keys keep their defaults
    pub fn from_json_path(path: &Path) -> crate::Result<Self> {
        let file = File::open(path)?;
        let assumptions: Self = serde_json::from_reader(BufReader::new(file))?;
        log::debug!("loaded planning assumptions from {}", path.display());
        Ok(assumptions)
    }

    /// Retirement corpus target for a given income
    pub fn target_corpus(&self, annual_income: f64) -> f64 {
        annual_income * self.target_income_multiple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "default_return": 0.06, "limits": { "base_limit": 24000.0 } }"#;
        let assumptions: PlanningAssumptions = serde_json::from_str(json).unwrap();

        assert_eq!(assumptions.default_return, 0.06);
        assert_eq!(assumptions.safe_withdrawal_rate, 0.04);
        assert_eq!(assumptions.limits.base_limit, 24000.0);
        assert_eq!(assumptions.limits.catch_up, 7500.0);
    }

    #[test]
    fn test_target_corpus() {
        let assumptions = PlanningAssumptions::default_planning();
        assert_eq!(assumptions.target_corpus(60_000.0), 600_000.0);
    }
}
