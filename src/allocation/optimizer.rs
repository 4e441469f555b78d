//! Glide-path allocation and current-allocation estimation

use serde::{Deserialize, Serialize};

use crate::profile::{MemberFinancialProfile, RiskTolerance};

/// Equity fraction bounds after all adjustments
pub const MIN_EQUITY: f64 = 0.15;
pub const MAX_EQUITY: f64 = 0.90;

/// Cash fraction bounds
pub const MIN_CASH: f64 = 0.05;
pub const MAX_CASH: f64 = 0.25;

/// Years to retirement at or below which equity is dampened
pub const NEAR_RETIREMENT_YEARS: i32 = 7;

fn default_withdrawal_strategy() -> String {
    "Fixed".to_string()
}

fn default_pension_type() -> String {
    "Defined Contribution".to_string()
}

/// Inputs of the glide-path calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationInput {
    pub age: i32,
    pub risk_tolerance: Option<RiskTolerance>,
    #[serde(default = "default_pension_type")]
    pub pension_type: String,
    #[serde(default = "default_withdrawal_strategy")]
    pub withdrawal_strategy: String,
    pub retirement_age_goal: i32,
}

impl AllocationInput {
    /// Blank pension type / withdrawal strategy fall back to "Defined Contribution" / "Fixed"
    pub fn from_profile(profile: &MemberFinancialProfile) -> Self {
        let or_default = |value: &str, default: fn() -> String| {
            if value.trim().is_empty() {
                default()
            } else {
                value.to_string()
            }
        };

        Self {
            age: profile.age,
            risk_tolerance: profile.risk_tolerance,
            pension_type: or_default(&profile.pension_type, default_pension_type),
            withdrawal_strategy: or_default(&profile.withdrawal_strategy, default_withdrawal_strategy),
            retirement_age_goal: profile.retirement_age_goal,
        }
    }

    pub fn years_to_retirement(&self) -> i32 {
        (self.retirement_age_goal - self.age).max(0)
    }
}

/// Portfolio split in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
}

impl Allocation {
    pub fn new(stocks: f64, bonds: f64, cash: f64) -> Self {
        Self { stocks, bonds, cash }
    }

    /// A split with the given equity share; 10% cash unless equity leaves less
    pub fn from_equity(stocks: f64) -> Self {
        let stocks = stocks.clamp(0.0, 100.0);
        let cash = (100.0 - stocks).min(10.0);
        Self::new(stocks, 100.0 - stocks - cash, cash)
    }

    pub fn total(&self) -> f64 {
        self.stocks + self.bonds + self.cash
    }
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Recommended allocation for a member
///
/// Equity starts from the risk tier, then takes the age glide, strategy,
/// pension-type and near-retirement adjustments before clamping. Stocks and
/// cash are rounded to one decimal; bonds absorb the rounding residue so the
/// split always totals 100.
pub fn recommended_allocation(input: &AllocationInput) -> Allocation {
    let risk = input.risk_tolerance.unwrap_or(RiskTolerance::Medium);

    let mut equity = match risk {
        RiskTolerance::Low => 0.40,
        RiskTolerance::Medium => 0.60,
        RiskTolerance::High => 0.75,
    };

    equity -= (input.age - 30).max(0) as f64 * 0.005;

    let strategy = input.withdrawal_strategy.trim().to_ascii_lowercase();
    match strategy.as_str() {
        "flexible" | "dynamic" => equity += 0.03,
        "fixed" | "bucket" => equity -= 0.03,
        _ => {}
    }

    if input.pension_type.contains("Defined Benefit") {
        equity += 0.03;
    }

    if input.years_to_retirement() <= NEAR_RETIREMENT_YEARS {
        equity -= 0.05;
    }

    let equity = equity.clamp(MIN_EQUITY, MAX_EQUITY);

    let mut cash: f64 = 0.10;
    if input.age >= 55 {
        cash += 0.05;
    }
    if risk == RiskTolerance::Low {
        cash += 0.05;
    }
    let cash = cash.clamp(MIN_CASH, MAX_CASH);

    let bonds = (1.0 - equity - cash).max(0.0);
    let total = equity + bonds + cash;

    let stocks = round1(equity / total * 100.0);
    let cash = round1(cash / total * 100.0);
    let bonds = round1((100.0 - stocks - cash).max(0.0));

    Allocation::new(stocks, bonds, cash)
}

/// Allocation implied by the free-text investment type
pub fn estimate_current_allocation(investment_type: &str) -> Allocation {
    let kind = investment_type.to_ascii_lowercase();

    if kind.contains("bond") {
        Allocation::new(20.0, 70.0, 10.0)
    } else if kind.contains("equity") || kind.contains("stock") {
        Allocation::new(70.0, 20.0, 10.0)
    } else {
        // balanced, mixed, fund and anything unrecognised
        Allocation::new(50.0, 40.0, 10.0)
    }
}

/// Member's current allocation: measured equity when recorded, else the text estimate
pub fn current_allocation(profile: &MemberFinancialProfile) -> Allocation {
    match profile.equity_allocation {
        Some(equity) => Allocation::from_equity(equity),
        None => estimate_current_allocation(&profile.investment_type),
    }
}

/// Equity exposure in percent used by the risk checks and stress tests
///
/// A measured allocation is taken as-is. Otherwise the investment-type
/// estimate is shifted by the diversity score: above 70 adds 10 points, below
/// 30 removes 10.
pub fn estimated_equity_exposure(profile: &MemberFinancialProfile) -> f64 {
    if let Some(equity) = profile.equity_allocation {
        return equity.clamp(0.0, 100.0);
    }

    let base = estimate_current_allocation(&profile.investment_type).stocks;
    let diversity = profile.diversity_score();
    let adjustment = if diversity > 70.0 {
        10.0
    } else if diversity < 30.0 {
        -10.0
    } else {
        0.0
    };

    (base + adjustment).clamp(0.0, 100.0)
}

/// Recommended minus current, per asset class, rounded to one decimal
pub fn rebalance_deltas(current: &Allocation, recommended: &Allocation) -> Allocation {
    Allocation::new(
        round1(recommended.stocks - current.stocks),
        round1(recommended.bonds - current.bonds),
        round1(recommended.cash - current.cash),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn input(age: i32, risk: Option<RiskTolerance>, strategy: &str, pension: &str, goal: i32) -> AllocationInput {
        AllocationInput {
            age,
            risk_tolerance: risk,
            pension_type: pension.to_string(),
            withdrawal_strategy: strategy.to_string(),
            retirement_age_goal: goal,
        }
    }

    #[test]
    fn test_allocations_total_100() {
        let strategies = ["Fixed", "Flexible", "Dynamic", "Bucket", "Other"];
        let pensions = ["Defined Contribution", "Defined Benefit"];
        let risks = [None, Some(RiskTolerance::Low), Some(RiskTolerance::Medium), Some(RiskTolerance::High)];

        for age in (18..=80).step_by(3) {
            for risk in risks {
                for strategy in strategies {
                    for pension in pensions {
                        let allocation = recommended_allocation(&input(age, risk, strategy, pension, 65));
                        assert_abs_diff_eq!(allocation.total(), 100.0, epsilon = 0.1);
                        assert!(allocation.stocks >= 0.0 && allocation.bonds >= 0.0 && allocation.cash >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_young_medium_fixed() {
        // 0.60 - 0.03 (Fixed), cash 0.10, bonds 0.33
        let allocation = recommended_allocation(&input(30, Some(RiskTolerance::Medium), "Fixed", "Defined Contribution", 65));
        assert_abs_diff_eq!(allocation.stocks, 57.0, epsilon = 1e-9);
        assert_abs_diff_eq!(allocation.cash, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(allocation.bonds, 33.0, epsilon = 1e-9);
    }

    #[test]
    fn test_near_retirement_low_risk() {
        // 0.40 - 0.16 (age 62) - 0.03 - 0.05 = 0.16; cash 0.20
        let allocation = recommended_allocation(&input(62, Some(RiskTolerance::Low), "Fixed", "Defined Contribution", 65));
        assert_abs_diff_eq!(allocation.stocks, 16.0, epsilon = 1e-9);
        assert_abs_diff_eq!(allocation.cash, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(allocation.bonds, 64.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equity_floor() {
        let allocation = recommended_allocation(&input(80, Some(RiskTolerance::Low), "Bucket", "Defined Contribution", 65));
        assert_abs_diff_eq!(allocation.stocks, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_estimate_from_investment_type() {
        assert_eq!(estimate_current_allocation("Government Bonds").stocks, 20.0);
        assert_eq!(estimate_current_allocation("Equity Fund").stocks, 70.0);
        assert_eq!(estimate_current_allocation("Stocks").stocks, 70.0);
        assert_eq!(estimate_current_allocation("Mixed Fund").stocks, 50.0);
        assert_eq!(estimate_current_allocation("").stocks, 50.0);
    }

    #[test]
    fn test_equity_exposure() {
        let mut profile = MemberFinancialProfile::new("U1", 40, 50_000.0, 10_000.0, None, 65);
        profile.investment_type = "Equity Fund".to_string();
        profile.portfolio_diversity_score = 80.0;
        assert_eq!(estimated_equity_exposure(&profile), 80.0);

        profile.portfolio_diversity_score = 20.0;
        assert_eq!(estimated_equity_exposure(&profile), 60.0);

        // unreported score is neutral
        profile.portfolio_diversity_score = 0.0;
        assert_eq!(estimated_equity_exposure(&profile), 70.0);

        profile.equity_allocation = Some(85.0);
        assert_eq!(estimated_equity_exposure(&profile), 85.0);
        assert_eq!(current_allocation(&profile), Allocation::new(85.0, 5.0, 10.0));
    }

    #[test]
    fn test_rebalance_deltas() {
        let deltas = rebalance_deltas(&Allocation::new(70.0, 20.0, 10.0), &Allocation::new(57.0, 33.0, 10.0));
        assert_eq!(deltas, Allocation::new(-13.0, 13.0, 0.0));
    }
}
