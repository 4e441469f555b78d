//! Allocation optimizer
//!
//! Computes a glide-path target allocation for a member, compares it with the
//! member's current allocation and proposes rebalancing trades when equity
//! drifts beyond tolerance.

mod optimizer;

pub use optimizer::{
    current_allocation, estimate_current_allocation, estimated_equity_exposure, rebalance_deltas,
    recommended_allocation, Allocation, AllocationInput,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::assumptions::PlanningAssumptions;
use crate::error::{split_outcomes, MemberFailure, Result};
use crate::profile::MemberFinancialProfile;
use optimizer::round1;

/// Portfolio value assumed for trade sizing when savings are unknown
pub const DEFAULT_PORTFOLIO_VALUE: f64 = 100_000.0;

/// Minimum fractional change that produces a trade
const MIN_TRADE_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalanceDirection {
    IncreaseEquity,
    DecreaseEquity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Estimated trade in one asset class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecommendation {
    pub asset_class: String,
    pub side: TradeSide,
    pub amount: f64,
    /// Size of the move in percentage points
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancingAction {
    pub direction: RebalanceDirection,
    pub description: String,
    pub trades: Vec<TradeRecommendation>,
}

/// Optimizer output for one member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOptimization {
    pub member_id: String,
    pub input: AllocationInput,
    pub current_allocation: Allocation,
    pub recommended_allocation: Allocation,
    pub deltas: Allocation,
    pub needs_rebalancing: bool,
    pub drift_tolerance: f64,
    pub rationale: String,
    pub actions: Vec<RebalancingAction>,
}

/// Optimize one member's allocation
///
/// `current` overrides the member's recorded or estimated allocation.
pub fn optimize_portfolio(
    profile: &MemberFinancialProfile,
    current: Option<Allocation>,
    assumptions: &PlanningAssumptions,
) -> Result<PortfolioOptimization> {
    profile.validate()?;

    let input = AllocationInput::from_profile(profile);
    let current = current.unwrap_or_else(|| current_allocation(profile));
    let recommended = recommended_allocation(&input);
    let deltas = rebalance_deltas(&current, &recommended);

    let drift_tolerance = assumptions.drift_tolerance;
    let needs_rebalancing = deltas.stocks.abs() > drift_tolerance;

    let actions = if needs_rebalancing {
        let portfolio_value = if profile.current_savings > 0.0 {
            profile.current_savings
        } else {
            DEFAULT_PORTFOLIO_VALUE
        };
        let (direction, verb) = if deltas.stocks > 0.0 {
            (RebalanceDirection::IncreaseEquity, "Increase")
        } else {
            (RebalanceDirection::DecreaseEquity, "Decrease")
        };
        vec![RebalancingAction {
            direction,
            description: format!("{} equity allocation by {:.0}%", verb, deltas.stocks.abs()),
            trades: trade_recommendations(portfolio_value, &deltas),
        }]
    } else {
        Vec::new()
    };

    let rationale = optimization_rationale(&input, &current, &recommended, &deltas, drift_tolerance);

    log::debug!(
        "member {}: equity {:.1}% -> {:.1}% (rebalance: {})",
        profile.member_id,
        current.stocks,
        recommended.stocks,
        needs_rebalancing
    );

    Ok(PortfolioOptimization {
        member_id: profile.member_id.clone(),
        input,
        current_allocation: current,
        recommended_allocation: recommended,
        deltas,
        needs_rebalancing,
        drift_tolerance,
        rationale,
        actions,
    })
}

/// Buy/sell estimates for equity and bonds moves larger than 1%
pub fn trade_recommendations(portfolio_value: f64, deltas: &Allocation) -> Vec<TradeRecommendation> {
    [("Equity", deltas.stocks), ("Bonds", deltas.bonds)]
        .into_iter()
        .filter(|(_, delta)| (delta / 100.0).abs() > MIN_TRADE_FRACTION)
        .map(|(asset_class, delta)| TradeRecommendation {
            asset_class: asset_class.to_string(),
            side: if delta > 0.0 { TradeSide::Buy } else { TradeSide::Sell },
            amount: (delta.abs() / 100.0 * portfolio_value).round(),
            percentage: delta.abs().round(),
        })
        .collect()
}

fn optimization_rationale(
    input: &AllocationInput,
    current: &Allocation,
    recommended: &Allocation,
    deltas: &Allocation,
    drift_tolerance: f64,
) -> String {
    let risk = input.risk_tolerance.map(|r| r.as_str()).unwrap_or("Medium");
    let years = input.years_to_retirement();

    let mut rationale = format!(
        "Based on your {} risk tolerance and {} years of age, ",
        risk.to_ascii_lowercase(),
        input.age
    );

    if recommended.stocks > current.stocks {
        rationale.push_str(&format!(
            "we recommend increasing equity allocation by {:.1}% to capture more growth potential \
             while you have {} years until retirement. ",
            deltas.stocks, years
        ));
    } else if recommended.stocks < current.stocks {
        rationale.push_str(&format!(
            "we suggest reducing equity exposure by {:.1}% to preserve capital \
             as you approach retirement in {} years. ",
            deltas.stocks.abs(),
            years
        ));
    }

    if risk == "Low" && current.stocks > 60.0 {
        rationale.push_str(&format!(
            "Your current high equity allocation ({:.1}%) may be too aggressive for your conservative risk profile. ",
            current.stocks
        ));
    } else if risk == "High" && current.stocks < 50.0 {
        rationale.push_str(
            "Your current allocation may be too conservative given your high risk tolerance and time horizon. ",
        );
    }

    if deltas.stocks.abs() > drift_tolerance {
        rationale.push_str("Consider rebalancing gradually over 3-6 months to minimize market timing risk.");
    } else {
        rationale.push_str(
            "Your current allocation is well-aligned with your profile. Review annually or after major life changes.",
        );
    }

    rationale
}

/// Population-level view of a bulk optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub total_members: usize,
    pub need_rebalancing: usize,
    pub need_rebalancing_percentage: f64,
    /// Mean absolute equity delta in percentage points
    pub average_equity_delta: f64,
    pub risk_distribution: BTreeMap<String, usize>,
}

impl OptimizationSummary {
    pub fn from_optimizations(optimizations: &[PortfolioOptimization]) -> Self {
        let total = optimizations.len();
        let need_rebalancing = optimizations.iter().filter(|o| o.needs_rebalancing).count();

        let mut risk_distribution = BTreeMap::new();
        for optimization in optimizations {
            let label = optimization
                .input
                .risk_tolerance
                .map(|r| r.as_str())
                .unwrap_or("Unspecified");
            *risk_distribution.entry(label.to_string()).or_insert(0) += 1;
        }

        let (need_rebalancing_percentage, average_equity_delta) = if total == 0 {
            (0.0, 0.0)
        } else {
            let delta_sum: f64 = optimizations.iter().map(|o| o.deltas.stocks.abs()).sum();
            (
                (need_rebalancing as f64 / total as f64 * 100.0).round(),
                round1(delta_sum / total as f64),
            )
        };

        Self {
            total_members: total,
            need_rebalancing,
            need_rebalancing_percentage,
            average_equity_delta,
            risk_distribution,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOptimization {
    pub optimizations: Vec<PortfolioOptimization>,
    pub errors: Vec<MemberFailure>,
    pub summary: OptimizationSummary,
}

/// Optimize every member in parallel; failures are recorded, not fatal
pub fn bulk_optimize(profiles: &[MemberFinancialProfile], assumptions: &PlanningAssumptions) -> BulkOptimization {
    let outcomes: Vec<_> = profiles
        .par_iter()
        .map(|profile| (profile.member_id.clone(), optimize_portfolio(profile, None, assumptions)))
        .collect();

    let (optimizations, errors) = split_outcomes(outcomes);
    let summary = OptimizationSummary::from_optimizations(&optimizations);

    log::info!(
        "optimized {} members ({} need rebalancing, {} failed)",
        optimizations.len(),
        summary.need_rebalancing,
        errors.len()
    );

    BulkOptimization {
        optimizations,
        errors,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{sample_profile, RiskTolerance};

    #[test]
    fn test_optimize_aggressive_estimate() {
        let mut profile = sample_profile();
        profile.investment_type = "Equity Fund".to_string();
        let assumptions = PlanningAssumptions::default_planning();

        let result = optimize_portfolio(&profile, None, &assumptions).unwrap();

        assert_eq!(result.current_allocation.stocks, 70.0);
        assert_eq!(result.recommended_allocation.stocks, 57.0);
        assert_eq!(result.deltas.stocks, -13.0);
        assert!(result.needs_rebalancing);
        assert!(result.rationale.contains("reducing equity exposure by 13.0%"));

        let action = &result.actions[0];
        assert_eq!(action.direction, RebalanceDirection::DecreaseEquity);
        assert_eq!(action.description, "Decrease equity allocation by 13%");
        assert_eq!(action.trades.len(), 2);
        assert_eq!(action.trades[0].side, TradeSide::Sell);
        assert_eq!(action.trades[0].amount, 6_500.0);
        assert_eq!(action.trades[1].side, TradeSide::Buy);
    }

    #[test]
    fn test_aligned_portfolio_needs_no_trades() {
        let profile = sample_profile();
        let assumptions = PlanningAssumptions::default_planning();
        let current = Allocation::new(55.0, 35.0, 10.0);

        let result = optimize_portfolio(&profile, Some(current), &assumptions).unwrap();
        assert!(!result.needs_rebalancing);
        assert!(result.actions.is_empty());
        assert!(result.rationale.ends_with("Review annually or after major life changes."));
    }

    #[test]
    fn test_trades_use_default_value_and_skip_small_moves() {
        let trades = trade_recommendations(DEFAULT_PORTFOLIO_VALUE, &Allocation::new(8.0, -0.5, -7.5));
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].asset_class, "Equity");
        assert_eq!(trades[0].amount, 8_000.0);
    }

    #[test]
    fn test_bulk_collects_failures() {
        let mut broken = sample_profile();
        broken.member_id = "BAD".to_string();
        broken.age = -4;

        let mut low = sample_profile();
        low.member_id = "U2".to_string();
        low.risk_tolerance = Some(RiskTolerance::Low);
        low.equity_allocation = Some(38.0);

        let result = bulk_optimize(&[sample_profile(), broken, low], &PlanningAssumptions::default_planning());

        assert_eq!(result.optimizations.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].member_id, "BAD");
        assert_eq!(result.summary.total_members, 2);
        assert_eq!(result.summary.need_rebalancing, 1);
        assert_eq!(result.summary.need_rebalancing_percentage, 50.0);
        assert_eq!(result.summary.risk_distribution.get("Low"), Some(&1));
    }

    #[test]
    fn test_empty_summary() {
        let summary = OptimizationSummary::from_optimizations(&[]);
        assert_eq!(summary.total_members, 0);
        assert_eq!(summary.average_equity_delta, 0.0);
    }
}
