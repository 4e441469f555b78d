//! The six independent risk rules
//!
//! Each check inspects one profile and returns `Some(alert)` when its rule
//! fires. Checks never fail: missing numbers are zero and every division is
//! guarded.

use crate::allocation::estimated_equity_exposure;
use crate::assumptions::PlanningAssumptions;
use crate::compounding::{additional_contribution_for_gap, future_value};
use crate::profile::{MemberFinancialProfile, RiskTolerance};

use super::types::{RiskAlert, RiskAlertType, Severity};

pub type CheckFn = fn(&MemberFinancialProfile, &PlanningAssumptions) -> Option<RiskAlert>;

/// Every rule, in evaluation order
pub const CHECKS: [(RiskAlertType, CheckFn); 6] = [
    (RiskAlertType::WithdrawalRate, check_withdrawal_rate),
    (RiskAlertType::AssetAllocation, check_asset_allocation),
    (RiskAlertType::SavingsGap, check_savings_gap),
    (RiskAlertType::MarketRisk, check_market_risk),
    (RiskAlertType::InflationRisk, check_inflation_risk),
    (RiskAlertType::LongevityRisk, check_longevity_risk),
];

/// Whole-dollar amount with thousands separators
pub(crate) fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Retired members whose savings cannot replace enough income under the withdrawal rule
pub fn check_withdrawal_rate(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Option<RiskAlert> {
    if !profile.is_retired() || profile.annual_income <= 0.0 {
        return None;
    }

    let safe_withdrawal = profile.current_savings * assumptions.safe_withdrawal_rate;
    let replacement_ratio = safe_withdrawal / profile.annual_income;

    if replacement_ratio >= assumptions.income_replacement_target {
        return None;
    }

    Some(
        RiskAlert::new(
            RiskAlertType::WithdrawalRate,
            Severity::High,
            "Insufficient Retirement Income",
            format!(
                "Current savings only support {:.0}% income replacement",
                replacement_ratio * 100.0
            ),
        )
        .metric("safe_withdrawal_amount", safe_withdrawal.round())
        .metric("income_replacement_ratio", (replacement_ratio * 100.0).round())
        .metric(
            "shortfall",
            (profile.annual_income * assumptions.income_replacement_target - safe_withdrawal).round(),
        )
        .recommend([
            "Consider delaying retirement",
            "Reduce retirement expenses",
            "Explore part-time work options",
        ]),
    )
}

/// Age-based equity target for a risk tier, in percent
pub fn recommended_equity(age: i32, risk: Option<RiskTolerance>) -> f64 {
    let age = age as f64;
    match risk.unwrap_or(RiskTolerance::Medium) {
        RiskTolerance::Low => (100.0 - age).max(20.0),
        RiskTolerance::Medium => (110.0 - age).max(30.0),
        RiskTolerance::High => (120.0 - age).max(40.0),
    }
}

/// Equity exposure more than 20 points away from the age-based target
pub fn check_asset_allocation(profile: &MemberFinancialProfile, _assumptions: &PlanningAssumptions) -> Option<RiskAlert> {
    let current = estimated_equity_exposure(profile);
    let recommended = recommended_equity(profile.age, profile.risk_tolerance);
    let difference = (current - recommended).abs();

    if difference <= 20.0 {
        return None;
    }

    let severity = if difference > 40.0 { Severity::High } else { Severity::Medium };
    let overallocated = current > recommended;

    let (title, recommendations) = if overallocated {
        (
            "Overexposed to Equity Risk",
            [
                "Reduce equity allocation to manage risk",
                "Increase bond allocation for stability",
                "Consider target-date funds for automatic rebalancing",
            ],
        )
    } else {
        (
            "Too Conservative Allocation",
            [
                "Increase equity allocation for growth potential",
                "Consider age-appropriate risk taking",
                "Review inflation protection strategies",
            ],
        )
    };

    Some(
        RiskAlert::new(
            RiskAlertType::AssetAllocation,
            severity,
            title,
            format!(
                "Current equity allocation ({:.0}%) differs significantly from recommended ({:.0}%)",
                current, recommended
            ),
        )
        .metric("current_equity", current)
        .metric("recommended_equity", recommended)
        .metric("difference", difference)
        .metric("is_overallocated", if overallocated { 1.0 } else { 0.0 })
        .recommend(recommendations),
    )
}

/// Projected savings below the income-multiple target
pub fn check_savings_gap(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Option<RiskAlert> {
    let years = profile.years_to_retirement();
    if years <= 0 {
        return None;
    }

    let annual_return = profile.assumed_return(assumptions.default_return);
    let target = assumptions.target_corpus(profile.annual_income);
    let projected = future_value(
        profile.current_savings,
        profile.annual_contribution(),
        annual_return,
        years,
    );

    let gap = target - projected;
    if gap <= 0.0 {
        return None;
    }

    let additional_annual = additional_contribution_for_gap(gap, annual_return, years);
    let additional_monthly = additional_annual / 12.0;
    let severity = if gap > target * 0.5 { Severity::High } else { Severity::Medium };

    Some(
        RiskAlert::new(
            RiskAlertType::SavingsGap,
            severity,
            "Retirement Savings Shortfall",
            format!(
                "Projected savings fall short of retirement goal by {}",
                format_currency(gap)
            ),
        )
        .metric("current_savings", profile.current_savings)
        .metric("projected_savings", projected.round())
        .metric("target_savings", target)
        .metric("savings_gap", gap.round())
        .metric("additional_annual_needed", additional_annual.round())
        .metric("additional_monthly_needed", additional_monthly.round())
        .metric("years_to_retirement", years as f64)
        .recommend([
            format!("Increase monthly contributions by {}", format_currency(additional_monthly)),
            "Consider maximizing employer match opportunities".to_string(),
            "Review and optimize investment allocations".to_string(),
            "Explore catch-up contributions if eligible".to_string(),
        ]),
    )
}

/// Heavy equity exposure within ten years of retirement
pub fn check_market_risk(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Option<RiskAlert> {
    let years = profile.years_to_retirement();
    let equity = estimated_equity_exposure(profile);

    if years > 10 || equity <= 70.0 {
        return None;
    }

    let equity_value = profile.current_savings * equity / 100.0;

    Some(
        RiskAlert::new(
            RiskAlertType::MarketRisk,
            Severity::High,
            "High Market Risk Near Retirement",
            format!(
                "{:.0}% equity allocation with only {} years to retirement",
                equity, years
            ),
        )
        .metric("equity_allocation", equity)
        .metric("equity_value", equity_value.round())
        .metric("years_to_retirement", years as f64)
        .metric("potential_loss", (equity_value * assumptions.market_drawdown).round())
        .recommend([
            "Begin shifting to more conservative allocations",
            "Consider bond ladder for near-term expenses",
            "Implement systematic rebalancing strategy",
            "Review sequence of returns risk",
        ]),
    )
}

/// Conservative allocation with a long horizon
pub fn check_inflation_risk(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Option<RiskAlert> {
    let years = profile.years_to_retirement();
    let equity = estimated_equity_exposure(profile);

    if years <= 15 || equity >= 30.0 {
        return None;
    }

    let eroded_value = profile.current_savings * (1.0 - assumptions.inflation_erosion_rate).powi(years);

    Some(
        RiskAlert::new(
            RiskAlertType::InflationRisk,
            Severity::Medium,
            "Inflation Risk from Conservative Allocation",
            format!(
                "Only {:.0}% equity allocation with {} years to retirement",
                equity, years
            ),
        )
        .metric("equity_allocation", equity)
        .metric("years_to_retirement", years as f64)
        .metric("inflation_impact", eroded_value.round())
        .recommend([
            "Consider increasing equity allocation for inflation protection",
            "Explore Treasury Inflation-Protected Securities (TIPS)",
            "Review real estate or commodity exposure",
            "Balance growth needs with risk tolerance",
        ]),
    )
}

/// Retired members drawing down faster than the safe withdrawal rate
pub fn check_longevity_risk(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Option<RiskAlert> {
    if !profile.is_retired() {
        return None;
    }

    let annual_need = profile.annual_income * assumptions.retirement_spending_ratio;
    if annual_need <= 0.0 {
        return None;
    }

    let withdrawal_rate = if profile.current_savings > 0.0 {
        annual_need / profile.current_savings
    } else {
        f64::INFINITY
    };

    if withdrawal_rate <= assumptions.safe_withdrawal_rate {
        return None;
    }

    let description = if withdrawal_rate.is_finite() {
        format!(
            "Current withdrawal rate of {:.0}% may deplete savings",
            withdrawal_rate * 100.0
        )
    } else {
        "Savings are exhausted and cannot fund retirement spending".to_string()
    };

    let mut alert = RiskAlert::new(
        RiskAlertType::LongevityRisk,
        Severity::High,
        "Risk of Outliving Savings",
        description,
    )
    .metric("safe_withdrawal_rate", assumptions.safe_withdrawal_rate * 100.0)
    .metric("years_of_savings_remaining", (profile.current_savings / annual_need).round())
    .metric("planning_life_expectancy", assumptions.planning_life_expectancy as f64);

    if withdrawal_rate.is_finite() {
        alert = alert.metric("current_withdrawal_rate", (withdrawal_rate * 100.0).round());
    }

    Some(alert.recommend([
        "Consider annuity products for guaranteed income",
        "Reduce withdrawal rate if possible",
        "Explore part-time work or delayed Social Security",
        "Review healthcare cost planning",
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::sample_profile;

    fn assumptions() -> PlanningAssumptions {
        PlanningAssumptions::default_planning()
    }

    fn near_retiree() -> MemberFinancialProfile {
        let mut profile = MemberFinancialProfile::new("U2", 62, 80_000.0, 400_000.0, Some(RiskTolerance::Low), 65);
        profile.equity_allocation = Some(85.0);
        profile
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_234_567.8), "$1,234,568");
        assert_eq!(format_currency(-2500.0), "-$2,500");
    }

    #[test]
    fn test_overexposed_near_retiree() {
        let alert = check_asset_allocation(&near_retiree(), &assumptions()).unwrap();
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.title, "Overexposed to Equity Risk");
        assert_eq!(alert.metrics["recommended_equity"], 38.0);
        assert_eq!(alert.metrics["difference"], 47.0);
        assert_eq!(alert.metrics["is_overallocated"], 1.0);

        let market = check_market_risk(&near_retiree(), &assumptions()).unwrap();
        assert_eq!(market.metrics["potential_loss"], (400_000.0_f64 * 0.85 * 0.30).round());
    }

    #[test]
    fn test_too_conservative() {
        let mut profile = sample_profile();
        profile.investment_type = "Government Bonds".to_string();
        profile.risk_tolerance = Some(RiskTolerance::High);
        // target 90, estimate 20
        let alert = check_asset_allocation(&profile, &assumptions()).unwrap();
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.title, "Too Conservative Allocation");

        let inflation = check_inflation_risk(&profile, &assumptions()).unwrap();
        assert_eq!(inflation.severity, Severity::Medium);
        assert_eq!(inflation.metrics["inflation_impact"], (50_000.0 * 0.97_f64.powi(35)).round());
    }

    #[test]
    fn test_savings_gap_closes_with_extra_contribution() {
        let mut profile = sample_profile();
        profile.contribution_amount = 0.0;
        profile.current_savings = 0.0;
        profile.age = 55;

        let alert = check_savings_gap(&profile, &assumptions()).unwrap();
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.metrics["target_savings"], 600_000.0);

        let extra = alert.metrics["additional_annual_needed"];
        let projected = future_value(0.0, extra, 0.07, 10);
        assert!((projected - 600_000.0).abs() < 20.0);
    }

    #[test]
    fn test_savings_gap_absent_when_on_track() {
        // future value of the sample plan comfortably exceeds 10x income
        assert!(check_savings_gap(&sample_profile(), &assumptions()).is_none());
    }

    #[test]
    fn test_retiree_checks() {
        let mut retiree = MemberFinancialProfile::new("U3", 67, 60_000.0, 300_000.0, Some(RiskTolerance::Medium), 65);
        retiree.investment_type = "Mixed Fund".to_string();

        let withdrawal = check_withdrawal_rate(&retiree, &assumptions()).unwrap();
        assert_eq!(withdrawal.metrics["safe_withdrawal_amount"], 12_000.0);
        assert_eq!(withdrawal.metrics["income_replacement_ratio"], 20.0);
        assert_eq!(withdrawal.metrics["shortfall"], 30_000.0);

        let longevity = check_longevity_risk(&retiree, &assumptions()).unwrap();
        assert_eq!(longevity.metrics["current_withdrawal_rate"], 16.0);
        assert_eq!(longevity.metrics["years_of_savings_remaining"], 6.0);

        retiree.current_savings = 0.0;
        let longevity = check_longevity_risk(&retiree, &assumptions()).unwrap();
        assert!(!longevity.metrics.contains_key("current_withdrawal_rate"));
        assert!(longevity.metrics.values().all(|v| v.is_finite()));
    }

    #[test]
    fn test_zero_income_retiree_is_skipped() {
        let retiree = MemberFinancialProfile::new("U4", 70, 0.0, 0.0, None, 65);
        assert!(check_withdrawal_rate(&retiree, &assumptions()).is_none());
        assert!(check_longevity_risk(&retiree, &assumptions()).is_none());
    }
}
