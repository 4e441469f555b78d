//! Contribution scenario planner
//!
//! Compares savings levels for a member, sizes the contribution needed to
//! close any shortfall against the income-multiple target and produces
//! prioritized advice. What-if overrides report how far each variant gets
//! toward the member's recorded targets.

mod recommendations;
mod scenarios;
mod what_if;

pub use recommendations::{contribution_recommendations, ContributionRecommendation};
pub use scenarios::{
    contribution_gap, contribution_scenarios, current_portfolio_scenario, status_quo_scenario, ContributionGap,
    ContributionScenario, CURRENT_PORTFOLIO, STATUS_QUO,
};
pub use what_if::{
    target_achievement, what_if_contributions, AchievementStatus, ContributionChange, ContributionWhatIf,
    GapAnalysis, TargetAchievement, WhatIfOutcome,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::alerts::Priority;
use crate::assumptions::{LimitSummary, PlanningAssumptions};
use crate::error::{split_outcomes, MemberFailure, Result};
use crate::profile::MemberFinancialProfile;
use crate::scenario::ScenarioRunner;

/// Where the member stands today
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentStatus {
    pub current_savings: f64,
    pub current_contributions: f64,
    pub years_to_retirement: i32,
    pub retirement_goal: f64,
    /// Annual retirement spending the plan should cover
    pub income_replacement_target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionPlan {
    pub member_id: String,
    pub current_status: CurrentStatus,
    pub gap: ContributionGap,
    pub scenarios: Vec<ContributionScenario>,
    pub recommendations: Vec<ContributionRecommendation>,
    pub limits: LimitSummary,
}

impl ContributionPlan {
    pub fn has_high_priority(&self) -> bool {
        self.recommendations.iter().any(|r| r.priority == Priority::High)
    }
}

/// Full contribution plan for one member
pub fn plan_contributions(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Result<ContributionPlan> {
    profile.validate()?;
    let runner = ScenarioRunner::with_assumptions(assumptions.clone());

    let current_status = CurrentStatus {
        current_savings: profile.current_savings,
        current_contributions: profile.annual_contribution(),
        years_to_retirement: profile.years_to_retirement(),
        retirement_goal: assumptions.target_corpus(profile.annual_income),
        income_replacement_target: profile.annual_income * assumptions.retirement_spending_ratio,
    };

    let gap = contribution_gap(profile, assumptions);
    log::debug!("member {}: {}", profile.member_id, gap.message());

    Ok(ContributionPlan {
        member_id: profile.member_id.clone(),
        current_status,
        gap,
        scenarios: contribution_scenarios(profile, &runner),
        recommendations: contribution_recommendations(profile, assumptions),
        limits: assumptions.limits.for_age(profile.age),
    })
}

/// Population-level view of a bulk planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningSummary {
    pub total_members: usize,
    pub on_track_percentage: f64,
    /// Mean shortfall over members with one
    pub average_gap: f64,
    pub needing_immediate_action: usize,
    pub action_needed_percentage: f64,
}

impl PlanningSummary {
    pub fn from_plans(plans: &[ContributionPlan]) -> Self {
        let total = plans.len();
        let pct = |count: usize| {
            if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64 * 100.0).round()
            }
        };

        let on_track = plans.iter().filter(|p| p.gap.is_on_track()).count();
        let gaps: Vec<f64> = plans.iter().filter_map(|p| p.gap.gap()).collect();
        let average_gap = if gaps.is_empty() {
            0.0
        } else {
            (gaps.iter().sum::<f64>() / gaps.len() as f64).round()
        };
        let needing_immediate_action = plans.iter().filter(|p| p.has_high_priority()).count();

        Self {
            total_members: total,
            on_track_percentage: pct(on_track),
            average_gap,
            needing_immediate_action,
            action_needed_percentage: pct(needing_immediate_action),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkContributionPlan {
    pub plans: Vec<ContributionPlan>,
    pub errors: Vec<MemberFailure>,
    pub summary: PlanningSummary,
}

/// Plan every member in parallel; failures are recorded, not fatal
pub fn bulk_plan(profiles: &[MemberFinancialProfile], assumptions: &PlanningAssumptions) -> BulkContributionPlan {
    let outcomes: Vec<_> = profiles
        .par_iter()
        .map(|profile| (profile.member_id.clone(), plan_contributions(profile, assumptions)))
        .collect();

    let (plans, errors) = split_outcomes(outcomes);
    let summary = PlanningSummary::from_plans(&plans);

    log::info!(
        "planned contributions for {} members ({}% on track, {} failed)",
        plans.len(),
        summary.on_track_percentage,
        errors.len()
    );

    BulkContributionPlan { plans, errors, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::sample_profile;

    #[test]
    fn test_plan_for_sample_member() {
        let plan = plan_contributions(&sample_profile(), &PlanningAssumptions::default_planning()).unwrap();

        assert_eq!(plan.current_status.years_to_retirement, 35);
        assert_eq!(plan.current_status.retirement_goal, 600_000.0);
        assert_eq!(plan.current_status.income_replacement_target, 48_000.0);
        assert_eq!(plan.scenarios.len(), 4);
        assert!(plan.gap.is_on_track());
        assert_eq!(plan.limits.total_401k, 23_000.0);
        assert!(!plan.has_high_priority());
    }

    #[test]
    fn test_bulk_summary() {
        let mut behind = sample_profile();
        behind.member_id = "U2".to_string();
        behind.age = 55;
        behind.current_savings = 10_000.0;
        behind.contribution_amount = 1_000.0;

        let mut retired = sample_profile();
        retired.member_id = "U3".to_string();
        retired.age = 70;

        let mut broken = sample_profile();
        broken.member_id = "BAD".to_string();
        broken.retirement_age_goal = 0;

        let result = bulk_plan(
            &[sample_profile(), behind, retired, broken],
            &PlanningAssumptions::default_planning(),
        );

        assert_eq!(result.plans.len(), 3);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.summary.total_members, 3);
        assert_eq!(result.summary.on_track_percentage, 67.0);
        assert!(result.summary.average_gap > 0.0);
        assert_eq!(result.summary.needing_immediate_action, 2);
    }
}
