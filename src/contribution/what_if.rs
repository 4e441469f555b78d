//! Named contribution overrides and target-achievement analysis

use serde::{Deserialize, Serialize};

use crate::assumptions::PlanningAssumptions;
use crate::error::{AnalyticsError, Result};
use crate::profile::MemberFinancialProfile;
use crate::scenario::ScenarioRunner;

use super::scenarios::{status_quo_scenario, ContributionScenario, STATUS_QUO};

/// Caller-supplied override of the member's plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionChange {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub new_annual_contribution: Option<f64>,
    /// Years added to (or removed from) the retirement-age goal
    #[serde(default)]
    pub retirement_age_change: Option<i32>,
}

impl ContributionChange {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_contribution(mut self, annual_contribution: f64) -> Self {
        self.new_annual_contribution = Some(annual_contribution);
        self
    }

    pub fn with_retirement_age_change(mut self, years: i32) -> Self {
        self.retirement_age_change = Some(years);
        self
    }

    /// Copy of the profile with this change applied
    pub fn apply(&self, profile: &MemberFinancialProfile) -> Result<MemberFinancialProfile> {
        let mut modified = profile.clone();

        if let Some(amount) = self.new_annual_contribution {
            if amount < 0.0 || !amount.is_finite() {
                return Err(AnalyticsError::invalid_parameter(
                    "new_annual_contribution",
                    format!("must be a non-negative number, got {}", amount),
                ));
            }
            modified.contribution_amount = amount;
            modified.total_annual_contribution = amount;
        }

        if let Some(delta) = self.retirement_age_change {
            modified.retirement_age_goal = profile.retirement_age_goal + delta;
            if modified.retirement_age_goal <= 0 {
                return Err(AnalyticsError::invalid_parameter(
                    "retirement_age_change",
                    format!(
                        "moves the retirement age to {} (member {})",
                        modified.retirement_age_goal, profile.member_id
                    ),
                ));
            }
        }

        Ok(modified)
    }
}

/// Achievement band of a projection against the member's targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementStatus {
    #[serde(rename = "Behind Target")]
    BehindTarget,
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Exceeds Target")]
    ExceedsTarget,
}

impl AchievementStatus {
    /// Below 80% is behind, above 120% exceeds
    pub fn from_pct(pct: f64) -> Self {
        if pct < 80.0 {
            AchievementStatus::BehindTarget
        } else if pct > 120.0 {
            AchievementStatus::ExceedsTarget
        } else {
            AchievementStatus::OnTrack
        }
    }
}

/// Shortfalls against each target, never negative
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub amount_gap: f64,
    pub payout_gap: f64,
    pub inflation_gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetAchievement {
    pub target_amount: f64,
    pub target_payout: f64,
    pub target_inflation_adjusted_payout: f64,
    pub projected_payout: f64,
    pub projected_inflation_adjusted_payout: f64,
    pub amount_achievement_pct: f64,
    pub payout_achievement_pct: f64,
    pub inflation_adjusted_achievement_pct: f64,
    pub status: AchievementStatus,
    pub gap_analysis: GapAnalysis,
}

fn achievement_pct(achieved: f64, target: f64) -> f64 {
    if target > 0.0 {
        (achieved / target * 100.0).round()
    } else {
        100.0
    }
}

/// Compare a scenario's projection with the member's recorded targets
///
/// Targets fall back to the income-multiple corpus, its sustainable payout and
/// that payout deflated to today's money when the profile carries none.
pub fn target_achievement(
    profile: &MemberFinancialProfile,
    scenario: &ContributionScenario,
    assumptions: &PlanningAssumptions,
) -> TargetAchievement {
    let years = scenario.scenario.results.years_to_retirement.max(0);
    let deflator = (1.0 + assumptions.payout_inflation).powi(years);

    let target_amount = if profile.projected_pension_amount > 0.0 {
        profile.projected_pension_amount
    } else {
        assumptions.target_corpus(profile.annual_income)
    };
    let target_payout = if profile.expected_annual_payout > 0.0 {
        profile.expected_annual_payout
    } else {
        target_amount * assumptions.safe_withdrawal_rate
    };
    let target_inflation_adjusted_payout = if profile.inflation_adjusted_payout > 0.0 {
        profile.inflation_adjusted_payout
    } else {
        target_payout / deflator
    };

    let projected_amount = scenario.projected_value();
    let projected_payout = scenario.scenario.results.sustainable_withdrawal;
    let projected_inflation_adjusted_payout = projected_payout / deflator;

    let amount_achievement_pct = achievement_pct(projected_amount, target_amount);

    TargetAchievement {
        target_amount,
        target_payout,
        target_inflation_adjusted_payout,
        projected_payout: projected_payout.round(),
        projected_inflation_adjusted_payout: projected_inflation_adjusted_payout.round(),
        amount_achievement_pct,
        payout_achievement_pct: achievement_pct(projected_payout, target_payout),
        inflation_adjusted_achievement_pct: achievement_pct(
            projected_inflation_adjusted_payout,
            target_inflation_adjusted_payout,
        ),
        status: AchievementStatus::from_pct(amount_achievement_pct),
        gap_analysis: GapAnalysis {
            amount_gap: (target_amount - projected_amount).max(0.0).round(),
            payout_gap: (target_payout - projected_payout).max(0.0).round(),
            inflation_gap: (target_inflation_adjusted_payout - projected_inflation_adjusted_payout)
                .max(0.0)
                .round(),
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfOutcome {
    pub name: String,
    pub change: Option<ContributionChange>,
    pub scenario: ContributionScenario,
    pub target_achievement: TargetAchievement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionWhatIf {
    pub member_id: String,
    pub baseline: WhatIfOutcome,
    pub scenarios: Vec<WhatIfOutcome>,
}

/// Project the member's status quo under each change
pub fn what_if_contributions(
    profile: &MemberFinancialProfile,
    changes: &[ContributionChange],
    assumptions: &PlanningAssumptions,
) -> Result<ContributionWhatIf> {
    profile.validate()?;
    let runner = ScenarioRunner::with_assumptions(assumptions.clone());

    let outcome = |name: String, change: Option<ContributionChange>, member: &MemberFinancialProfile| {
        let scenario = status_quo_scenario(member, &runner);
        WhatIfOutcome {
            name,
            change,
            target_achievement: target_achievement(member, &scenario, assumptions),
            scenario,
        }
    };

    let baseline = outcome(STATUS_QUO.to_string(), None, profile);

    let scenarios = changes
        .iter()
        .map(|change| {
            let modified = change.apply(profile)?;
            let name = change.name.clone().unwrap_or_else(|| "What-If Scenario".to_string());
            Ok(outcome(name, Some(change.clone()), &modified))
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("member {}: {} what-if contribution scenarios", profile.member_id, scenarios.len());

    Ok(ContributionWhatIf {
        member_id: profile.member_id.clone(),
        baseline,
        scenarios,
    })
}
