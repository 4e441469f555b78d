//! Savings-level scenarios and the contribution gap

use serde::{Deserialize, Serialize};

use crate::assumptions::PlanningAssumptions;
use crate::compounding::additional_contribution_for_gap;
use crate::profile::MemberFinancialProfile;
use crate::scenario::{Scenario, ScenarioParameters, ScenarioRunner};

pub const STATUS_QUO: &str = "Status Quo";
pub const CURRENT_PORTFOLIO: &str = "Current Portfolio";

/// A contribution level with its projection at the assumed return and at ± the spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionScenario {
    #[serde(flatten)]
    pub scenario: Scenario,
    pub description: String,
    pub monthly_contribution: f64,
    pub optimistic_value: f64,
    pub pessimistic_value: f64,
}

impl ContributionScenario {
    pub fn name(&self) -> &str {
        &self.scenario.name
    }

    pub fn projected_value(&self) -> f64 {
        self.scenario.results.projected_value
    }
}

fn build(
    runner: &ScenarioRunner,
    name: &str,
    description: &str,
    parameters: ScenarioParameters,
    annual_income: f64,
) -> ContributionScenario {
    let spread = runner.assumptions().scenario_return_spread;
    let base_return = parameters.annual_return;

    let scenario = runner.run(name, parameters, annual_income);
    let optimistic = runner.run(name, parameters.with_return(base_return + spread), annual_income);
    let pessimistic = runner.run(name, parameters.with_return(base_return - spread), annual_income);

    ContributionScenario {
        description: description.to_string(),
        monthly_contribution: (parameters.annual_contribution / 12.0).round(),
        optimistic_value: optimistic.results.projected_value,
        pessimistic_value: pessimistic.results.projected_value,
        scenario,
    }
}

/// Status-quo projection of a member's current plan
pub fn status_quo_scenario(profile: &MemberFinancialProfile, runner: &ScenarioRunner) -> ContributionScenario {
    if profile.is_retired() {
        return current_portfolio_scenario(profile, runner);
    }
    let parameters = ScenarioParameters::from_profile(profile, runner.assumptions().default_return);
    build(
        runner,
        STATUS_QUO,
        "Continue current contribution level",
        parameters,
        profile.annual_income,
    )
}

/// The single scenario offered to members already past their retirement goal
pub fn current_portfolio_scenario(profile: &MemberFinancialProfile, runner: &ScenarioRunner) -> ContributionScenario {
    let parameters = ScenarioParameters::from_profile(profile, runner.assumptions().default_return)
        .with_contribution(0.0)
        .with_retirement_age(profile.age);
    build(
        runner,
        CURRENT_PORTFOLIO,
        "Maintain current portfolio with the sustainable withdrawal rule",
        parameters,
        profile.annual_income,
    )
}

/// Status quo, 10% and 15% of income, and the statutory maximum
pub fn contribution_scenarios(profile: &MemberFinancialProfile, runner: &ScenarioRunner) -> Vec<ContributionScenario> {
    if profile.is_retired() {
        return vec![current_portfolio_scenario(profile, runner)];
    }

    let assumptions = runner.assumptions();
    let base = ScenarioParameters::from_profile(profile, assumptions.default_return);
    let income = profile.annual_income;
    let maximum = assumptions.limits.max_contribution(profile.age);

    vec![
        status_quo_scenario(profile, runner),
        build(
            runner,
            "10% Income Savings",
            "Save 10% of annual income",
            base.with_contribution(income * 0.10),
            income,
        ),
        build(
            runner,
            "15% Income Savings",
            "Aggressive savings rate of 15%",
            base.with_contribution(income * 0.15),
            income,
        ),
        build(
            runner,
            "Maximum 401(k)",
            "Contribute maximum allowed to 401(k)",
            base.with_contribution(maximum),
            income,
        ),
    ]
}

/// Shortfall between the status-quo projection and the income-multiple target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContributionGap {
    Retired {
        withdrawal_capacity: f64,
    },
    OnTrack {
        surplus: f64,
    },
    Shortfall {
        gap: f64,
        additional_annual_contribution: f64,
        additional_monthly_contribution: f64,
        /// Additional contribution as a percentage of income (0 without income)
        percentage_of_income: f64,
    },
}

impl ContributionGap {
    pub fn is_on_track(&self) -> bool {
        !matches!(self, ContributionGap::Shortfall { .. })
    }

    pub fn gap(&self) -> Option<f64> {
        match self {
            ContributionGap::Shortfall { gap, .. } => Some(*gap),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ContributionGap::Retired { .. } => "Member is already retired".to_string(),
            ContributionGap::OnTrack { .. } => "On track to meet retirement goals".to_string(),
            ContributionGap::Shortfall {
                additional_annual_contribution,
                ..
            } => format!(
                "Need additional {} annually",
                crate::alerts::format_currency(*additional_annual_contribution)
            ),
        }
    }
}

pub fn contribution_gap(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> ContributionGap {
    if profile.is_retired() {
        return ContributionGap::Retired {
            withdrawal_capacity: (profile.current_savings * assumptions.safe_withdrawal_rate).round(),
        };
    }

    let parameters = ScenarioParameters::from_profile(profile, assumptions.default_return);
    let projected = parameters.projected_value();
    let gap = assumptions.target_corpus(profile.annual_income) - projected;

    if gap <= 0.0 {
        return ContributionGap::OnTrack { surplus: gap.abs().round() };
    }

    let additional = additional_contribution_for_gap(gap, parameters.annual_return, parameters.years_to_retirement());
    let percentage_of_income = if profile.annual_income > 0.0 {
        (additional / profile.annual_income * 100.0).round()
    } else {
        0.0
    };

    ContributionGap::Shortfall {
        gap: gap.round(),
        additional_annual_contribution: additional.round(),
        additional_monthly_contribution: (additional / 12.0).round(),
        percentage_of_income,
    }
}
