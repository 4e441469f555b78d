//! Scenario runner shared by the contribution planner and the simulator
//!
//! Every scenario's projected value is produced here from its parameters via
//! `compounding::future_value`, so no caller recomputes growth on its own.

use serde::{Deserialize, Serialize};

use crate::assumptions::PlanningAssumptions;
use crate::compounding::{future_value, income_replacement_pct, sustainable_withdrawal};
use crate::profile::MemberFinancialProfile;

/// Inputs that fully determine a scenario's projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    pub current_age: i32,
    pub retirement_age: i32,
    pub current_savings: f64,
    pub annual_contribution: f64,
    pub annual_return: f64,
}

impl ScenarioParameters {
    /// Parameters reflecting the member's current plan at the given return
    pub fn from_profile(profile: &MemberFinancialProfile, annual_return: f64) -> Self {
        Self {
            current_age: profile.age,
            retirement_age: profile.retirement_age_goal,
            current_savings: profile.current_savings,
            annual_contribution: profile.annual_contribution(),
            annual_return,
        }
    }

    pub fn years_to_retirement(&self) -> i32 {
        self.retirement_age - self.current_age
    }

    pub fn with_contribution(mut self, annual_contribution: f64) -> Self {
        self.annual_contribution = annual_contribution;
        self
    }

    pub fn with_retirement_age(mut self, retirement_age: i32) -> Self {
        self.retirement_age = retirement_age;
        self
    }

    pub fn with_return(mut self, annual_return: f64) -> Self {
        self.annual_return = annual_return;
        self
    }

    /// Projected value at retirement for these parameters
    pub fn projected_value(&self) -> f64 {
        future_value(
            self.current_savings,
            self.annual_contribution,
            self.annual_return,
            self.years_to_retirement(),
        )
    }
}

/// Outputs derived from a scenario's parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResults {
    pub projected_value: f64,
    pub sustainable_withdrawal: f64,
    /// Sustainable withdrawal as a percentage of current income
    pub income_replacement_pct: f64,
    pub years_to_retirement: i32,
    /// Sum of contributions made until retirement
    pub contribution_total: f64,
}

/// A named projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub parameters: ScenarioParameters,
    pub results: ScenarioResults,
}

impl Scenario {
    /// Whether the stored projection still matches the parameters
    pub fn is_consistent(&self) -> bool {
        let expected = self.parameters.projected_value();
        (self.results.projected_value - expected).abs() <= 1e-9 * expected.abs().max(1.0)
    }
}

/// Runner holding the planning assumptions used to derive scenario results
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let base = ScenarioParameters::from_profile(&profile, 0.07);
///
/// for rate in [0.05, 0.06, 0.07] {
///     let scenario = runner.run("rate", base.with_return(rate), profile.annual_income);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    assumptions: PlanningAssumptions,
}

impl ScenarioRunner {
    /// Create runner with default planning assumptions
    pub fn new() -> Self {
        Self {
            assumptions: PlanningAssumptions::default_planning(),
        }
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: PlanningAssumptions) -> Self {
        Self { assumptions }
    }

    /// Project a single scenario
    pub fn run(&self, name: impl Into<String>, parameters: ScenarioParameters, annual_income: f64) -> Scenario {
        let projected_value = parameters.projected_value();
        let years = parameters.years_to_retirement();
        let withdrawal_rate = self.assumptions.safe_withdrawal_rate;

        Scenario {
            name: name.into(),
            parameters,
            results: ScenarioResults {
                projected_value,
                sustainable_withdrawal: sustainable_withdrawal(projected_value, withdrawal_rate),
                income_replacement_pct: income_replacement_pct(projected_value, withdrawal_rate, annual_income),
                years_to_retirement: years,
                contribution_total: parameters.annual_contribution * years.max(0) as f64,
            },
        }
    }

    /// Member's current plan at the default assumed return
    pub fn baseline(&self, profile: &MemberFinancialProfile) -> Scenario {
        let parameters = ScenarioParameters::from_profile(profile, self.assumptions.default_return);
        self.run("Current Plan", parameters, profile.annual_income)
    }

    /// Project several named parameter sets for the same member
    pub fn run_scenarios(&self, variations: &[(String, ScenarioParameters)], annual_income: f64) -> Vec<Scenario> {
        variations
            .iter()
            .map(|(name, parameters)| self.run(name.clone(), *parameters, annual_income))
            .collect()
    }

    pub fn assumptions(&self) -> &PlanningAssumptions {
        &self.assumptions
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
