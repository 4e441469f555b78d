//! What-if and Monte Carlo simulator
//!
//! A simulation projects the member's current plan, varies one input at a
//! time across a parameter grid, runs the deterministic stress tests and
//! summarizes the comparison with short textual insights. The stochastic
//! Monte Carlo projection lives in [`monte_carlo`].

pub mod monte_carlo;
mod params;
mod stress;

pub use monte_carlo::{
    run_monte_carlo, run_monte_carlo_entropy, run_monte_carlo_seeded, MonteCarloConfig, MonteCarloResult,
    Percentiles, MAX_SIMULATIONS, MIN_SIMULATIONS,
};
pub use params::{MarketRegime, SimulationParameters};
pub use stress::{
    inflation_stress, longevity_stress, market_stress, run_stress_tests, sequence_of_returns_stress, StressTest,
};

use serde::{Deserialize, Serialize};

use crate::assumptions::PlanningAssumptions;
use crate::error::Result;
use crate::profile::MemberFinancialProfile;
use crate::scenario::{Scenario, ScenarioRunner};

/// The single input a grid scenario varies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum GridAxis {
    Contribution { change: f64 },
    RetirementAge { change: i32 },
    ReturnRate { rate: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridScenario {
    pub variation: GridAxis,
    #[serde(flatten)]
    pub scenario: Scenario,
}

/// One scenario per grid value, each varying a single input of the baseline
pub fn build_grid(
    profile: &MemberFinancialProfile,
    params: &SimulationParameters,
    baseline: &Scenario,
    runner: &ScenarioRunner,
) -> Vec<GridScenario> {
    let base = baseline.parameters;
    let income = profile.annual_income;
    let mut grid = Vec::new();

    for &change in &params.contribution_changes {
        let name = if change >= 0.0 {
            format!("Contribution +${}", change)
        } else {
            format!("Contribution -${}", -change)
        };
        let contribution = (base.annual_contribution + change).max(0.0);
        grid.push(GridScenario {
            variation: GridAxis::Contribution { change },
            scenario: runner.run(name, base.with_contribution(contribution), income),
        });
    }

    for &change in &params.retirement_age_changes {
        let name = format!("Retirement {:+} years", change);
        grid.push(GridScenario {
            variation: GridAxis::RetirementAge { change },
            scenario: runner.run(name, base.with_retirement_age(base.retirement_age + change), income),
        });
    }

    for &rate in &params.return_rates {
        let name = format!("{}% Annual Return", (rate * 100.0).round());
        grid.push(GridScenario {
            variation: GridAxis::ReturnRate { rate },
            scenario: runner.run(name, base.with_return(rate), income),
        });
    }

    grid
}

/// A grid scenario measured against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub scenario: String,
    pub projected_value: f64,
    /// Percent change against the baseline projection
    pub change_pct: f64,
}

impl CaseSummary {
    fn new(scenario: &Scenario, baseline: &Scenario) -> Self {
        let reference = baseline.results.projected_value;
        let change_pct = if reference > 0.0 {
            ((scenario.results.projected_value / reference - 1.0) * 100.0).round()
        } else {
            0.0
        };

        Self {
            scenario: scenario.name.clone(),
            projected_value: scenario.results.projected_value,
            change_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonAnalysis {
    pub baseline_projected_value: f64,
    pub baseline_income_replacement: f64,
    pub best_case: Option<CaseSummary>,
    pub worst_case: Option<CaseSummary>,
    pub passed_tests: usize,
    pub total_tests: usize,
    pub insights: Vec<String>,
}

fn highest<'a>(scenarios: impl Iterator<Item = &'a GridScenario>) -> Option<&'a GridScenario> {
    scenarios.max_by(|a, b| {
        a.scenario
            .results
            .projected_value
            .total_cmp(&b.scenario.results.projected_value)
    })
}

fn insights(baseline: &Scenario, grid: &[GridScenario], stress_tests: &[StressTest]) -> Vec<String> {
    let mut insights = Vec::new();
    let baseline_value = baseline.results.projected_value;

    let best_contribution = highest(
        grid.iter()
            .filter(|g| matches!(g.variation, GridAxis::Contribution { .. })),
    );
    if let Some(GridScenario {
        variation: GridAxis::Contribution { change },
        scenario,
    }) = best_contribution
    {
        if baseline_value > 0.0 {
            let improvement = ((scenario.results.projected_value / baseline_value - 1.0) * 100.0).round();
            insights.push(format!(
                "Increasing contributions by ${} could improve retirement value by {}%",
                change, improvement
            ));
        }
    }

    let delays_retirement = grid
        .iter()
        .any(|g| matches!(g.variation, GridAxis::RetirementAge { change } if change > 0));
    if delays_retirement {
        insights.push("Delaying retirement could significantly boost retirement savings due to compound growth".to_string());
    }

    let bear_market_exposed = stress_tests.iter().any(|t| {
        matches!(t, StressTest::Market { regime, vs_baseline_pct, .. }
            if regime.name.contains("Bear") && *vs_baseline_pct < -30.0)
    });
    if bear_market_exposed {
        insights.push(
            "Portfolio is vulnerable to prolonged bear markets - consider more conservative allocation near retirement"
                .to_string(),
        );
    }

    let inflation_exposed = stress_tests.iter().any(|t| {
        matches!(t, StressTest::Inflation { scenario, .. }
            if scenario.results.projected_value < baseline_value * 0.8)
    });
    if inflation_exposed {
        insights.push(
            "High inflation poses significant risk to purchasing power - consider inflation-protected investments"
                .to_string(),
        );
    }

    insights
}

/// Best and worst grid cases, stress-test tally and insights
pub fn compare_scenarios(baseline: &Scenario, grid: &[GridScenario], stress_tests: &[StressTest]) -> ComparisonAnalysis {
    let worst = grid.iter().min_by(|a, b| {
        a.scenario
            .results
            .projected_value
            .total_cmp(&b.scenario.results.projected_value)
    });

    ComparisonAnalysis {
        baseline_projected_value: baseline.results.projected_value,
        baseline_income_replacement: baseline.results.income_replacement_pct.round(),
        best_case: highest(grid.iter()).map(|g| CaseSummary::new(&g.scenario, baseline)),
        worst_case: worst.map(|g| CaseSummary::new(&g.scenario, baseline)),
        passed_tests: stress_tests.iter().filter(|t| t.passed() == Some(true)).count(),
        total_tests: stress_tests.len(),
        insights: insights(baseline, grid, stress_tests),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfSimulation {
    pub member_id: String,
    pub baseline: Scenario,
    pub scenarios: Vec<GridScenario>,
    pub stress_tests: Vec<StressTest>,
    pub analysis: ComparisonAnalysis,
    pub parameters: SimulationParameters,
}

/// Full what-if simulation for one member
pub fn run_what_if_simulation(
    profile: &MemberFinancialProfile,
    params: &SimulationParameters,
    assumptions: &PlanningAssumptions,
) -> Result<WhatIfSimulation> {
    profile.validate()?;
    params.validate()?;

    let runner = ScenarioRunner::with_assumptions(assumptions.clone());
    let baseline = runner.baseline(profile);
    let scenarios = build_grid(profile, params, &baseline, &runner);
    let stress_tests = run_stress_tests(profile, params, &baseline, &runner);
    let analysis = compare_scenarios(&baseline, &scenarios, &stress_tests);

    log::debug!(
        "member {}: {} grid scenarios, {}/{} stress tests passed",
        profile.member_id,
        scenarios.len(),
        analysis.passed_tests,
        analysis.total_tests
    );

    Ok(WhatIfSimulation {
        member_id: profile.member_id.clone(),
        baseline,
        scenarios,
        stress_tests,
        analysis,
        parameters: params.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::profile::sample_profile;
    use approx::assert_relative_eq;

    fn simulate(profile: &MemberFinancialProfile) -> WhatIfSimulation {
        run_what_if_simulation(
            profile,
            &SimulationParameters::default(),
            &PlanningAssumptions::default_planning(),
        )
        .unwrap()
    }

    #[test]
    fn test_grid_varies_one_input() {
        let result = simulate(&sample_profile());

        assert_relative_eq!(result.baseline.results.projected_value, 1_363_250.34, epsilon = 0.01);
        assert_eq!(result.scenarios.len(), 4 + 5 + 5);

        let names: Vec<&str> = result.scenarios.iter().map(|g| g.scenario.name.as_str()).collect();
        assert!(names.contains(&"Contribution +$1000"));
        assert!(names.contains(&"Retirement -2 years"));
        assert!(names.contains(&"Retirement +1 years"));
        assert!(names.contains(&"5% Annual Return"));

        let plus_one = result
            .scenarios
            .iter()
            .find(|g| g.scenario.name == "Retirement +1 years")
            .unwrap();
        assert_eq!(plus_one.scenario.parameters.retirement_age, 66);
        assert_eq!(plus_one.scenario.parameters.annual_contribution, 6_000.0);
        assert_eq!(plus_one.scenario.parameters.annual_return, 0.07);
        assert!(result.scenarios.iter().all(|g| g.scenario.is_consistent()));
    }

    #[test]
    fn test_comparison_analysis() {
        let mut profile = sample_profile();
        profile.investment_type = "Equity Fund".to_string();
        let result = simulate(&profile);
        let analysis = &result.analysis;

        assert_eq!(analysis.best_case.as_ref().unwrap().scenario, "9% Annual Return");
        assert!(analysis.best_case.as_ref().unwrap().change_pct > 0.0);
        assert_eq!(analysis.worst_case.as_ref().unwrap().scenario, "5% Annual Return");
        assert_eq!(analysis.total_tests, 7);
        // sequence survives; 30 years at 4% outlasts the corpus
        assert_eq!(analysis.passed_tests, 1);

        assert!(analysis.insights[0].starts_with("Increasing contributions by $5000"));
        assert!(analysis
            .insights
            .iter()
            .any(|i| i.starts_with("Delaying retirement")));
        assert!(analysis.insights.iter().any(|i| i.starts_with("Portfolio is vulnerable")));
        assert!(analysis.insights.iter().any(|i| i.starts_with("High inflation")));
    }

    #[test]
    fn test_empty_grid_has_no_cases() {
        let params = SimulationParameters {
            contribution_changes: vec![],
            retirement_age_changes: vec![],
            return_rates: vec![],
            ..Default::default()
        };
        let result = run_what_if_simulation(&sample_profile(), &params, &PlanningAssumptions::default_planning()).unwrap();

        assert!(result.scenarios.is_empty());
        assert!(result.analysis.best_case.is_none());
        assert!(result.analysis.worst_case.is_none());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let params = SimulationParameters {
            return_rates: vec![-1.5],
            ..Default::default()
        };
        let outcome = run_what_if_simulation(&sample_profile(), &params, &PlanningAssumptions::default_planning());
        assert!(matches!(outcome, Err(AnalyticsError::InvalidParameterRange { .. })));
    }

    #[test]
    fn test_negative_contribution_change_name() {
        let params = SimulationParameters {
            contribution_changes: vec![-500.0],
            ..Default::default()
        };
        let runner = ScenarioRunner::new();
        let profile = sample_profile();
        let baseline = runner.baseline(&profile);
        let grid = build_grid(&profile, &params, &baseline, &runner);
        assert_eq!(grid[0].scenario.name, "Contribution -$500");
        assert_eq!(grid[0].scenario.parameters.annual_contribution, 5_500.0);
    }
}
