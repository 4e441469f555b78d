//! Deterministic stress tests

use serde::{Deserialize, Serialize};

use crate::allocation::estimated_equity_exposure;
use crate::profile::MemberFinancialProfile;
use crate::scenario::{Scenario, ScenarioRunner};

use super::params::{MarketRegime, SimulationParameters};

/// Loss applied in the first year of retirement
pub const SEQUENCE_FIRST_YEAR_LOSS: f64 = 0.20;
/// Return earned after the first-year loss
pub const SEQUENCE_RECOVERY_RETURN: f64 = 0.08;
/// Retirement length assumed by the sequence test
pub const SEQUENCE_RETIREMENT_YEARS: i32 = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StressTest {
    Market {
        regime: MarketRegime,
        /// Equity share in percent
        equity_allocation: f64,
        blended_return: f64,
        scenario: Scenario,
        /// Change against the baseline projection, in percent
        vs_baseline_pct: f64,
    },
    SequenceOfReturns {
        portfolio_at_retirement: f64,
        after_first_year_loss: f64,
        first_year_withdrawal: f64,
        projected_end_value: f64,
        survives: bool,
    },
    Inflation {
        inflation_rate: f64,
        nominal_return: f64,
        real_return: f64,
        scenario: Scenario,
    },
    Longevity {
        life_expectancy: i32,
        retirement_years: i32,
        projected_retirement_value: f64,
        annual_withdrawal: f64,
        total_withdrawals: f64,
        sufficient: bool,
    },
}

impl StressTest {
    pub fn name(&self) -> String {
        match self {
            StressTest::Market { regime, .. } => format!("Market Stress: {}", regime.name),
            StressTest::SequenceOfReturns { .. } => "Sequence of Returns Risk".to_string(),
            StressTest::Inflation { .. } => "High Inflation Stress Test".to_string(),
            StressTest::Longevity { .. } => "Longevity Stress Test".to_string(),
        }
    }

    /// Outcome of survival-style tests; `None` for comparative ones
    pub fn passed(&self) -> Option<bool> {
        match self {
            StressTest::SequenceOfReturns { survives, .. } => Some(*survives),
            StressTest::Longevity { sufficient, .. } => Some(*sufficient),
            StressTest::Market { .. } | StressTest::Inflation { .. } => None,
        }
    }
}

fn pct_change(value: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        ((value / reference - 1.0) * 100.0).round()
    } else {
        0.0
    }
}

pub fn market_stress(
    profile: &MemberFinancialProfile,
    regime: &MarketRegime,
    baseline: &Scenario,
    runner: &ScenarioRunner,
) -> StressTest {
    let equity_share = estimated_equity_exposure(profile) / 100.0;
    let blended_return = regime.blended_return(equity_share);
    let scenario = runner.run(
        format!("Market Stress: {}", regime.name),
        baseline.parameters.with_return(blended_return),
        profile.annual_income,
    );
    let vs_baseline_pct = pct_change(scenario.results.projected_value, baseline.results.projected_value);

    StressTest::Market {
        regime: regime.clone(),
        equity_allocation: equity_share * 100.0,
        blended_return,
        scenario,
        vs_baseline_pct,
    }
}

/// First-year loss at retirement followed by a withdrawal and recovery growth
pub fn sequence_of_returns_stress(profile: &MemberFinancialProfile, baseline: &Scenario, runner: &ScenarioRunner) -> StressTest {
    let portfolio_at_retirement = baseline.results.projected_value;
    let after_first_year_loss = portfolio_at_retirement * (1.0 - SEQUENCE_FIRST_YEAR_LOSS);
    let first_year_withdrawal = profile.annual_income * runner.assumptions().retirement_spending_ratio;
    let remainder = after_first_year_loss - first_year_withdrawal;
    let projected_end_value = remainder * (1.0 + SEQUENCE_RECOVERY_RETURN).powi(SEQUENCE_RETIREMENT_YEARS - 1);

    StressTest::SequenceOfReturns {
        portfolio_at_retirement,
        after_first_year_loss,
        first_year_withdrawal,
        projected_end_value,
        survives: projected_end_value > 0.0,
    }
}

/// Baseline plan at the nominal return less the worst supplied inflation
pub fn inflation_stress(
    profile: &MemberFinancialProfile,
    params: &SimulationParameters,
    baseline: &Scenario,
    runner: &ScenarioRunner,
) -> StressTest {
    let inflation_rate = params.worst_inflation();
    let nominal_return = runner.assumptions().default_return;
    let real_return = nominal_return - inflation_rate;
    let scenario = runner.run(
        format!("High Inflation ({:.1}%)", inflation_rate * 100.0),
        baseline.parameters.with_return(real_return),
        profile.annual_income,
    );

    StressTest::Inflation {
        inflation_rate,
        nominal_return,
        real_return,
        scenario,
    }
}

/// Level withdrawals at the safe rate until the longest supplied life expectancy
pub fn longevity_stress(params: &SimulationParameters, baseline: &Scenario, runner: &ScenarioRunner) -> StressTest {
    let life_expectancy = params.longest_life_expectancy();
    let retirement_years = (life_expectancy - baseline.parameters.retirement_age).max(0);
    let projected_retirement_value = baseline.results.projected_value;
    let annual_withdrawal = projected_retirement_value * runner.assumptions().safe_withdrawal_rate;
    let total_withdrawals = annual_withdrawal * retirement_years as f64;

    StressTest::Longevity {
        life_expectancy,
        retirement_years,
        projected_retirement_value,
        annual_withdrawal,
        total_withdrawals,
        sufficient: total_withdrawals <= projected_retirement_value,
    }
}

/// Every market regime, then the sequence, inflation and longevity tests
pub fn run_stress_tests(
    profile: &MemberFinancialProfile,
    params: &SimulationParameters,
    baseline: &Scenario,
    runner: &ScenarioRunner,
) -> Vec<StressTest> {
    let mut tests: Vec<StressTest> = params
        .market_scenarios
        .iter()
        .map(|regime| market_stress(profile, regime, baseline, runner))
        .collect();

    tests.push(sequence_of_returns_stress(profile, baseline, runner));
    tests.push(inflation_stress(profile, params, baseline, runner));
    tests.push(longevity_stress(params, baseline, runner));
    tests
}
