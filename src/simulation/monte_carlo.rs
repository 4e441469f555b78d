//! Monte Carlo projection of the retirement corpus
//!
//! Each run compounds the member's savings with the fixed annual contribution
//! under normally distributed yearly returns drawn by Box-Muller. The random
//! source is injected so a seeded generator reproduces a run exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::assumptions::PlanningAssumptions;
use crate::error::{AnalyticsError, Result};
use crate::profile::MemberFinancialProfile;

pub const MIN_SIMULATIONS: usize = 100;
pub const MAX_SIMULATIONS: usize = 10_000;

/// Configuration for Monte Carlo simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Requested runs, clamped to `MIN_SIMULATIONS..=MAX_SIMULATIONS`
    pub simulations: usize,
    pub mean_return: f64,
    pub volatility: f64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: 1_000,
            mean_return: 0.07,
            volatility: 0.12,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn effective_simulations(&self) -> usize {
        self.simulations.clamp(MIN_SIMULATIONS, MAX_SIMULATIONS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl Percentiles {
    /// Nearest-rank percentiles of an ascending slice
    fn from_sorted(sorted: &[f64]) -> Self {
        let at = |q: f64| {
            if sorted.is_empty() {
                return 0.0;
            }
            let index = ((sorted.len() as f64 * q).floor() as usize).min(sorted.len() - 1);
            sorted[index]
        };

        Self {
            p10: at(0.10),
            p25: at(0.25),
            p50: at(0.50),
            p75: at(0.75),
            p90: at(0.90),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub member_id: String,
    pub simulations: usize,
    pub years_to_retirement: i32,
    pub percentiles: Percentiles,
    pub mean: f64,
    /// Fraction of runs reaching the target corpus
    pub success_rate: f64,
    pub target: f64,
}

/// Standard normal draw via the Box-Muller transform
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - [0, 1) keeps u1 away from zero
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn simulate_path<R: Rng + ?Sized>(
    start: f64,
    contribution: f64,
    years: i32,
    config: &MonteCarloConfig,
    rng: &mut R,
) -> f64 {
    let mut value = start;
    for _ in 0..years {
        let annual_return = config.mean_return + config.volatility * standard_normal(rng);
        value = value * (1.0 + annual_return) + contribution;
    }
    value
}

/// Simulate the member's corpus at retirement
pub fn run_monte_carlo<R: Rng + ?Sized>(
    profile: &MemberFinancialProfile,
    config: &MonteCarloConfig,
    assumptions: &PlanningAssumptions,
    rng: &mut R,
) -> Result<MonteCarloResult> {
    profile.validate()?;
    let years = profile.years_to_retirement();
    if years <= 0 {
        return Err(AnalyticsError::invalid_parameter(
            "retirement_age_goal",
            format!(
                "retirement age {} must exceed current age {} (member {})",
                profile.retirement_age_goal, profile.age, profile.member_id
            ),
        ));
    }
    if config.volatility < 0.0 || !config.volatility.is_finite() || !config.mean_return.is_finite() {
        return Err(AnalyticsError::invalid_parameter(
            "volatility",
            format!("expected a finite non-negative volatility, got {}", config.volatility),
        ));
    }

    let simulations = config.effective_simulations();
    let contribution = profile.annual_contribution();

    let mut finals: Vec<f64> = (0..simulations)
        .map(|_| simulate_path(profile.current_savings, contribution, years, config, rng))
        .collect();
    finals.sort_by(|a, b| a.total_cmp(b));

    let target = assumptions.target_corpus(profile.annual_income);
    let successes = finals.iter().filter(|v| **v >= target).count();
    let mean = finals.iter().sum::<f64>() / simulations as f64;

    log::debug!(
        "member {}: {} Monte Carlo runs over {} years, {} reached target",
        profile.member_id,
        simulations,
        years,
        successes
    );

    Ok(MonteCarloResult {
        member_id: profile.member_id.clone(),
        simulations,
        years_to_retirement: years,
        percentiles: Percentiles::from_sorted(&finals),
        mean,
        success_rate: successes as f64 / simulations as f64,
        target,
    })
}

/// Reproducible run from a fixed seed
pub fn run_monte_carlo_seeded(
    profile: &MemberFinancialProfile,
    config: &MonteCarloConfig,
    assumptions: &PlanningAssumptions,
    seed: u64,
) -> Result<MonteCarloResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    run_monte_carlo(profile, config, assumptions, &mut rng)
}

/// Run seeded from the operating system's entropy source
pub fn run_monte_carlo_entropy(
    profile: &MemberFinancialProfile,
    config: &MonteCarloConfig,
    assumptions: &PlanningAssumptions,
) -> Result<MonteCarloResult> {
    let mut rng = StdRng::from_entropy();
    run_monte_carlo(profile, config, assumptions, &mut rng)
}
