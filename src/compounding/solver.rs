//! Retirement-age solver
//!
//! Rolls a corpus forward one year at a time until it reaches the target.
//! The loop is capped so it always terminates; hitting the cap is reported
//! as `Unreachable` rather than as a plausible age.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Hard cap on the number of years the solver will roll forward
pub const MAX_SOLVER_YEARS: u32 = 100;

/// Outcome of a retirement-age solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetirementAgeOutcome {
    /// Target reached after `years` of accumulation
    Reached { age: i32, years: u32, corpus: f64 },
    /// Cap exhausted; `cap_age` is `current_age + MAX_SOLVER_YEARS`
    Unreachable { cap_age: i32, corpus: f64 },
}

impl RetirementAgeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, RetirementAgeOutcome::Reached { .. })
    }

    /// The solved age, or `None` for the unreachable sentinel
    pub fn age(&self) -> Option<i32> {
        match self {
            RetirementAgeOutcome::Reached { age, .. } => Some(*age),
            RetirementAgeOutcome::Unreachable { .. } => None,
        }
    }

    /// Convert the sentinel into an `UnreachableTarget` error
    pub fn into_result(self, current_age: i32, target_corpus: f64) -> Result<i32> {
        match self {
            RetirementAgeOutcome::Reached { age, .. } => Ok(age),
            RetirementAgeOutcome::Unreachable { .. } => Err(AnalyticsError::UnreachableTarget {
                current_age,
                target_corpus,
                cap_years: MAX_SOLVER_YEARS,
            }),
        }
    }
}

/// Age at which `current_corpus` plus level contributions reaches `target_corpus`
///
/// Each year applies `corpus = corpus * (1 + r) + contribution`.
pub fn solve_retirement_age(
    current_age: i32,
    target_corpus: f64,
    annual_contribution: f64,
    annual_return: f64,
    current_corpus: f64,
) -> Result<RetirementAgeOutcome> {
    if current_age < 0 {
        return Err(AnalyticsError::invalid_parameter(
            "current_age",
            format!("must not be negative, got {}", current_age),
        ));
    }
    if annual_return <= -1.0 {
        return Err(AnalyticsError::invalid_parameter(
            "annual_return",
            format!("must exceed -100%, got {}", annual_return),
        ));
    }
    if !target_corpus.is_finite() {
        return Err(AnalyticsError::invalid_parameter("target_corpus", "must be finite"));
    }

    let mut years = 0u32;
    let mut corpus = current_corpus;

    while corpus < target_corpus && years < MAX_SOLVER_YEARS {
        years += 1;
        corpus = corpus * (1.0 + annual_return) + annual_contribution;
    }

    if corpus >= target_corpus {
        Ok(RetirementAgeOutcome::Reached {
            age: current_age + years as i32,
            years,
            corpus,
        })
    } else {
        log::debug!(
            "retirement-age solve capped at {} years (corpus {:.2} < target {:.2})",
            MAX_SOLVER_YEARS,
            corpus,
            target_corpus
        );
        Ok(RetirementAgeOutcome::Unreachable {
            cap_age: current_age + MAX_SOLVER_YEARS as i32,
            corpus,
        })
    }
}
