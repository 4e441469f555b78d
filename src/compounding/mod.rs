//! Compounding primitives used by every projection in the crate
//!
//! All growth figures (scenarios, alerts, stress tests) are computed through
//! `future_value` so the same contract applies everywhere:
//! - `years <= 0` returns the present value unchanged
//! - a zero rate degrades to simple accumulation of contributions
//! - otherwise lump-sum growth plus an ordinary annuity of contributions

mod readiness;
mod solver;

pub use readiness::{retirement_readiness, RetirementReadiness};
pub use solver::{solve_retirement_age, RetirementAgeOutcome, MAX_SOLVER_YEARS};

/// Future value of a lump sum plus level end-of-year contributions
pub fn future_value(present: f64, annual_contribution: f64, annual_return: f64, years: i32) -> f64 {
    if years <= 0 {
        return present;
    }

    if annual_return == 0.0 {
        return present + annual_contribution * years as f64;
    }

    let growth = (1.0 + annual_return).powi(years);
    let lump_sum = present * growth;
    let annuity = annual_contribution * (growth - 1.0) / annual_return;

    lump_sum + annuity
}

/// Additional level annual contribution that closes `gap` after `years`
///
/// Inverts the ordinary-annuity future value: `gap * r / ((1+r)^n - 1)`.
/// Returns zero when there is no gap, and the whole gap when there is no
/// time left to spread it over.
pub fn additional_contribution_for_gap(gap: f64, annual_return: f64, years: i32) -> f64 {
    if gap <= 0.0 {
        return 0.0;
    }
    if years <= 0 {
        return gap;
    }
    if annual_return == 0.0 {
        return gap / years as f64;
    }

    gap * annual_return / ((1.0 + annual_return).powi(years) - 1.0)
}

/// Annual income a corpus supports at the given withdrawal rate
pub fn sustainable_withdrawal(corpus: f64, withdrawal_rate: f64) -> f64 {
    corpus * withdrawal_rate
}

/// Sustainable withdrawal as a percentage of income (0 when income is unknown)
pub fn income_replacement_pct(corpus: f64, withdrawal_rate: f64, annual_income: f64) -> f64 {
    if annual_income > 0.0 {
        sustainable_withdrawal(corpus, withdrawal_rate) / annual_income * 100.0
    } else {
        0.0
    }
}
