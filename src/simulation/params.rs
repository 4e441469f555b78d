//! What-if simulation inputs

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Equity and bond returns of one market regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRegime {
    pub name: String,
    pub equity_return: f64,
    pub bond_return: f64,
}

impl MarketRegime {
    pub fn new(name: &str, equity_return: f64, bond_return: f64) -> Self {
        Self {
            name: name.to_string(),
            equity_return,
            bond_return,
        }
    }

    /// Return of a portfolio holding `equity_share` (0..=1) in equities
    pub fn blended_return(&self, equity_share: f64) -> f64 {
        equity_share * self.equity_return + (1.0 - equity_share) * self.bond_return
    }
}

fn default_market_regimes() -> Vec<MarketRegime> {
    vec![
        MarketRegime::new("Bull Market", 0.12, 0.05),
        MarketRegime::new("Normal Market", 0.08, 0.04),
        MarketRegime::new("Bear Market", 0.03, 0.03),
        MarketRegime::new("Recession", -0.05, 0.02),
    ]
}

/// Grid axes and stress inputs; every list may be overridden independently
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Amounts added to the current annual contribution
    pub contribution_changes: Vec<f64>,
    /// Years added to the retirement-age goal
    pub retirement_age_changes: Vec<i32>,
    pub return_rates: Vec<f64>,
    pub inflation_rates: Vec<f64>,
    pub market_scenarios: Vec<MarketRegime>,
    pub life_expectancy: Vec<i32>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            contribution_changes: vec![0.0, 1000.0, 2000.0, 5000.0],
            retirement_age_changes: vec![-2, -1, 0, 1, 2],
            return_rates: vec![0.05, 0.06, 0.07, 0.08, 0.09],
            inflation_rates: vec![0.02, 0.025, 0.03, 0.035],
            market_scenarios: default_market_regimes(),
            life_expectancy: vec![80, 85, 90, 95],
        }
    }
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self
            .return_rates
            .iter()
            .chain(self.market_scenarios.iter().flat_map(|m| [&m.equity_return, &m.bond_return]))
            .find(|r| **r <= -1.0 || !r.is_finite())
        {
            return Err(AnalyticsError::invalid_parameter(
                "return_rates",
                format!("returns must exceed -100%, got {}", rate),
            ));
        }
        if self.inflation_rates.is_empty() {
            return Err(AnalyticsError::invalid_parameter("inflation_rates", "at least one rate is required"));
        }
        if self.life_expectancy.is_empty() {
            return Err(AnalyticsError::invalid_parameter("life_expectancy", "at least one horizon is required"));
        }
        Ok(())
    }

    /// Highest supplied inflation rate
    pub fn worst_inflation(&self) -> f64 {
        self.inflation_rates.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Longest supplied life expectancy
    pub fn longest_life_expectancy(&self) -> i32 {
        self.life_expectancy.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_partial_override() {
        let params: SimulationParameters = serde_json::from_str(r#"{ "return_rates": [0.04] }"#).unwrap();
        assert_eq!(params.return_rates, vec![0.04]);
        assert_eq!(params.contribution_changes.len(), 4);
        assert_eq!(params.market_scenarios[3].name, "Recession");
        assert_eq!(params.worst_inflation(), 0.035);
        assert_eq!(params.longest_life_expectancy(), 95);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut params = SimulationParameters::default();
        params.return_rates.push(-1.0);
        assert!(params.validate().is_err());

        let params = SimulationParameters {
            life_expectancy: vec![],
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_blended_return() {
        let bear = MarketRegime::new("Bear Market", 0.03, 0.03);
        assert!((bear.blended_return(0.7) - 0.03).abs() < 1e-12);
        let recession = MarketRegime::new("Recession", -0.05, 0.02);
        assert!((recession.blended_return(0.5) + 0.015).abs() < 1e-12);
    }
}
