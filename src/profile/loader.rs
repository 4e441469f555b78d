//! Load member profiles from a pension-data CSV extract

use super::{MemberFinancialProfile, RiskTolerance};
use crate::error::{AnalyticsError, Result};
use csv::Reader;
use std::path::Path;

/// Default location of the bundled sample extract
pub const DEFAULT_PROFILES_PATH: &str = "data/members_sample.csv";

/// Raw CSV row matching the pension-data extract columns
///
/// Numeric cells may be blank; blanks become zero.
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "User_ID")]
    user_id: String,
    #[serde(rename = "Age")]
    age: Option<i32>,
    #[serde(rename = "Annual_Income")]
    annual_income: Option<f64>,
    #[serde(rename = "Current_Savings")]
    current_savings: Option<f64>,
    #[serde(rename = "Risk_Tolerance", default)]
    risk_tolerance: Option<String>,
    #[serde(rename = "Investment_Type", default)]
    investment_type: Option<String>,
    #[serde(rename = "Retirement_Age_Goal", default)]
    retirement_age_goal: Option<i32>,
    #[serde(rename = "Contribution_Amount", default)]
    contribution_amount: Option<f64>,
    #[serde(rename = "Contribution_Frequency", default)]
    contribution_frequency: Option<String>,
    #[serde(rename = "Employer_Contribution", default)]
    employer_contribution: Option<f64>,
    #[serde(rename = "Total_Annual_Contribution", default)]
    total_annual_contribution: Option<f64>,
    #[serde(rename = "Years_Contributed", default)]
    years_contributed: Option<f64>,
    #[serde(rename = "Annual_Return_Rate", default)]
    annual_return_rate: Option<f64>,
    #[serde(rename = "Volatility", default)]
    volatility: Option<f64>,
    #[serde(rename = "Portfolio_Diversity_Score", default)]
    portfolio_diversity_score: Option<f64>,
    #[serde(rename = "Projected_Pension_Amount", default)]
    projected_pension_amount: Option<f64>,
    #[serde(rename = "Expected_Annual_Payout", default)]
    expected_annual_payout: Option<f64>,
    #[serde(rename = "Inflation_Adjusted_Payout", default)]
    inflation_adjusted_payout: Option<f64>,
    #[serde(rename = "Years_of_Payout", default)]
    years_of_payout: Option<f64>,
    #[serde(rename = "Pension_Type", default)]
    pension_type: Option<String>,
    #[serde(rename = "Withdrawal_Strategy", default)]
    withdrawal_strategy: Option<String>,
    #[serde(rename = "Equity_Allocation", default)]
    equity_allocation: Option<f64>,
}

impl CsvRow {
    fn to_profile(self) -> Result<MemberFinancialProfile> {
        if self.user_id.trim().is_empty() {
            return Err(AnalyticsError::invalid_parameter("User_ID", "must not be blank"));
        }

        let risk_tolerance = match self.risk_tolerance.as_deref() {
            Some(label) if !label.trim().is_empty() => {
                let parsed = RiskTolerance::from_label(label);
                if parsed.is_none() {
                    log::warn!("member {}: unrecognised risk tolerance {:?}", self.user_id, label);
                }
                parsed
            }
            _ => None,
        };

        let profile = MemberFinancialProfile {
            member_id: self.user_id,
            age: self.age.unwrap_or(0),
            annual_income: self.annual_income.unwrap_or(0.0),
            current_savings: self.current_savings.unwrap_or(0.0),
            risk_tolerance,
            investment_type: self.investment_type.unwrap_or_default(),
            retirement_age_goal: self.retirement_age_goal.filter(|&age| age > 0).unwrap_or(65),
            contribution_amount: self.contribution_amount.unwrap_or(0.0),
            contribution_frequency: self.contribution_frequency.unwrap_or_default(),
            employer_contribution: self.employer_contribution.unwrap_or(0.0),
            total_annual_contribution: self.total_annual_contribution.unwrap_or(0.0),
            years_contributed: self.years_contributed.unwrap_or(0.0),
            annual_return_rate: self.annual_return_rate.unwrap_or(0.0),
            volatility: self.volatility.unwrap_or(0.0),
            portfolio_diversity_score: self.portfolio_diversity_score.unwrap_or(0.0),
            projected_pension_amount: self.projected_pension_amount.unwrap_or(0.0),
            expected_annual_payout: self.expected_annual_payout.unwrap_or(0.0),
            inflation_adjusted_payout: self.inflation_adjusted_payout.unwrap_or(0.0),
            years_of_payout: self.years_of_payout.unwrap_or(0.0),
            pension_type: self.pension_type.unwrap_or_default(),
            withdrawal_strategy: self.withdrawal_strategy.unwrap_or_default(),
            equity_allocation: self.equity_allocation,
        };

        profile.validate()?;
        Ok(profile)
    }
}

/// Load all profiles from a CSV file
pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<MemberFinancialProfile>> {
    let reader = Reader::from_path(path.as_ref())?;
    let profiles = read_profiles(reader)?;
    log::info!("loaded {} member profiles from {}", profiles.len(), path.as_ref().display());
    Ok(profiles)
}

/// Load profiles from any reader (e.g., string buffer, network stream)
pub fn load_profiles_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<MemberFinancialProfile>> {
    read_profiles(Reader::from_reader(reader))
}

/// Load profiles from the bundled sample extract
pub fn load_default_profiles() -> Result<Vec<MemberFinancialProfile>> {
    load_profiles(DEFAULT_PROFILES_PATH)
}

/// Malformed CSV aborts the load; rows that fail validation are skipped
fn read_profiles<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<MemberFinancialProfile>> {
    let mut profiles = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let member_id = row.user_id.clone();
        match row.to_profile() {
            Ok(profile) => profiles.push(profile),
            Err(err) => log::warn!("skipping member {}: {}", member_id, err),
        }
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRACT: &str = "\
User_ID,Age,Annual_Income,Current_Savings,Risk_Tolerance,Investment_Type,Retirement_Age_Goal,Contribution_Amount,Total_Annual_Contribution,Annual_Return_Rate,Portfolio_Diversity_Score,Pension_Type,Equity_Allocation
U1001,30,60000,50000,Medium,Mixed Fund,65,6000,,7.0,55,Defined Contribution,
U1002,62,85000,400000,Low,Equity,,12000,15000,,80,Defined Benefit,85
U1003,45,,,Cautious,Bonds,60,,,,,,
";

    #[test]
    fn test_load_profiles_from_reader() {
        let profiles = load_profiles_from_reader(EXTRACT.as_bytes()).expect("Failed to load profiles");
        assert_eq!(profiles.len(), 3);

        let first = &profiles[0];
        assert_eq!(first.member_id, "U1001");
        assert_eq!(first.risk_tolerance, Some(RiskTolerance::Medium));
        assert_eq!(first.total_annual_contribution, 0.0);
        assert_eq!(first.annual_contribution(), 6_000.0);
        assert!(first.equity_allocation.is_none());

        let second = &profiles[1];
        assert_eq!(second.retirement_age_goal, 65);
        assert_eq!(second.equity_allocation, Some(85.0));
        assert_eq!(second.annual_contribution(), 15_000.0);

        let third = &profiles[2];
        assert_eq!(third.annual_income, 0.0);
        assert_eq!(third.current_savings, 0.0);
        assert!(third.risk_tolerance.is_none());
        assert_eq!(third.retirement_age_goal, 60);
    }

    #[test]
    fn test_invalid_row_is_skipped() {
        let mut extract = include_str!("../../data/members_sample.csv").to_string();
        if !extract.ends_with('\n') {
            extract.push('\n');
        }
        extract.push_str("U9999,-5,50000,10000,Medium,Mixed Fund,65,,,,,,,,,,,,,,,\n");

        let profiles = load_profiles_from_reader(extract.as_bytes()).expect("Failed to load profiles");
        assert_eq!(profiles.len(), 12);
        assert!(profiles.iter().all(|p| p.member_id != "U9999"));
    }

    #[test]
    fn test_malformed_csv_fails() {
        let extract = "User_ID,Age,Annual_Income,Current_Savings\nU9,forty,1000,10\n";
        let result = load_profiles_from_reader(extract.as_bytes());
        assert!(matches!(result, Err(AnalyticsError::Csv(_))));
    }

    #[test]
    fn test_load_default_profiles() {
        let profiles = load_default_profiles().expect("Failed to load sample extract");
        assert!(profiles.len() >= 8);
        assert!(profiles.iter().any(|p| p.is_retired()));
    }
}
