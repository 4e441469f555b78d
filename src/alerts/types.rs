//! Alert, severity and risk-level types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of the rule that raised an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskAlertType {
    WithdrawalRate,
    AssetAllocation,
    SavingsGap,
    MarketRisk,
    InflationRisk,
    LongevityRisk,
}

impl RiskAlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskAlertType::WithdrawalRate => "WITHDRAWAL_RATE",
            RiskAlertType::AssetAllocation => "ASSET_ALLOCATION",
            RiskAlertType::SavingsGap => "SAVINGS_GAP",
            RiskAlertType::MarketRisk => "MARKET_RISK",
            RiskAlertType::InflationRisk => "INFLATION_RISK",
            RiskAlertType::LongevityRisk => "LONGEVITY_RISK",
        }
    }
}

/// Severity of a single alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Aggregate risk level of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [RiskLevel::Critical, RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Parse a level name, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(RiskLevel::Low),
            "MEDIUM" => Some(RiskLevel::Medium),
            "HIGH" => Some(RiskLevel::High),
            "CRITICAL" => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

/// Urgency of a recommended follow-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A single triggered risk rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    #[serde(rename = "type")]
    pub alert_type: RiskAlertType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Named figures backing the alert (flags are encoded as 1.0 / 0.0)
    pub metrics: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
}

impl RiskAlert {
    pub fn new(
        alert_type: RiskAlertType,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            alert_type,
            severity,
            title: title.into(),
            description: description.into(),
            metrics: BTreeMap::new(),
            recommendations: Vec::new(),
        }
    }

    pub fn metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    pub fn recommend<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommendations.extend(items.into_iter().map(Into::into));
        self
    }
}

/// Concrete follow-up derived from the alert types present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: Priority,
    pub category: String,
    pub action: String,
    pub timeline: String,
}

impl ActionItem {
    pub fn new(priority: Priority, category: &str, action: &str, timeline: &str) -> Self {
        Self {
            priority,
            category: category.to_string(),
            action: action.to_string(),
            timeline: timeline.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_and_labels() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert_eq!(RiskLevel::from_label("critical"), Some(RiskLevel::Critical));
        assert_eq!(RiskLevel::from_label("severe"), None);
    }

    #[test]
    fn test_alert_serializes_type_tag() {
        let alert = RiskAlert::new(RiskAlertType::SavingsGap, Severity::High, "t", "d").metric("savings_gap", 10.0);
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "SAVINGS_GAP");
        assert_eq!(json["severity"], "HIGH");
        assert_eq!(json["metrics"]["savings_gap"], 10.0);
    }
}
