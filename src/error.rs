//! Error types for the analytics core

use thiserror::Error;

/// Result alias used across the analytics modules
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// No member matched the requested identifier
    #[error("Member profile not found: {member_id}")]
    ProfileNotFound { member_id: String },

    /// Requested more clusters than there are members
    #[error("Not enough members ({available}) for {required} clusters")]
    InsufficientMembers { required: usize, available: usize },

    /// Input outside the range the calculations are defined for
    #[error("Invalid value for {parameter}: {message}")]
    InvalidParameterRange { parameter: String, message: String },

    /// Retirement-age solver exhausted its iteration cap
    #[error("Target corpus {target_corpus:.2} not reachable from age {current_age} within {cap_years} years")]
    UnreachableTarget {
        current_age: i32,
        target_corpus: f64,
        cap_years: u32,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyticsError {
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameterRange {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn not_found(member_id: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            member_id: member_id.into(),
        }
    }
}

/// Per-member failure recorded by bulk operations instead of aborting the batch
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MemberFailure {
    pub member_id: String,
    pub error: String,
}

impl MemberFailure {
    pub fn new(member_id: impl Into<String>, error: &AnalyticsError) -> Self {
        Self {
            member_id: member_id.into(),
            error: error.to_string(),
        }
    }
}

/// Split per-member outcomes into successes and recorded failures
pub fn split_outcomes<T>(outcomes: Vec<(String, Result<T>)>) -> (Vec<T>, Vec<MemberFailure>) {
    let mut successes = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();

    for (member_id, outcome) in outcomes {
        match outcome {
            Ok(value) => successes.push(value),
            Err(err) => {
                log::warn!("member {} skipped: {}", member_id, err);
                failures.push(MemberFailure::new(member_id, &err));
            }
        }
    }

    (successes, failures)
}
