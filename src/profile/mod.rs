//! Member profile data structures, CSV loading and the provider seam

mod data;
pub mod loader;
mod provider;

pub use data::{risk_ordinal, MemberFinancialProfile, RiskTolerance};
pub use loader::{load_default_profiles, load_profiles, load_profiles_from_reader};
pub use provider::{InMemoryProfiles, MemberProfileProvider, ProfileFilter};

#[cfg(test)]
pub(crate) use data::sample_profile;
