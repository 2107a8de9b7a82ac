//! Helper Match - job matching service for the helper marketplace
//!
//! This library ranks job postings for a worker. Every posting is scored on
//! independent dimensions (title, type, location, salary, skills, ...), the
//! dimensions are blended by a named weighting profile, and the ranked list
//! comes back with a per-dimension breakdown and human-readable reasons.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Dimension, Matcher, RankError, ScoringContext, WeightingProfile};
pub use crate::models::{ExclusionSet, JobPosting, MatchResult, RankRequest, RankResponse, WorkerProfile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::default();
        let names: Vec<&str> = matcher.profiles().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["helper_profile", "preferences"]);
    }
}
