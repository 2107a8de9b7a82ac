use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::core::{
    combiner::ScoreCombiner,
    filters::{is_eligible, passes_category_gate},
    reasons::generate_reasons,
    scoring::{compute_breakdown, ScoringContext},
    weights::WeightingProfile,
};
use crate::models::{ExclusionSet, JobPosting, MatchResult, WorkerProfile};

/// Errors returned to the caller of the ranking pipeline
#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown weighting profile: {0}")]
    UnknownProfile(String),
}

/// One page of ranked results
#[derive(Debug)]
pub struct RankedPage {
    pub matches: Vec<MatchResult>,
    /// Postings that passed filtering and were scored
    pub total_candidates: usize,
}

/// A scored posting plus what the tie-break needs
struct Scored {
    result: MatchResult,
    created_at: DateTime<Utc>,
}

/// Main ranking orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility: active, unexpired, unseen, first occurrence of each id
/// 2. Category gate (profiles that enable it)
/// 3. Scoring, weighting and explanations, in parallel
/// 4. Ordering with a deterministic tie-break
/// 5. Offset/limit pagination
#[derive(Debug, Clone)]
pub struct Matcher {
    profiles: HashMap<String, WeightingProfile>,
    combiner: ScoreCombiner,
}

impl Matcher {
    pub fn new(
        profiles: impl IntoIterator<Item = WeightingProfile>,
        combiner: ScoreCombiner,
    ) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.name().to_string(), profile))
                .collect(),
            combiner,
        }
    }

    pub fn with_default_profiles() -> Self {
        Self {
            profiles: WeightingProfile::presets(),
            combiner: ScoreCombiner::default(),
        }
    }

    pub fn profile(&self, name: &str) -> Option<&WeightingProfile> {
        self.profiles.get(name)
    }

    /// Registered profiles, sorted by name
    pub fn profiles(&self) -> Vec<&WeightingProfile> {
        let mut profiles: Vec<_> = self.profiles.values().collect();
        profiles.sort_by(|a, b| a.name().cmp(b.name()));
        profiles
    }

    /// Rank candidate postings for a worker
    ///
    /// # Arguments
    /// * `worker` - The worker's preferences
    /// * `candidates` - Postings fetched from the catalog
    /// * `exclusion` - Job ids the worker has already seen
    /// * `profile_name` - Weighting profile to score with
    /// * `limit` - Page size; zero yields an empty page
    /// * `offset` - Number of ranked results to skip
    /// * `ctx` - The instant scoring is evaluated at
    pub fn rank(
        &self,
        worker: &WorkerProfile,
        candidates: &[JobPosting],
        exclusion: &ExclusionSet,
        profile_name: &str,
        limit: i64,
        offset: i64,
        ctx: &ScoringContext,
    ) -> Result<Vec<MatchResult>, RankError> {
        self.rank_page(worker, candidates, exclusion, profile_name, limit, offset, ctx)
            .map(|page| page.matches)
    }

    /// Same as [`Matcher::rank`] but also reports how many postings were ranked
    pub fn rank_page(
        &self,
        worker: &WorkerProfile,
        candidates: &[JobPosting],
        exclusion: &ExclusionSet,
        profile_name: &str,
        limit: i64,
        offset: i64,
        ctx: &ScoringContext,
    ) -> Result<RankedPage, RankError> {
        validate_worker(worker)?;
        let limit = usize::try_from(limit)
            .map_err(|_| RankError::InvalidInput(format!("limit must not be negative, got {}", limit)))?;
        let offset = usize::try_from(offset)
            .map_err(|_| RankError::InvalidInput(format!("offset must not be negative, got {}", offset)))?;
        let profile = self.resolve(profile_name)?;

        // Stage 1 & 2: eligibility, dedup and category gate
        let mut seen_ids = HashSet::with_capacity(candidates.len());
        let eligible: Vec<&JobPosting> = candidates
            .iter()
            .filter(|job| is_eligible(job, exclusion, ctx.now))
            .filter(|job| seen_ids.insert(job.id.as_str()))
            .filter(|job| !profile.requires_category_match() || passes_category_gate(worker, job))
            .collect();

        let total_candidates = eligible.len();

        if limit == 0 || offset >= total_candidates {
            return Ok(RankedPage {
                matches: Vec::new(),
                total_candidates,
            });
        }

        // Stage 3: score every posting independently
        let mut scored: Vec<Scored> = eligible
            .par_iter()
            .map(|job| Scored {
                result: self.evaluate(worker, job, profile, ctx),
                created_at: job.created_at,
            })
            .collect();

        // Stage 4: only the first offset + limit need a full sort
        let keep = offset.saturating_add(limit);
        if keep < scored.len() {
            scored.select_nth_unstable_by(keep, rank_order);
            scored.truncate(keep);
        }
        scored.sort_unstable_by(rank_order);

        // Stage 5: paginate
        let matches: Vec<MatchResult> = scored
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|s| s.result)
            .collect();

        tracing::debug!(
            "Ranked {} of {} candidates for worker {} with profile {} (returning {})",
            total_candidates,
            candidates.len(),
            worker.id,
            profile_name,
            matches.len()
        );

        Ok(RankedPage {
            matches,
            total_candidates,
        })
    }

    /// Score and explain a single posting without any filtering
    pub fn score_job(
        &self,
        worker: &WorkerProfile,
        job: &JobPosting,
        profile_name: &str,
        ctx: &ScoringContext,
    ) -> Result<MatchResult, RankError> {
        validate_worker(worker)?;
        let profile = self.resolve(profile_name)?;
        Ok(self.evaluate(worker, job, profile, ctx))
    }

    fn resolve(&self, profile_name: &str) -> Result<&WeightingProfile, RankError> {
        self.profiles
            .get(profile_name)
            .ok_or_else(|| RankError::UnknownProfile(profile_name.to_string()))
    }

    fn evaluate(
        &self,
        worker: &WorkerProfile,
        job: &JobPosting,
        profile: &WeightingProfile,
        ctx: &ScoringContext,
    ) -> MatchResult {
        let breakdown = compute_breakdown(worker, job, profile, ctx);
        let boosted = job.boost_active(ctx.now);
        let combined = self.combiner.combine(&breakdown, profile, boosted);
        let reasons = generate_reasons(&breakdown, boosted);

        MatchResult {
            job_id: job.id.clone(),
            score: combined.score,
            breakdown,
            reasons,
            boosted,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_profiles()
    }
}

fn validate_worker(worker: &WorkerProfile) -> Result<(), RankError> {
    if worker.id.trim().is_empty() {
        return Err(RankError::InvalidInput("worker id is required".to_string()));
    }
    Ok(())
}

/// Score descending, then active boost, newer posting, smaller id
fn rank_order(a: &Scored, b: &Scored) -> Ordering {
    b.result
        .score
        .cmp(&a.result.score)
        .then_with(|| b.result.boosted.cmp(&a.result.boosted))
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.result.job_id.cmp(&b.result.job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobSalary, JobStatus, SalaryExpectation, SalaryUnit};
    use chrono::{Duration, TimeZone};

    fn ctx() -> ScoringContext {
        ScoringContext::new(Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap())
    }

    fn create_job(id: &str, salary: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: "Caregiver".to_string(),
            description: String::new(),
            job_type: "caregiver".to_string(),
            location: "Cebu City".to_string(),
            coordinates: None,
            salary: Some(JobSalary::Text(salary.to_string())),
            salary_unit: None,
            required_skills: vec!["cooking".to_string()],
            preferred_languages: vec![],
            required_experience_years: None,
            is_boosted: false,
            boost_expires_at: None,
            created_at: ctx().now - Duration::days(2),
            expires_at: None,
            status: JobStatus::Active,
        }
    }

    fn create_worker() -> WorkerProfile {
        let mut worker = WorkerProfile::new("worker-1");
        worker.desired_job_types = ["caregiver".to_string()].into();
        worker.desired_locations = vec!["Cebu City".to_string()];
        worker.skills = vec!["cooking".to_string(), "cleaning".to_string()];
        worker.salary_expectation = Some(SalaryExpectation {
            min: Some(300.0),
            max: Some(500.0),
            unit: SalaryUnit::Daily,
        });
        worker
    }

    #[test]
    fn test_rank_basic() {
        let matcher = Matcher::with_default_profiles();
        let candidates = vec![create_job("a", "400"), create_job("b", "2000")];

        let results = matcher
            .rank(&create_worker(), &candidates, &ExclusionSet::new(), "helper_profile", 10, 0, &ctx())
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].job_id, "a");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_duplicates_ranked_once() {
        let matcher = Matcher::with_default_profiles();
        let candidates = vec![create_job("a", "400"), create_job("a", "400")];

        let page = matcher
            .rank_page(&create_worker(), &candidates, &ExclusionSet::new(), "helper_profile", 10, 0, &ctx())
            .unwrap();

        assert_eq!(page.total_candidates, 1);
        assert_eq!(page.matches.len(), 1);
    }

    #[test]
    fn test_tie_break_order() {
        let matcher = Matcher::with_default_profiles();
        let now = ctx().now;

        let mut older = create_job("older", "400");
        older.created_at = now - Duration::days(5);
        let newer = create_job("newer", "400");
        let same_b = create_job("b", "400");
        let same_a = create_job("a", "400");

        let results = matcher
            .rank(
                &create_worker(),
                &[older, same_b, newer, same_a],
                &ExclusionSet::new(),
                "helper_profile",
                10,
                0,
                &ctx(),
            )
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "newer", "older"]);
    }

    #[test]
    fn test_invalid_input() {
        let matcher = Matcher::with_default_profiles();
        let exclusion = ExclusionSet::new();

        assert!(matches!(
            matcher.rank(&create_worker(), &[], &exclusion, "helper_profile", -1, 0, &ctx()),
            Err(RankError::InvalidInput(_))
        ));
        assert!(matches!(
            matcher.rank(&create_worker(), &[], &exclusion, "helper_profile", 5, -3, &ctx()),
            Err(RankError::InvalidInput(_))
        ));
        assert!(matches!(
            matcher.rank(&WorkerProfile::new(" "), &[], &exclusion, "helper_profile", 5, 0, &ctx()),
            Err(RankError::InvalidInput(_))
        ));
        assert_eq!(
            matcher.rank(&create_worker(), &[], &exclusion, "unknown", 5, 0, &ctx()),
            Err(RankError::UnknownProfile("unknown".to_string()))
        );
    }

    #[test]
    fn test_zero_limit_returns_empty() {
        let matcher = Matcher::with_default_profiles();
        let results = matcher
            .rank(&create_worker(), &[create_job("a", "400")], &ExclusionSet::new(), "helper_profile", 0, 0, &ctx())
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_category_gate_applies_to_preferences_profile() {
        let matcher = Matcher::with_default_profiles();
        let mut worker = create_worker();
        worker.skills.clear();

        let mut driver = create_job("driver", "400");
        driver.title = "Family Driver".to_string();
        driver.job_type = "driver".to_string();

        let gated = matcher
            .rank(&worker, &[driver.clone()], &ExclusionSet::new(), "preferences", 10, 0, &ctx())
            .unwrap();
        assert!(gated.is_empty());

        let ungated = matcher
            .rank(&worker, &[driver], &ExclusionSet::new(), "helper_profile", 10, 0, &ctx())
            .unwrap();
        assert_eq!(ungated.len(), 1);
    }

    #[test]
    fn test_score_job_explains() {
        let matcher = Matcher::with_default_profiles();
        let result = matcher
            .score_job(&create_worker(), &create_job("a", "400"), "helper_profile", &ctx())
            .unwrap();

        assert!(result.reasons.contains(&"Salary meets your expectations".to_string()));
        assert!(!result.boosted);
    }
}
