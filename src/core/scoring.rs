use chrono::{DateTime, Datelike, Duration, FixedOffset, Offset, Utc, Weekday};
use std::collections::{BTreeMap, HashSet};

use crate::core::{
    location::match_location,
    salary::{job_range_with_unit, score_salary},
    weights::{Dimension, WeightingProfile},
};
use crate::models::{JobPosting, WorkerProfile};

/// Score used when a dimension has nothing to compare
pub const NEUTRAL_SCORE: u8 = 50;

/// Words in a posting that signal experience matters
const EXPERIENCE_KEYWORDS: &[&str] = &["experienced", "senior", "expert", "professional", "skilled"];

/// Job titles and types treated as interchangeable
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["caregiver", "yaya", "housekeeper"],
    &["yaya", "nanny", "babysitter"],
    &["kasambahay", "housemaid", "maid", "helper", "all-around helper"],
    &["cook", "kitchen helper", "chef"],
    &["driver", "family driver", "personal driver"],
    &["gardener", "groundskeeper"],
    &["laundry", "labandera"],
    &["elderly care", "caregiver", "nurse aide"],
];

/// Point in time every time-sensitive scorer evaluates against
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext {
    pub now: DateTime<Utc>,
    /// Offset used to decide which weekday "today" is
    pub utc_offset: FixedOffset,
}

impl ScoringContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            utc_offset: Utc.fix(),
        }
    }

    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Weekday of `now` in the configured offset
    pub fn local_weekday(&self) -> Weekday {
        self.now.with_timezone(&self.utc_offset).weekday()
    }
}

/// Compute the per-dimension scores a weighting profile asks for
///
/// Every value is within 0-100. Dimensions the profile doesn't weight are
/// left out.
pub fn compute_breakdown(
    worker: &WorkerProfile,
    job: &JobPosting,
    profile: &WeightingProfile,
    ctx: &ScoringContext,
) -> BTreeMap<Dimension, u8> {
    profile
        .dimensions()
        .map(|dimension| {
            let score = match dimension {
                Dimension::JobTitle => score_job_title(worker, job),
                Dimension::JobType => score_job_type(worker, job, profile.job_type_fallback()),
                Dimension::Location => match_location(worker, job),
                Dimension::Salary => score_salary(
                    worker.salary_expectation.as_ref(),
                    job.salary.as_ref(),
                    job.salary_unit,
                ),
                Dimension::Skills => score_skills(&worker.skills, &job.required_skills),
                Dimension::Experience => score_experience(worker, job),
                Dimension::Availability => score_availability(worker, ctx),
                Dimension::Languages => {
                    score_languages(&worker.preferred_languages, &job.preferred_languages)
                }
                Dimension::Rating => score_rating(worker.rating),
                Dimension::Recency => score_recency(worker.last_active_at, ctx),
                Dimension::Priority => score_priority(job, ctx),
            };
            (dimension, score.min(100))
        })
        .collect()
}

/// Title against the worker's desired titles
///
/// Exact match scores 100, a synonym match scores the share of the synonym
/// group the worker asked for, anything else 0.
pub fn score_job_title(worker: &WorkerProfile, job: &JobPosting) -> u8 {
    match category_score(&job.title, &worker.desired_job_titles) {
        CategoryMatch::NoPreference => NEUTRAL_SCORE,
        CategoryMatch::Exact => 100,
        CategoryMatch::Synonym(score) => score,
        CategoryMatch::Miss => 0,
    }
}

/// Job type against the worker's desired types, with a profile-specific fallback
pub fn score_job_type(worker: &WorkerProfile, job: &JobPosting, fallback: u8) -> u8 {
    match category_score(&job.job_type, &worker.desired_job_types) {
        CategoryMatch::NoPreference => NEUTRAL_SCORE,
        CategoryMatch::Exact => 100,
        CategoryMatch::Synonym(score) => score,
        CategoryMatch::Miss => fallback.min(100),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CategoryMatch {
    NoPreference,
    Exact,
    Synonym(u8),
    Miss,
}

fn category_score(value: &str, desired: &HashSet<String>) -> CategoryMatch {
    let desired: HashSet<String> = desired
        .iter()
        .map(|d| normalize_term(d))
        .filter(|d| !d.is_empty())
        .collect();

    if desired.is_empty() {
        return CategoryMatch::NoPreference;
    }

    let value = normalize_term(value);
    if value.is_empty() {
        return CategoryMatch::Miss;
    }

    if desired.contains(&value) || desired.iter().any(|d| contains_words(&value, d)) {
        return CategoryMatch::Exact;
    }

    SYNONYM_GROUPS
        .iter()
        .filter(|group| group.iter().any(|term| term_matches(&value, term)))
        .filter_map(|group| {
            let matches = group.iter().filter(|term| desired.contains(**term)).count();
            if matches == 0 {
                return None;
            }
            Some((100.0 * matches as f64 / group.len() as f64).round() as u8)
        })
        .max()
        .map_or(CategoryMatch::Miss, CategoryMatch::Synonym)
}

/// Whether a title or type belongs to a synonym group term
fn term_matches(value: &str, term: &str) -> bool {
    value == term || contains_words(value, term)
}

/// True when the worker's titles/types or skills overlap the posting at all
pub fn has_category_overlap(worker: &WorkerProfile, job: &JobPosting) -> bool {
    let title = category_score(&job.title, &worker.desired_job_titles);
    let job_type = category_score(&job.job_type, &worker.desired_job_types);

    if title == CategoryMatch::NoPreference && job_type == CategoryMatch::NoPreference {
        return true;
    }

    let category_hit = |m: CategoryMatch| matches!(m, CategoryMatch::Exact | CategoryMatch::Synonym(_));
    if category_hit(title) || category_hit(job_type) {
        return true;
    }

    !job.required_skills.is_empty() && count_matched(&worker.skills, &job.required_skills) > 0
}

/// Share of required skills the worker has (0-100)
///
/// A skill counts when either string contains the other, ignoring case.
pub fn score_skills(worker_skills: &[String], required_skills: &[String]) -> u8 {
    if required_skills.is_empty() {
        return NEUTRAL_SCORE;
    }
    if worker_skills.is_empty() {
        return 0;
    }

    let matched = count_matched(worker_skills, required_skills);
    ratio_score(matched, required_skills.len())
}

/// Share of the job's preferred languages the worker speaks (0-100)
pub fn score_languages(worker_languages: &[String], preferred: &[String]) -> u8 {
    if preferred.is_empty() || worker_languages.is_empty() {
        return NEUTRAL_SCORE;
    }

    ratio_score(count_matched(worker_languages, preferred), preferred.len())
}

fn count_matched(have: &[String], wanted: &[String]) -> usize {
    let have: Vec<String> = have
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    wanted
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .filter(|w| have.iter().any(|h| h.contains(w.as_str()) || w.contains(h.as_str())))
        .count()
}

/// Experience fit (0-100)
///
/// Postings that don't mention experience score neutral. Otherwise a worker
/// meeting the stated years scores 100 and the rest are tiered by years.
pub fn score_experience(worker: &WorkerProfile, job: &JobPosting) -> u8 {
    let required = job
        .required_experience_years
        .filter(|years| years.is_finite() && *years > 0.0);
    let text = format!("{} {}", job.title, job.description).to_lowercase();
    let mentions_experience = text
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| EXPERIENCE_KEYWORDS.contains(&word));

    if required.is_none() && !mentions_experience {
        return NEUTRAL_SCORE;
    }

    let years = if worker.experience_years.is_finite() {
        worker.experience_years
    } else {
        0.0
    };

    if let Some(required) = required {
        if years >= required {
            return 100;
        }
    }

    match years {
        y if y >= 5.0 => 100,
        y if y >= 3.0 => 80,
        y if y >= 1.0 => 60,
        _ => 30,
    }
}

/// Availability today (100), on some day (50) or never (0)
pub fn score_availability(worker: &WorkerProfile, ctx: &ScoringContext) -> u8 {
    let schedule = &worker.availability_schedule;
    if schedule.is_empty() {
        return NEUTRAL_SCORE;
    }

    let today = ctx.local_weekday();
    if schedule.get(&today).map_or(false, |day| day.available) {
        100
    } else if schedule.values().any(|day| day.available) {
        50
    } else {
        0
    }
}

/// Rating scaled to 0-100; the profile weight caps its contribution
pub fn score_rating(rating: Option<f64>) -> u8 {
    match rating.filter(|r| r.is_finite()) {
        Some(rating) => (rating.clamp(0.0, 5.0) / 5.0 * 100.0).round() as u8,
        None => 0,
    }
}

/// How recently the worker was active: within a day 100, a week 50
pub fn score_recency(last_active_at: Option<DateTime<Utc>>, ctx: &ScoringContext) -> u8 {
    let Some(last_active) = last_active_at else {
        return 0;
    };

    let idle = ctx.now - last_active;
    if idle <= Duration::days(1) {
        100
    } else if idle <= Duration::days(7) {
        50
    } else {
        0
    }
}

/// Composite listing priority: freshness, boost, pay level and urgency
pub fn score_priority(job: &JobPosting, ctx: &ScoringContext) -> u8 {
    let age = ctx.now - job.created_at;
    let freshness = if age < Duration::days(1) {
        40
    } else if age < Duration::days(3) {
        30
    } else if age < Duration::days(7) {
        20
    } else if age < Duration::days(14) {
        10
    } else {
        0
    };

    let boost = if job.boost_active(ctx.now) { 30 } else { 0 };

    let monthly_top = job.salary.as_ref().and_then(job_range_with_unit).map(|(range, text_unit)| {
        let factor = job.salary_unit.or(text_unit).map_or(1.0, |unit| unit.per_month());
        range.max * factor
    });
    let pay = match monthly_top {
        Some(pay) if pay >= 25_000.0 => 20,
        Some(pay) if pay >= 18_000.0 => 15,
        Some(pay) if pay >= 12_000.0 => 10,
        _ => 0,
    };

    let urgency = match job.expires_at.map(|at| at - ctx.now) {
        Some(left) if left <= Duration::days(3) => 10,
        Some(left) if left <= Duration::days(7) => 5,
        _ => 0,
    };

    (freshness + boost + pay + urgency).min(100)
}

#[inline]
fn ratio_score(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return NEUTRAL_SCORE;
    }
    (100.0 * matched as f64 / total as f64).round().clamp(0.0, 100.0) as u8
}

fn normalize_term(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whole-word containment of `phrase` in `text`
fn contains_words(text: &str, phrase: &str) -> bool {
    let words: Vec<&str> = text.split(|c: char| !c.is_alphanumeric() && c != '-').collect();
    let phrase: Vec<&str> = phrase.split_whitespace().collect();
    !phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase.as_slice())
}
