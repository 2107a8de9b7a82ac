use crate::core::{distance, regions};
use crate::models::{JobPosting, WorkerProfile};

/// Score when nothing is known about the fit
pub const NEUTRAL_LOCATION_SCORE: u8 = 50;

const EXACT_MATCH_SCORE: u8 = 100;
const FUZZY_MATCH_SCORE: u8 = 90;
const SAME_PROVINCE_SCORE: u8 = 85;
const SAME_REGION_SCORE: u8 = 80;

/// Score how well a job's location fits a worker (0-100)
///
/// Checks run in priority order and the first applicable one decides:
/// 1. exact desired-location match
/// 2. distance against the worker's radius, when both sides have coordinates
/// 3. same province or region via the region table
/// 4. loose string match after normalization
pub fn match_location(worker: &WorkerProfile, job: &JobPosting) -> u8 {
    let job_location = job.location.trim().to_lowercase();

    if !job_location.is_empty()
        && worker
            .desired_locations
            .iter()
            .any(|desired| desired.trim().to_lowercase() == job_location)
    {
        return EXACT_MATCH_SCORE;
    }

    if let Some(score) = geo_score(worker, job) {
        return score;
    }

    if let Some(score) = region_score(&worker.desired_locations, &job.location) {
        return score;
    }

    if worker
        .desired_locations
        .iter()
        .any(|desired| fuzzy_match(desired, &job.location))
    {
        return FUZZY_MATCH_SCORE;
    }

    NEUTRAL_LOCATION_SCORE
}

/// Distance score when both coordinates are usable and a radius is set
fn geo_score(worker: &WorkerProfile, job: &JobPosting) -> Option<u8> {
    let from = worker.coordinates.filter(|c| c.is_valid())?;
    let to = job.coordinates.filter(|c| c.is_valid())?;
    let radius = worker.preferred_work_radius_km;

    if !radius.is_finite() || radius <= 0.0 {
        return None;
    }

    Some(distance::radius_score(distance::distance_km(&from, &to), radius))
}

/// Best region-table agreement between any desired location and the job
fn region_score(desired_locations: &[String], job_location: &str) -> Option<u8> {
    let job_entry = regions::lookup(job_location)?;

    desired_locations
        .iter()
        .filter_map(|desired| regions::lookup(desired))
        .filter_map(|entry| {
            if entry.province == job_entry.province {
                Some(SAME_PROVINCE_SCORE)
            } else if entry.region == job_entry.region {
                Some(SAME_REGION_SCORE)
            } else {
                None
            }
        })
        .max()
}

/// Containment either way, confirmed by equality after normalization
fn fuzzy_match(desired: &str, job_location: &str) -> bool {
    let desired_lower = desired.trim().to_lowercase();
    let job_lower = job_location.trim().to_lowercase();

    if desired_lower.is_empty() || job_lower.is_empty() {
        return false;
    }

    if !desired_lower.contains(&job_lower) && !job_lower.contains(&desired_lower) {
        return false;
    }

    let desired_norm = normalize_locality(&desired_lower);
    !desired_norm.is_empty() && desired_norm == normalize_locality(&job_lower)
}

/// Strip punctuation and locality affixes ("city", "city of", "municipality of")
fn normalize_locality(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let mut kept = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        match (words[i], words.get(i + 1).copied()) {
            ("city" | "municipality", Some("of")) => i += 2,
            ("city", _) => i += 1,
            (word, _) => {
                kept.push(word);
                i += 1;
            }
        }
    }

    kept.join(" ")
}
