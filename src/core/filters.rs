use chrono::{DateTime, Utc};

use crate::core::scoring::has_category_overlap;
use crate::models::{ExclusionSet, JobPosting, JobStatus, WorkerProfile};

/// Check if a posting can be shown at all
///
/// This is the first stage of the ranking pipeline: the posting must be
/// active, not past its expiry, and not already seen by the worker.
#[inline]
pub fn is_eligible(job: &JobPosting, exclusion: &ExclusionSet, now: DateTime<Utc>) -> bool {
    if job.status != JobStatus::Active {
        return false;
    }

    if job.is_expired(now) {
        return false;
    }

    !exclusion.contains(&job.id)
}

/// Hard category gate used by profiles that require it
///
/// A posting passes when its title or type matches the worker's desired
/// ones (synonyms included), or when the worker has any required skill.
/// Workers without stated titles/types pass everything.
#[inline]
pub fn passes_category_gate(worker: &WorkerProfile, job: &JobPosting) -> bool {
    has_category_overlap(worker, job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_job(id: &str, status: JobStatus) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: "Housekeeper".to_string(),
            description: String::new(),
            job_type: "housekeeper".to_string(),
            location: "Makati".to_string(),
            coordinates: None,
            salary: None,
            salary_unit: None,
            required_skills: vec!["cleaning".to_string()],
            preferred_languages: vec![],
            required_experience_years: None,
            is_boosted: false,
            boost_expires_at: None,
            created_at: Utc::now(),
            expires_at: None,
            status,
        }
    }

    #[test]
    fn test_active_job_is_eligible() {
        let job = create_test_job("1", JobStatus::Active);
        assert!(is_eligible(&job, &ExclusionSet::new(), Utc::now()));
    }

    #[test]
    fn test_paused_and_closed_filtered() {
        let now = Utc::now();
        assert!(!is_eligible(&create_test_job("1", JobStatus::Paused), &ExclusionSet::new(), now));
        assert!(!is_eligible(&create_test_job("2", JobStatus::Closed), &ExclusionSet::new(), now));
    }

    #[test]
    fn test_expired_job_filtered() {
        let now = Utc::now();
        let mut job = create_test_job("1", JobStatus::Active);
        job.expires_at = Some(now - Duration::minutes(1));
        assert!(!is_eligible(&job, &ExclusionSet::new(), now));

        job.expires_at = Some(now + Duration::days(1));
        assert!(is_eligible(&job, &ExclusionSet::new(), now));
    }

    #[test]
    fn test_excluded_job_filtered() {
        let job = create_test_job("seen", JobStatus::Active);
        let exclusion: ExclusionSet = ["seen".to_string()].into();
        assert!(!is_eligible(&job, &exclusion, Utc::now()));
    }

    #[test]
    fn test_category_gate() {
        let job = create_test_job("1", JobStatus::Active);
        let mut worker = WorkerProfile::new("w");
        assert!(passes_category_gate(&worker, &job));

        worker.desired_job_types = ["driver".to_string()].into();
        assert!(!passes_category_gate(&worker, &job));

        worker.skills = vec!["Cleaning".to_string()];
        assert!(passes_category_gate(&worker, &job));
    }
}
