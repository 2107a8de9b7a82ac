//! Job documents as stored in the backend, and their conversion into the
//! canonical [`JobPosting`].
//!
//! Two collections exist: the current one with numeric salary columns and
//! the older one with a free-text salary and `job_*` field names.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::domain::{Coordinates, JobPosting, JobSalary, JobStatus, SalaryUnit};

/// Posting with numeric salary columns
#[derive(Debug, Clone, Deserialize)]
pub struct JobDocument {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "jobType", alias = "job_type", default)]
    pub job_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(alias = "salaryMin", default)]
    pub salary_min: Option<f64>,
    #[serde(alias = "salaryMax", default)]
    pub salary_max: Option<f64>,
    #[serde(alias = "salaryUnit", default)]
    pub salary_unit: Option<SalaryUnit>,
    #[serde(rename = "requiredSkills", alias = "required_skills", default)]
    pub required_skills: Vec<String>,
    #[serde(rename = "preferredLanguages", alias = "preferred_languages", default)]
    pub preferred_languages: Vec<String>,
    #[serde(rename = "requiredExperienceYears", alias = "required_experience_years", default)]
    pub required_experience_years: Option<f64>,
    #[serde(rename = "isBoosted", alias = "is_boosted", default)]
    pub is_boosted: bool,
    #[serde(rename = "boostExpiresAt", alias = "boost_expires_at", default)]
    pub boost_expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "$createdAt", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expiresAt", alias = "expires_at", default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Posting from the older collection with a free-text salary
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyJobDocument {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    pub job_title: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(alias = "category", default)]
    pub job_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub salary_unit: Option<SalaryUnit>,
    #[serde(alias = "required_skills", default)]
    pub skills: Vec<String>,
    #[serde(alias = "preferred_languages", default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub is_boosted: bool,
    #[serde(default)]
    pub boost_expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "$createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Either stored shape; tried in declaration order
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawJobDocument {
    Current(JobDocument),
    Legacy(LegacyJobDocument),
}

impl From<JobDocument> for JobPosting {
    fn from(doc: JobDocument) -> Self {
        let salary = match (doc.salary_min, doc.salary_max) {
            (None, None) => None,
            (min, max) => Some(JobSalary::Range { min, max }),
        };

        JobPosting {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            job_type: doc.job_type,
            location: doc.location,
            coordinates: coordinates(doc.latitude, doc.longitude),
            salary,
            salary_unit: doc.salary_unit,
            required_skills: doc.required_skills,
            preferred_languages: doc.preferred_languages,
            required_experience_years: doc.required_experience_years,
            is_boosted: doc.is_boosted,
            boost_expires_at: doc.boost_expires_at,
            created_at: doc.created_at,
            expires_at: doc.expires_at,
            status: parse_status(doc.status.as_deref()),
        }
    }
}

impl From<LegacyJobDocument> for JobPosting {
    fn from(doc: LegacyJobDocument) -> Self {
        JobPosting {
            id: doc.id,
            title: doc.job_title,
            description: doc.job_description,
            job_type: doc.job_type,
            location: doc.location,
            coordinates: coordinates(doc.latitude, doc.longitude),
            salary: doc
                .salary
                .filter(|s| !s.trim().is_empty())
                .map(JobSalary::Text),
            salary_unit: doc.salary_unit,
            required_skills: doc.skills,
            preferred_languages: doc.languages,
            required_experience_years: None,
            is_boosted: doc.is_boosted,
            boost_expires_at: doc.boost_expires_at,
            created_at: doc.created_at,
            expires_at: doc.expires_at,
            status: parse_status(doc.status.as_deref()),
        }
    }
}

impl From<RawJobDocument> for JobPosting {
    fn from(raw: RawJobDocument) -> Self {
        match raw {
            RawJobDocument::Current(doc) => doc.into(),
            RawJobDocument::Legacy(doc) => doc.into(),
        }
    }
}

fn coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinates> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)).filter(Coordinates::is_valid),
        _ => None,
    }
}

/// Missing status means active; unrecognized values keep the posting hidden
fn parse_status(status: Option<&str>) -> JobStatus {
    match status.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("active") | Some("open") => JobStatus::Active,
        Some("closed") | Some("filled") | Some("expired") => JobStatus::Closed,
        Some(_) => JobStatus::Paused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_schema_normalizes() {
        let raw: RawJobDocument = serde_json::from_value(json!({
            "$id": "job-1",
            "title": "Yaya",
            "jobType": "yaya",
            "location": "Cebu City",
            "latitude": 10.3157,
            "longitude": 123.8854,
            "salary_min": 8000,
            "salary_max": 10000,
            "salary_unit": "monthly",
            "requiredSkills": ["childcare"],
            "$createdAt": "2025-03-01T08:00:00.000+00:00",
            "status": "active"
        }))
        .unwrap();

        let job: JobPosting = raw.into();
        assert_eq!(job.id, "job-1");
        assert_eq!(job.title, "Yaya");
        assert_eq!(
            job.salary,
            Some(JobSalary::Range { min: Some(8000.0), max: Some(10000.0) })
        );
        assert_eq!(job.salary_unit, Some(SalaryUnit::Monthly));
        assert!(job.coordinates.is_some());
        assert_eq!(job.status, JobStatus::Active);
    }

    #[test]
    fn legacy_schema_normalizes() {
        let raw: RawJobDocument = serde_json::from_value(json!({
            "$id": "job-2",
            "job_title": "Housekeeper",
            "job_description": "Experienced housekeeper",
            "category": "housekeeper",
            "location": "Makati",
            "salary": "₱500/day",
            "skills": ["cleaning", "laundry"],
            "$createdAt": "2025-03-01T08:00:00.000+00:00",
            "status": "filled"
        }))
        .unwrap();

        assert!(matches!(raw, RawJobDocument::Legacy(_)));

        let job: JobPosting = raw.into();
        assert_eq!(job.title, "Housekeeper");
        assert_eq!(job.job_type, "housekeeper");
        assert_eq!(job.salary, Some(JobSalary::Text("₱500/day".to_string())));
        assert_eq!(job.required_skills.len(), 2);
        assert_eq!(job.status, JobStatus::Closed);
        assert!(job.coordinates.is_none());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(parse_status(None), JobStatus::Active);
        assert_eq!(parse_status(Some("Open")), JobStatus::Active);
        assert_eq!(parse_status(Some("paused")), JobStatus::Paused);
        assert_eq!(parse_status(Some("archived")), JobStatus::Paused);
    }
}
