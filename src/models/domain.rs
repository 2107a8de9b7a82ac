use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::weights::Dimension;

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the valid latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Pay period a salary figure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryUnit {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl SalaryUnit {
    /// Factor converting an amount in this unit to a monthly amount
    pub fn per_month(&self) -> f64 {
        match self {
            SalaryUnit::Hourly => 8.0 * 26.0,
            SalaryUnit::Daily => 26.0,
            SalaryUnit::Weekly => 52.0 / 12.0,
            SalaryUnit::Monthly => 1.0,
        }
    }

    /// Unit named in salary text such as `"/day"` or `"per month"`
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_end_matches('.').to_lowercase();
        match label.as_str() {
            "hr" | "hrs" | "hour" | "hours" | "hourly" => Some(SalaryUnit::Hourly),
            "day" | "days" | "daily" => Some(SalaryUnit::Daily),
            "wk" | "week" | "weeks" | "weekly" => Some(SalaryUnit::Weekly),
            "mo" | "mos" | "month" | "months" | "monthly" => Some(SalaryUnit::Monthly),
            _ => None,
        }
    }
}

impl Default for SalaryUnit {
    fn default() -> Self {
        SalaryUnit::Monthly
    }
}

/// Salary a worker is asking for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryExpectation {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub unit: SalaryUnit,
}

/// Availability for one weekday
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaySchedule {
    pub available: bool,
    /// Start and end of the working window, e.g. `["08:00", "17:00"]`
    #[serde(default)]
    pub hours: Option<[String; 2]>,
}

/// Job-seeker profile with preferences and skills
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub id: String,
    #[serde(rename = "desiredJobTitles", default)]
    pub desired_job_titles: HashSet<String>,
    #[serde(rename = "desiredJobTypes", default)]
    pub desired_job_types: HashSet<String>,
    #[serde(rename = "desiredLocations", default)]
    pub desired_locations: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "preferredWorkRadiusKm", default)]
    pub preferred_work_radius_km: f64,
    #[serde(rename = "salaryExpectation", default)]
    pub salary_expectation: Option<SalaryExpectation>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "preferredLanguages", default)]
    pub preferred_languages: Vec<String>,
    #[serde(rename = "experienceYears", default)]
    pub experience_years: f64,
    #[serde(rename = "availabilitySchedule", default)]
    pub availability_schedule: HashMap<Weekday, DaySchedule>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(rename = "lastActiveAt", default)]
    pub last_active_at: Option<DateTime<Utc>>,
}

impl WorkerProfile {
    /// Empty profile for the given worker id; every preference unknown
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desired_job_titles: HashSet::new(),
            desired_job_types: HashSet::new(),
            desired_locations: Vec::new(),
            coordinates: None,
            preferred_work_radius_km: 0.0,
            salary_expectation: None,
            skills: Vec::new(),
            preferred_languages: Vec::new(),
            experience_years: 0.0,
            availability_schedule: HashMap::new(),
            rating: None,
            last_active_at: None,
        }
    }
}

/// Posting lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Paused,
    Closed,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Active
    }
}

/// Offered salary, either free text or a numeric range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobSalary {
    Text(String),
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

/// Canonical job posting consumed by the matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "jobType", default)]
    pub job_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub salary: Option<JobSalary>,
    #[serde(rename = "salaryUnit", default)]
    pub salary_unit: Option<SalaryUnit>,
    #[serde(rename = "requiredSkills", default)]
    pub required_skills: Vec<String>,
    #[serde(rename = "preferredLanguages", default)]
    pub preferred_languages: Vec<String>,
    #[serde(rename = "requiredExperienceYears", default)]
    pub required_experience_years: Option<f64>,
    #[serde(rename = "isBoosted", default)]
    pub is_boosted: bool,
    #[serde(rename = "boostExpiresAt", default)]
    pub boost_expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expiresAt", default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: JobStatus,
}

impl JobPosting {
    /// Boost flag set and its end date still in the future
    pub fn boost_active(&self, now: DateTime<Utc>) -> bool {
        self.is_boosted && self.boost_expires_at.map_or(false, |until| until > now)
    }

    /// Past its expiry timestamp
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// Job ids the worker has already evaluated
pub type ExclusionSet = HashSet<String>;

/// Ranked, explained result for one posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub score: u8,
    pub breakdown: BTreeMap<Dimension, u8>,
    pub reasons: Vec<String>,
    pub boosted: bool,
}
