use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Name of the profile-centric preset
pub const HELPER_PROFILE: &str = "helper_profile";
/// Name of the preference-centric preset
pub const PREFERENCES: &str = "preferences";

/// Tolerance when checking that weights add up to one
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// One scored axis of compatibility
///
/// Declaration order is the order reasons are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    JobTitle,
    JobType,
    Location,
    Salary,
    Skills,
    Experience,
    Availability,
    Languages,
    Rating,
    Recency,
    Priority,
}

impl Dimension {
    pub const ALL: [Dimension; 11] = [
        Dimension::JobTitle,
        Dimension::JobType,
        Dimension::Location,
        Dimension::Salary,
        Dimension::Skills,
        Dimension::Experience,
        Dimension::Availability,
        Dimension::Languages,
        Dimension::Rating,
        Dimension::Recency,
        Dimension::Priority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::JobTitle => "job_title",
            Dimension::JobType => "job_type",
            Dimension::Location => "location",
            Dimension::Salary => "salary",
            Dimension::Skills => "skills",
            Dimension::Experience => "experience",
            Dimension::Availability => "availability",
            Dimension::Languages => "languages",
            Dimension::Rating => "rating",
            Dimension::Recency => "recency",
            Dimension::Priority => "priority",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building a weighting profile
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("Weighting profile '{0}' has no weights")]
    Empty(String),

    #[error("Weighting profile '{profile}' has an invalid weight for {dimension}: {weight}")]
    InvalidWeight {
        profile: String,
        dimension: Dimension,
        weight: f64,
    },

    #[error("Weighting profile '{profile}' weights sum to {sum}, expected 1.0 or 100")]
    BadSum { profile: String, sum: f64 },
}

/// Named, immutable mapping from dimension to weight
///
/// Only dimensions present in the table are scored for that profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightingProfile {
    name: String,
    weights: BTreeMap<Dimension, f64>,
    /// Job type score when neither an exact nor a synonym match exists
    #[serde(rename = "jobTypeFallback")]
    job_type_fallback: u8,
    /// Drop postings with no title/type/skill overlap before scoring
    #[serde(rename = "requireCategoryMatch")]
    require_category_match: bool,
}

impl WeightingProfile {
    /// Build a profile from a weight table
    ///
    /// Weights must be finite and non-negative. A table expressed in
    /// percentages (summing to 100) is rescaled to fractions.
    pub fn new(
        name: impl Into<String>,
        weights: impl IntoIterator<Item = (Dimension, f64)>,
    ) -> Result<Self, WeightError> {
        let name = name.into();
        let weights: BTreeMap<Dimension, f64> = weights.into_iter().collect();

        if weights.is_empty() {
            return Err(WeightError::Empty(name));
        }

        for (dimension, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(WeightError::InvalidWeight {
                    profile: name,
                    dimension: *dimension,
                    weight: *weight,
                });
            }
        }

        let sum: f64 = weights.values().sum();
        let scale = if (sum - 1.0).abs() < WEIGHT_SUM_EPSILON {
            1.0
        } else if (sum - 100.0).abs() < WEIGHT_SUM_EPSILON * 100.0 {
            0.01
        } else {
            return Err(WeightError::BadSum { profile: name, sum });
        };

        let weights = weights
            .into_iter()
            .map(|(dimension, weight)| (dimension, weight * scale))
            .collect();

        Ok(Self {
            name,
            weights,
            job_type_fallback: 0,
            require_category_match: false,
        })
    }

    pub fn with_job_type_fallback(mut self, fallback: u8) -> Self {
        self.job_type_fallback = fallback.min(100);
        self
    }

    pub fn with_category_gate(mut self, enabled: bool) -> Self {
        self.require_category_match = enabled;
        self
    }

    /// Profile-centric scheme used when ranking for helper profiles
    pub fn helper_profile() -> Self {
        Self {
            name: HELPER_PROFILE.to_string(),
            weights: BTreeMap::from([
                (Dimension::JobType, 0.25),
                (Dimension::Location, 0.20),
                (Dimension::Salary, 0.15),
                (Dimension::Skills, 0.15),
                (Dimension::Experience, 0.10),
                (Dimension::Availability, 0.10),
                (Dimension::Rating, 0.03),
                (Dimension::Recency, 0.02),
            ]),
            job_type_fallback: 0,
            require_category_match: false,
        }
    }

    /// Preference-centric scheme used when ranking against stated preferences
    pub fn preferences() -> Self {
        Self {
            name: PREFERENCES.to_string(),
            weights: BTreeMap::from([
                (Dimension::JobTitle, 0.40),
                (Dimension::JobType, 0.20),
                (Dimension::Location, 0.15),
                (Dimension::Salary, 0.08),
                (Dimension::Languages, 0.02),
                (Dimension::Skills, 0.10),
                (Dimension::Priority, 0.05),
            ]),
            job_type_fallback: 60,
            require_category_match: true,
        }
    }

    /// Built-in presets keyed by name
    pub fn presets() -> HashMap<String, WeightingProfile> {
        [Self::helper_profile(), Self::preferences()]
            .into_iter()
            .map(|profile| (profile.name.clone(), profile))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        self.weights.get(&dimension).copied().unwrap_or(0.0)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.weights.keys().copied()
    }

    pub fn weights(&self) -> &BTreeMap<Dimension, f64> {
        &self.weights
    }

    pub fn job_type_fallback(&self) -> u8 {
        self.job_type_fallback
    }

    pub fn requires_category_match(&self) -> bool {
        self.require_category_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_sum_to_one() {
        for profile in WeightingProfile::presets().values() {
            let sum: f64 = profile.weights().values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", profile.name(), sum);
        }
    }

    #[test]
    fn percentages_are_rescaled() {
        let profile = WeightingProfile::new(
            "custom",
            [(Dimension::Location, 60.0), (Dimension::Salary, 40.0)],
        )
        .unwrap();

        assert!((profile.weight(Dimension::Location) - 0.6).abs() < 1e-9);
        assert!((profile.weight(Dimension::Salary) - 0.4).abs() < 1e-9);
        assert_eq!(profile.weight(Dimension::Skills), 0.0);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(matches!(
            WeightingProfile::new("empty", Vec::<(Dimension, f64)>::new()),
            Err(WeightError::Empty(_))
        ));
        assert!(matches!(
            WeightingProfile::new("neg", [(Dimension::Location, -0.5), (Dimension::Salary, 1.5)]),
            Err(WeightError::InvalidWeight { .. })
        ));
        assert!(matches!(
            WeightingProfile::new("short", [(Dimension::Location, 0.5)]),
            Err(WeightError::BadSum { .. })
        ));
    }

    #[test]
    fn preference_scheme_gates_categories() {
        assert!(WeightingProfile::preferences().requires_category_match());
        assert_eq!(WeightingProfile::preferences().job_type_fallback(), 60);
        assert!(!WeightingProfile::helper_profile().requires_category_match());
    }
}
