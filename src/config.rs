use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::{Dimension, WeightError, WeightingProfile, ScoreCombiner};
use crate::core::combiner::DEFAULT_BOOST_MULTIPLIER;
use crate::core::weights::HELPER_PROFILE;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub worker_profiles: String,
    pub job_postings: String,
    pub swipes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_profile_name")]
    pub default_profile: String,
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    /// How many active postings to pull from the catalog per request
    #[serde(default = "default_candidate_fetch_limit")]
    pub candidate_fetch_limit: usize,
    /// Offset of the marketplace's local time, used for "available today"
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_profile: default_profile_name(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            candidate_fetch_limit: default_candidate_fetch_limit(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

fn default_profile_name() -> String { HELPER_PROFILE.to_string() }
fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }
fn default_candidate_fetch_limit() -> usize { 500 }
fn default_utc_offset_hours() -> i32 { 8 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_boost_multiplier")]
    pub boost_multiplier: f64,
    /// Extra or overriding weight tables keyed by profile name
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            boost_multiplier: default_boost_multiplier(),
            profiles: HashMap::new(),
        }
    }
}

fn default_boost_multiplier() -> f64 { DEFAULT_BOOST_MULTIPLIER }

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    pub weights: BTreeMap<Dimension, f64>,
    #[serde(default)]
    pub job_type_fallback: u8,
    #[serde(default)]
    pub require_category_match: bool,
}

impl ScoringSettings {
    /// Built-in presets with configured tables layered on top
    pub fn weighting_profiles(&self) -> Result<Vec<WeightingProfile>, WeightError> {
        let mut profiles = WeightingProfile::presets();

        for (name, config) in &self.profiles {
            let profile = WeightingProfile::new(name.clone(), config.weights.clone())?
                .with_job_type_fallback(config.job_type_fallback)
                .with_category_gate(config.require_category_match);
            profiles.insert(name.clone(), profile);
        }

        Ok(profiles.into_values().collect())
    }

    pub fn combiner(&self) -> ScoreCombiner {
        ScoreCombiner::new(self.boost_multiplier)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with HELPER_MATCH)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., HELPER_MATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("HELPER_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("HELPER_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment variables on top of the layered config
///
/// `DATABASE_URL` and `APPWRITE_*` are honoured so the service runs with the
/// same variables as the rest of the stack.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("REDIS_URL", "cache.redis_url"),
        ("APPWRITE_ENDPOINT", "appwrite.endpoint"),
        ("APPWRITE_API_KEY", "appwrite.api_key"),
        ("APPWRITE_PROJECT_ID", "appwrite.project_id"),
        ("APPWRITE_DATABASE_ID", "appwrite.database_id"),
    ];

    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.default_profile, "helper_profile");
        assert_eq!(matching.default_limit, 20);
        assert_eq!(matching.max_limit, 100);
        assert_eq!(matching.utc_offset_hours, 8);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_configured_profiles_layer_on_presets() {
        let mut scoring = ScoringSettings::default();
        scoring.profiles.insert(
            "nearby".to_string(),
            ProfileConfig {
                weights: BTreeMap::from([(Dimension::Location, 70.0), (Dimension::JobType, 30.0)]),
                job_type_fallback: 40,
                require_category_match: false,
            },
        );

        let profiles = scoring.weighting_profiles().unwrap();
        let names: Vec<&str> = profiles.iter().map(|p| p.name()).collect();
        assert_eq!(profiles.len(), 3);
        assert!(names.contains(&"nearby"));
        assert!(names.contains(&"preferences"));
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut scoring = ScoringSettings::default();
        scoring.profiles.insert(
            "broken".to_string(),
            ProfileConfig {
                weights: BTreeMap::from([(Dimension::Location, 0.3)]),
                job_type_fallback: 0,
                require_category_match: false,
            },
        );

        assert!(scoring.weighting_profiles().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("helper_match_settings_test.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[appwrite]
endpoint = "https://appwrite.test/v1"
api_key = "key"
project_id = "project"
database_id = "db"

[collection]
worker_profiles = "workers"
job_postings = "jobs"
swipes = "swipes"

[database]
url = "postgres://localhost/helper_match"

[cache]
redis_url = "redis://127.0.0.1:6379"

[scoring]
boost_multiplier = 1.25
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.collection.job_postings, "jobs");
        assert_eq!(settings.scoring.boost_multiplier, 1.25);
        assert_eq!(settings.matching.default_profile, "helper_profile");

        std::fs::remove_file(&path).ok();
    }
}
