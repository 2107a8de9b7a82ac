use serde::{Deserialize, Serialize};
use crate::core::WeightingProfile;
use crate::models::domain::MatchResult;

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "nextOffset")]
    pub next_offset: Option<i64>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub profile: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub database: bool,
    #[serde(rename = "cacheEntries")]
    pub cache_entries: u64,
    #[serde(rename = "cacheHits")]
    pub cache_hits: u64,
    #[serde(rename = "cacheMisses")]
    pub cache_misses: u64,
    #[serde(rename = "cacheHitRate")]
    pub cache_hit_rate: f64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record swipe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSwipeResponse {
    pub success: bool,
    pub event_id: String,
}

/// Configured weighting profiles
#[derive(Debug, Clone, Serialize)]
pub struct WeightingProfilesResponse {
    #[serde(rename = "defaultProfile")]
    pub default_profile: String,
    pub profiles: Vec<WeightingProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_health_response_reports_cache_counters() {
        let health = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap(),
            database: true,
            cache_entries: 4,
            cache_hits: 3,
            cache_misses: 1,
            cache_hit_rate: 0.75,
        };

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["cacheEntries"], 4);
        assert_eq!(json["cacheHits"], 3);
        assert_eq!(json["cacheMisses"], 1);
        assert_eq!(json["cacheHitRate"], 0.75);
    }
}
