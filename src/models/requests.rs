use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for ranked job recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "worker_id", rename = "workerId")]
    pub worker_id: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Weighting profile name; the configured default when absent
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    #[serde(alias = "exclude_job_ids", rename = "excludeJobIds")]
    pub exclude_job_ids: Vec<String>,
}

fn default_limit() -> i64 {
    20
}

/// Request to explain the score of one posting
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreJobRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "worker_id", rename = "workerId")]
    pub worker_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "job_id", rename = "jobId")]
    pub job_id: String,
    #[serde(default)]
    pub profile: Option<String>,
}

/// Request to record a swipe on a posting
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "worker_id", rename = "workerId")]
    pub worker_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "job_id", rename = "jobId")]
    pub job_id: String,
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_request_defaults() {
        let req: RankRequest = serde_json::from_str(r#"{"workerId": "w1"}"#).unwrap();
        assert_eq!(req.limit, 20);
        assert_eq!(req.offset, 0);
        assert!(req.profile.is_none());
        assert!(req.exclude_job_ids.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_worker_id_fails_validation() {
        let req: RankRequest = serde_json::from_str(r#"{"worker_id": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
