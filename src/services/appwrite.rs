use crate::models::{JobPosting, RawJobDocument, WorkerProfile};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client
///
/// Handles all communication with the Appwrite backend including:
/// - Fetching worker profiles
/// - Listing active job postings
/// - Mirroring swipes into the swipes collection
#[derive(Debug, Clone)]
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub worker_profiles: String,
    pub job_postings: String,
    pub swipes: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
        timeout: Duration,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    /// Fetch a worker profile by its document id
    pub async fn get_worker(&self, worker_id: &str) -> Result<WorkerProfile, AppwriteError> {
        let url = format!(
            "{}/{}",
            self.documents_url(&self.collections.worker_profiles),
            urlencoding::encode(worker_id)
        );

        tracing::debug!("Fetching worker profile: {}", worker_id);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status().as_u16() {
            404 => {
                return Err(AppwriteError::NotFound(format!(
                    "Worker profile not found: {}",
                    worker_id
                )))
            }
            401 | 403 => return Err(AppwriteError::Unauthorized),
            _ if !response.status().is_success() => {
                let status = response.status();
                let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Failed to fetch worker {}: {} - {}", worker_id, status, body);
                return Err(AppwriteError::ApiError(format!(
                    "Failed to fetch worker profile: {}",
                    status
                )));
            }
            _ => {}
        }

        let doc: Value = response.json().await?;
        parse_worker(&doc, worker_id)
    }

    /// List the newest postings in the catalog
    ///
    /// Status is not filtered server-side: documents without a status or
    /// with a legacy `open` status are active, and the ranking pipeline
    /// drops the rest along with expired and excluded postings. Documents
    /// that match neither stored shape are skipped with a warning.
    pub async fn list_active_jobs(&self, limit: usize) -> Result<Vec<JobPosting>, AppwriteError> {
        let query_string = catalog_queries(limit)
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        let full_url = format!(
            "{}?{}",
            self.documents_url(&self.collections.job_postings),
            query_string
        );

        let response = self
            .client
            .get(&full_url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if response.status().as_u16() == 401 {
            return Err(AppwriteError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to list job postings: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let jobs = parse_job_documents(&json)?;

        tracing::debug!("Fetched {} job postings", jobs.len());

        Ok(jobs)
    }

    /// Fetch one posting by its document id
    pub async fn get_job(&self, job_id: &str) -> Result<JobPosting, AppwriteError> {
        let url = format!(
            "{}/{}",
            self.documents_url(&self.collections.job_postings),
            urlencoding::encode(job_id)
        );

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(AppwriteError::NotFound(format!("Job posting not found: {}", job_id)));
        }
        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to fetch job posting: {}",
                response.status()
            )));
        }

        let doc: Value = response.json().await?;
        let data = doc.get("data").unwrap_or(&doc);

        serde_json::from_value::<RawJobDocument>(data.clone())
            .map(JobPosting::from)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse job posting: {}", e)))
    }

    /// Mirror a swipe into the swipes collection
    pub async fn record_swipe(
        &self,
        worker_id: &str,
        job_id: &str,
        action: &str,
    ) -> Result<String, AppwriteError> {
        let document_id = uuid::Uuid::new_v4().to_string();
        let payload = json!({
            "documentId": document_id,
            "data": {
                "workerId": worker_id,
                "jobId": job_id,
                "action": action,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        });

        let response = self
            .client
            .post(self.documents_url(&self.collections.swipes))
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to record swipe: {}",
                response.status()
            )));
        }

        tracing::debug!("Recorded swipe: {} -> {} ({})", worker_id, job_id, action);

        Ok(document_id)
    }
}

/// Worker documents keep their id in `$id`; the profile needs it as `id`
fn parse_worker(doc: &Value, worker_id: &str) -> Result<WorkerProfile, AppwriteError> {
    let mut data = doc.get("data").unwrap_or(doc).clone();

    if let Some(obj) = data.as_object_mut() {
        if !obj.contains_key("id") {
            let id = obj
                .get("$id")
                .cloned()
                .unwrap_or_else(|| Value::String(worker_id.to_string()));
            obj.insert("id".to_string(), id);
        }
    }

    serde_json::from_value(data)
        .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse worker profile: {}", e)))
}

/// Queries for the catalog listing, newest first
fn catalog_queries(limit: usize) -> Vec<String> {
    vec![
        json!({"method": "orderDesc", "attribute": "$createdAt"}).to_string(),
        json!({"method": "limit", "values": [limit]}).to_string(),
    ]
}

fn parse_job_documents(json: &Value) -> Result<Vec<JobPosting>, AppwriteError> {
    let documents = json
        .get("documents")
        .and_then(|d| d.as_array())
        .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

    Ok(documents
        .iter()
        .filter_map(|doc| {
            let data = doc.get("data").unwrap_or(doc);
            match serde_json::from_value::<RawJobDocument>(data.clone()) {
                Ok(raw) => Some(JobPosting::from(raw)),
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable job document {}: {}",
                        data.get("$id").and_then(serde_json::Value::as_str).unwrap_or("<unknown>"),
                        e
                    );
                    None
                }
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;

    fn collections() -> AppwriteCollections {
        AppwriteCollections {
            worker_profiles: "workers".to_string(),
            job_postings: "jobs".to_string(),
            swipes: "swipes".to_string(),
        }
    }

    fn client(base_url: String) -> AppwriteClient {
        AppwriteClient::new(
            base_url,
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            collections(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_appwrite_client_creation() {
        let client = client("https://appwrite.test/v1/".to_string());

        assert_eq!(client.api_key, "test_key");
        assert_eq!(
            client.documents_url("jobs"),
            "https://appwrite.test/v1/databases/test_db/collections/jobs/documents"
        );
    }

    #[test]
    fn test_parse_job_documents_skips_bad_rows() {
        let body = json!({
            "total": 3,
            "documents": [
                {
                    "$id": "job-1",
                    "title": "Caregiver",
                    "jobType": "caregiver",
                    "$createdAt": "2025-03-01T08:00:00.000+00:00"
                },
                {
                    "$id": "job-2",
                    "job_title": "Driver",
                    "salary": "15000-18000",
                    "$createdAt": "2025-03-02T08:00:00.000+00:00"
                },
                { "$id": "broken" }
            ]
        });

        let jobs = parse_job_documents(&body).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, "job-1");
        assert_eq!(jobs[1].title, "Driver");
    }

    #[test]
    fn test_parse_worker_uses_document_id() {
        let doc = json!({
            "$id": "worker-9",
            "desiredJobTypes": ["yaya"],
            "skills": ["childcare"],
            "experienceYears": 3
        });

        let worker = parse_worker(&doc, "worker-9").unwrap();
        assert_eq!(worker.id, "worker-9");
        assert!(worker.desired_job_types.contains("yaya"));
        assert_eq!(worker.experience_years, 3.0);
    }

    #[tokio::test]
    async fn test_get_worker_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/databases/test_db/collections/workers/documents/missing")
            .with_status(404)
            .with_body(r#"{"message":"Document not found"}"#)
            .create_async()
            .await;

        let result = client(server.url()).get_worker("missing").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(AppwriteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_active_jobs() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/databases/test_db/collections/jobs/documents")
            .match_query(mockito::Matcher::Any)
            .match_header("X-Appwrite-Project", "test_project")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 1,
                    "documents": [{
                        "$id": "job-1",
                        "title": "Yaya",
                        "salary_min": 8000,
                        "salary_max": 10000,
                        "$createdAt": "2025-03-01T08:00:00.000+00:00"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let jobs = client(server.url()).list_active_jobs(50).await.unwrap();

        mock.assert_async().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "job-1");
    }

    #[test]
    fn test_catalog_queries_leave_status_to_ranking() {
        let queries = catalog_queries(50);
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| !q.contains("status")));
        assert!(queries[1].contains("50"));
    }

    #[tokio::test]
    async fn test_list_active_jobs_keeps_open_and_unset_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/databases/test_db/collections/jobs/documents")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 3,
                    "documents": [
                        {
                            "$id": "job-open",
                            "job_title": "Cook",
                            "status": "open",
                            "$createdAt": "2025-03-02T08:00:00.000+00:00"
                        },
                        {
                            "$id": "job-unset",
                            "title": "Yaya",
                            "$createdAt": "2025-03-01T08:00:00.000+00:00"
                        },
                        {
                            "$id": "job-filled",
                            "title": "Driver",
                            "status": "filled",
                            "$createdAt": "2025-02-28T08:00:00.000+00:00"
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let jobs = client(server.url()).list_active_jobs(50).await.unwrap();

        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].status, JobStatus::Active);
        assert_eq!(jobs[1].status, JobStatus::Active);
        assert_eq!(jobs[2].status, JobStatus::Closed);
    }

    #[tokio::test]
    async fn test_record_swipe_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/databases/test_db/collections/swipes/documents")
            .with_status(500)
            .create_async()
            .await;

        let result = client(server.url()).record_swipe("w1", "j1", "applied").await;
        assert!(matches!(result, Err(AppwriteError::ApiError(_))));
    }
}
