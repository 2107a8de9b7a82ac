use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use chrono::{FixedOffset, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{Matcher, RankError, ScoringContext};
use crate::models::{
    ErrorResponse, ExclusionSet, HealthResponse, JobPosting, RankRequest, RankResponse,
    RecordSwipeRequest, RecordSwipeResponse, ScoreJobRequest, WeightingProfilesResponse,
    WorkerProfile,
};
use crate::services::{
    AppwriteClient, AppwriteError, CacheError, CacheKey, CacheManager, PostgresClient,
    SwipeAction,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub appwrite: Arc<AppwriteClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
    /// Local time of the marketplace, for the "available today" check
    pub utc_offset: FixedOffset,
}

impl AppState {
    fn scoring_context(&self) -> ScoringContext {
        ScoringContext::new(Utc::now()).with_utc_offset(self.utc_offset)
    }

    fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.matching.default_profile)
    }
}

/// Configure all job-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/jobs/recommend", web::post().to(recommend_jobs))
        .route("/jobs/score", web::post().to(score_job))
        .route("/jobs/swipe", web::post().to(record_swipe))
        .route("/jobs/seen", web::get().to(get_seen_jobs))
        .route("/jobs/seen", web::delete().to(clear_seen_jobs))
        .route("/jobs/seen/history", web::get().to(get_seen_history))
        .route("/jobs/seen/stats", web::get().to(get_seen_stats))
        .route("/jobs/seen/{job_id}", web::delete().to(remove_seen_job))
        .route("/weighting-profiles", web::get().to(list_weighting_profiles));
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

fn appwrite_error_response(context: &str, err: &AppwriteError) -> HttpResponse {
    match err {
        AppwriteError::NotFound(message) => error_response(StatusCode::NOT_FOUND, context, message.clone()),
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, context, err.to_string()),
    }
}

fn rank_error_response(err: &RankError) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, "Invalid ranking request", err.to_string())
}

/// Offset of the following page, if the ranked list continues
fn next_offset(offset: i64, returned: usize, total_candidates: usize) -> Option<i64> {
    let next = offset.saturating_add(returned as i64);
    (returned > 0 && (next as usize) < total_candidates).then_some(next)
}

/// Serve from the cache, falling back to Appwrite and filling the cache
///
/// Cache failures are logged and treated as misses. An entry that no longer
/// deserializes is evicted before refetching.
async fn cached<T, F, Fut>(cache: &CacheManager, key: &str, fetch: F) -> Result<T, AppwriteError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppwriteError>>,
{
    match cache.get::<T>(key).await {
        Ok(Some(value)) => return Ok(value),
        Ok(None) => {}
        Err(CacheError::SerializationError(e)) => {
            tracing::warn!("Evicting unreadable cache entry {}: {}", key, e);
            if let Err(e) = cache.delete(key).await {
                tracing::warn!("Cache delete failed for {}: {}", key, e);
            }
        }
        Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
    }

    let value = fetch().await?;

    if let Err(e) = cache.set(key, &value).await {
        tracing::warn!("Cache write failed for {}: {}", key, e);
    }

    Ok(value)
}

async fn load_worker(state: &AppState, worker_id: &str) -> Result<WorkerProfile, AppwriteError> {
    cached(&state.cache, &CacheKey::worker(worker_id), || {
        state.appwrite.get_worker(worker_id)
    })
    .await
}

async fn load_active_jobs(state: &AppState) -> Result<Vec<JobPosting>, AppwriteError> {
    cached(&state.cache, &CacheKey::active_jobs(), || {
        state.appwrite.list_active_jobs(state.matching.candidate_fetch_limit)
    })
    .await
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };
    let cache = state.cache.stats();

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        database: pg_healthy,
        cache_entries: cache.l1_size,
        cache_hits: cache.hit_count,
        cache_misses: cache.miss_count,
        cache_hit_rate: cache.hit_rate,
    })
}

/// Ranked recommendations for a worker
///
/// POST /api/v1/jobs/recommend
///
/// Request body:
/// ```json
/// {
///   "workerId": "string",
///   "limit": 20,
///   "offset": 0,
///   "profile": "helper_profile",
///   "excludeJobIds": ["string"]
/// }
/// ```
async fn recommend_jobs(
    state: web::Data<AppState>,
    req: web::Json<RankRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: {}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let worker_id = &req.worker_id;
    let limit = req.limit.min(i64::from(state.matching.max_limit));
    let profile_name = state.profile_name(req.profile.as_deref()).to_string();

    tracing::info!(
        "Recommending jobs for worker: {}, limit: {}, offset: {}, profile: {}",
        worker_id,
        limit,
        req.offset,
        profile_name
    );

    // A broken seen log must not block recommendations
    let mut exclusion: ExclusionSet = match state.postgres.get_seen_jobs(worker_id).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch seen jobs for {}, proceeding without filtering: {}", worker_id, e);
            ExclusionSet::new()
        }
    };
    exclusion.extend(req.exclude_job_ids.iter().cloned());

    let worker = match load_worker(&state, worker_id).await {
        Ok(worker) => worker,
        Err(e) => {
            tracing::error!("Failed to fetch worker profile for {}: {}", worker_id, e);
            return appwrite_error_response("Failed to fetch worker profile", &e);
        }
    };

    let candidates = match load_active_jobs(&state).await {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!("Failed to list job postings: {}", e);
            return appwrite_error_response("Failed to list job postings", &e);
        }
    };

    let ctx = state.scoring_context();
    let page = match state.matcher.rank_page(
        &worker,
        &candidates,
        &exclusion,
        &profile_name,
        limit,
        req.offset,
        &ctx,
    ) {
        Ok(page) => page,
        Err(e) => return rank_error_response(&e),
    };

    let response = RankResponse {
        next_offset: next_offset(req.offset, page.matches.len(), page.total_candidates),
        total_candidates: page.total_candidates,
        matches: page.matches,
        profile: profile_name,
    };

    tracing::info!(
        "Returning {} jobs for worker {} (from {} candidates)",
        response.matches.len(),
        worker_id,
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}

/// Score breakdown for a single posting
///
/// POST /api/v1/jobs/score
async fn score_job(
    state: web::Data<AppState>,
    req: web::Json<ScoreJobRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let worker = match load_worker(&state, &req.worker_id).await {
        Ok(worker) => worker,
        Err(e) => return appwrite_error_response("Failed to fetch worker profile", &e),
    };

    let job = match cached(&state.cache, &CacheKey::job(&req.job_id), || {
        state.appwrite.get_job(&req.job_id)
    })
    .await
    {
        Ok(job) => job,
        Err(e) => return appwrite_error_response("Failed to fetch job posting", &e),
    };

    let profile_name = state.profile_name(req.profile.as_deref());
    match state
        .matcher
        .score_job(&worker, &job, profile_name, &state.scoring_context())
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => rank_error_response(&e),
    }
}

/// Record a swipe
///
/// POST /api/v1/jobs/swipe
///
/// Request body:
/// ```json
/// {
///   "workerId": "string",
///   "jobId": "string",
///   "action": "viewed|applied|skipped|saved"
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    req: web::Json<RecordSwipeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let action: SwipeAction = match req.action.parse() {
        Ok(action) => action,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid swipe action",
                "Action must be one of: viewed, applied, skipped, saved",
            )
        }
    };

    // The seen log in PostgreSQL is the source of the exclusion set
    if let Err(e) = state.postgres.record_seen(&req.worker_id, &req.job_id, action).await {
        tracing::error!("Failed to record swipe in PostgreSQL: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record swipe", e.to_string());
    }

    // Appwrite copy is best-effort
    let event_id = match state
        .appwrite
        .record_swipe(&req.worker_id, &req.job_id, action.as_str())
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Swipe recorded in PostgreSQL but Appwrite recording failed: {}", e);
            uuid::Uuid::new_v4().to_string()
        }
    };

    HttpResponse::Ok().json(RecordSwipeResponse {
        success: true,
        event_id,
    })
}

#[derive(Debug, Deserialize)]
struct SeenQuery {
    #[serde(rename = "workerId")]
    worker_id: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
}

impl SeenQuery {
    fn worker_id(&self) -> Result<&str, HttpResponse> {
        self.worker_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                error_response(
                    StatusCode::BAD_REQUEST,
                    "Missing workerId parameter",
                    "workerId query parameter is required",
                )
            })
    }
}

/// Job ids a worker has already seen
///
/// GET /api/v1/jobs/seen?workerId={workerId}
async fn get_seen_jobs(
    state: web::Data<AppState>,
    query: web::Query<SeenQuery>,
) -> impl Responder {
    let worker_id = match query.worker_id() {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.postgres.get_seen_jobs(worker_id).await {
        Ok(seen_ids) => HttpResponse::Ok().json(serde_json::json!({
            "workerId": worker_id,
            "seenJobs": seen_ids,
            "count": seen_ids.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to fetch seen jobs for {}: {}", worker_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch seen jobs", e.to_string())
        }
    }
}

/// GET /api/v1/jobs/seen/history?workerId=&limit=&offset=
async fn get_seen_history(
    state: web::Data<AppState>,
    query: web::Query<SeenQuery>,
) -> impl Responder {
    let worker_id = match query.worker_id() {
        Ok(id) => id,
        Err(response) => return response,
    };
    let limit = query
        .limit
        .unwrap_or(usize::from(state.matching.default_limit))
        .min(usize::from(state.matching.max_limit));

    match state
        .postgres
        .get_seen_jobs_paginated(worker_id, limit, query.offset.unwrap_or(0))
        .await
    {
        Ok(history) => HttpResponse::Ok().json(history),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch seen history", e.to_string()),
    }
}

/// GET /api/v1/jobs/seen/stats?workerId=
async fn get_seen_stats(
    state: web::Data<AppState>,
    query: web::Query<SeenQuery>,
) -> impl Responder {
    let worker_id = match query.worker_id() {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.postgres.get_seen_stats(worker_id).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch seen stats", e.to_string()),
    }
}

/// Reset the seen log so every posting can be recommended again
///
/// DELETE /api/v1/jobs/seen?workerId=
async fn clear_seen_jobs(
    state: web::Data<AppState>,
    query: web::Query<SeenQuery>,
) -> impl Responder {
    let worker_id = match query.worker_id() {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.postgres.clear_seen_jobs(worker_id).await {
        Ok(cleared) => HttpResponse::Ok().json(serde_json::json!({
            "workerId": worker_id,
            "cleared": cleared,
        })),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear seen jobs", e.to_string()),
    }
}

/// DELETE /api/v1/jobs/seen/{job_id}?workerId=
async fn remove_seen_job(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<SeenQuery>,
) -> impl Responder {
    let worker_id = match query.worker_id() {
        Ok(id) => id,
        Err(response) => return response,
    };
    let job_id = path.into_inner();

    match state.postgres.remove_seen(worker_id, &job_id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            "Seen job not found",
            format!("Worker {} has no seen record for job {}", worker_id, job_id),
        ),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to remove seen job", e.to_string()),
    }
}

/// GET /api/v1/weighting-profiles
async fn list_weighting_profiles(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(WeightingProfilesResponse {
        default_profile: state.matching.default_profile.clone(),
        profiles: state.matcher.profiles().into_iter().cloned().collect(),
    })
}
