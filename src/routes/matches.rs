use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::parse_intent_location;
use crate::models::{FindMatchesRequest, FindMatchesResponse, HealthResponse};
use crate::routes::{ApiError, AppState};
use crate::services::{CacheError, CacheKey};

/// Configure search and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "goal": "property",
///   "urgency": "urgent",
///   "situation": "couple",
///   "location": "Melbourne, VIC",
///   "limit": 10
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return Err(errors.into());
    }

    let limit = usize::from(
        req.limit
            .unwrap_or(state.matching.default_limit)
            .min(state.matching.max_limit),
    );
    let intent = req.intent();

    tracing::info!(
        "Finding matches: goal={}, urgency={}, situation={}, location={:?}, limit={}",
        intent.goal.as_str(),
        intent.urgency.as_str(),
        intent.situation.as_str(),
        intent.location,
        limit
    );

    let cache_key = CacheKey::matches(&intent, limit);
    match state.cache.get::<FindMatchesResponse>(&cache_key).await {
        Ok(cached) => {
            tracing::debug!("Serving cached matches for {}", cache_key);
            return Ok(HttpResponse::Ok().json(cached));
        }
        Err(CacheError::CacheMiss(_)) => {}
        Err(e) => tracing::warn!("Cache read failed for {}: {}", cache_key, e),
    }

    let location = parse_intent_location(&intent.location);
    let candidates = state
        .postgres
        .fetch_candidates(location.state.as_deref(), state.matching.candidate_pool_size)
        .await?;

    let result = state.matcher.rank(&intent, &candidates, limit);

    let response = FindMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
    };

    if let Err(e) = state.cache.set(&cache_key, &response).await {
        tracing::warn!("Failed to cache matches for {}: {}", cache_key, e);
    }

    tracing::info!(
        "Returning {} matches (from {} candidates)",
        response.matches.len(),
        response.total_candidates
    );

    Ok(HttpResponse::Ok().json(response))
}
