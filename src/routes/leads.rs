use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::core::{allowed_transitions, is_terminal_state, validate_transition};
use crate::models::{
    CreateLeadRequest, CreateLeadResponse, Lead, LeadStatusResponse, UpdateLeadStatusRequest,
};
use crate::routes::{client_ip, header_str, ApiError, AppState};
use crate::services::Claims;

/// Configure lead routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/leads", web::post().to(create_lead))
        .route("/leads/{lead_id}/status", web::patch().to(update_lead_status))
        .route("/leads/{lead_id}/transitions", web::get().to(get_lead_transitions));
}

/// Create a lead from the public contact form
///
/// POST /api/v1/leads
///
/// Checks run cheapest first: origin, rate limit, body validation, captcha.
async fn create_lead(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    req: web::Json<CreateLeadRequest>,
) -> Result<HttpResponse, ApiError> {
    let origin = header_str(&http_req, header::ORIGIN.as_str());
    let referer = header_str(&http_req, header::REFERER.as_str());
    if !state.origins.permits(origin, referer) {
        tracing::warn!("Rejected lead request from origin {:?} (referer {:?})", origin, referer);
        return Err(ApiError::Forbidden("Request origin not allowed".to_string()));
    }

    let ip = client_ip(&http_req, state.trust_proxy);

    match state.lead_rate_limiter.check(&ip).await {
        Ok(decision) if !decision.allowed => {
            return Err(ApiError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            });
        }
        Ok(_) => {}
        // Redis outages should not take the contact form down
        Err(e) => tracing::warn!("Rate limiter unavailable, allowing request from {}: {}", ip, e),
    }

    req.validate()?;

    state
        .captcha
        .verify(req.captcha_token.as_deref(), Some(&ip))
        .await?;

    let lead = state
        .postgres
        .create_lead(&req.into_inner().into_new_lead())
        .await?;

    Ok(HttpResponse::Created().json(CreateLeadResponse {
        lead_id: lead.id,
        status: lead.status,
    }))
}

/// Move a lead to a new status
///
/// PATCH /api/v1/leads/{lead_id}/status
///
/// Request body:
/// ```json
/// { "status": "contacted" }
/// ```
async fn update_lead_status(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<Uuid>,
    req: web::Json<UpdateLeadStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let lead_id = path.into_inner();
    let claims = authenticate(&state, &http_req)?;
    let lead = owned_lead(&state, lead_id, &claims).await?;

    if let Err(e) = validate_transition(lead.status, req.status) {
        tracing::info!("Rejected status change for lead {}: {}", lead_id, e);
        return Err(e.into());
    }

    let updated = state
        .postgres
        .update_lead_status(lead_id, lead.status, req.status, claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::info!("Lead {} changed status concurrently", lead_id);
            ApiError::Conflict("Lead status changed, reload and try again".to_string())
        })?;

    Ok(HttpResponse::Ok().json(status_response(&updated)))
}

/// Current status of a lead and the statuses it may move to
///
/// GET /api/v1/leads/{lead_id}/transitions
async fn get_lead_transitions(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&state, &http_req)?;
    let lead = owned_lead(&state, path.into_inner(), &claims).await?;

    Ok(HttpResponse::Ok().json(status_response(&lead)))
}

fn authenticate(state: &AppState, http_req: &HttpRequest) -> Result<Claims, ApiError> {
    let header = header_str(http_req, header::AUTHORIZATION.as_str());
    Ok(state.jwt.verify_header(header)?)
}

async fn owned_lead(state: &AppState, lead_id: Uuid, claims: &Claims) -> Result<Lead, ApiError> {
    let lead = state.postgres.get_lead(lead_id).await?;

    if lead.advisor_id != claims.sub {
        tracing::warn!("User {} attempted to access lead {} they do not own", claims.sub, lead_id);
        return Err(ApiError::Forbidden("Lead belongs to another advisor".to_string()));
    }

    Ok(lead)
}

fn status_response(lead: &Lead) -> LeadStatusResponse {
    LeadStatusResponse {
        lead_id: lead.id,
        status: lead.status,
        allowed: allowed_transitions(lead.status).to_vec(),
        terminal: is_terminal_state(lead.status),
    }
}
