use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::models::{ImportShortlistRequest, ShortlistResponse};
use crate::routes::{ApiError, AppState};

const MIN_SESSION_LEN: usize = 8;
const MAX_SESSION_LEN: usize = 128;

/// Configure shortlist routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/shortlist/{session_id}")
            .route(web::get().to(get_shortlist))
            .route(web::delete().to(clear_shortlist)),
    )
    .service(
        web::resource("/shortlist/{session_id}/import").route(web::post().to(import_shortlist)),
    )
    .service(
        web::resource("/shortlist/{session_id}/{listing_id}")
            .route(web::put().to(add_to_shortlist))
            .route(web::delete().to(remove_from_shortlist)),
    );
}

/// Storage key for an anonymous browsing session
fn session_key(session_id: &str) -> Result<String, ApiError> {
    let valid_len = (MIN_SESSION_LEN..=MAX_SESSION_LEN).contains(&session_id.len());
    let valid_chars = session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !valid_len || !valid_chars {
        return Err(ApiError::InvalidPath(format!("invalid session id {:?}", session_id)));
    }

    Ok(format!("shortlist:{}", session_id))
}

/// GET /api/v1/shortlist/{session_id}
async fn get_shortlist(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let key = session_key(&path)?;
    Ok(HttpResponse::Ok().json(ShortlistResponse::from(state.shortlist.items(&key))))
}

/// DELETE /api/v1/shortlist/{session_id}
async fn clear_shortlist(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let key = session_key(&path)?;
    state.shortlist.clear(&key);
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/v1/shortlist/{session_id}/{listing_id}
async fn add_to_shortlist(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (session_id, listing_id) = path.into_inner();
    let key = session_key(&session_id)?;

    let items = state.shortlist.add(&key, listing_id)?;
    Ok(HttpResponse::Ok().json(ShortlistResponse::from(items)))
}

/// DELETE /api/v1/shortlist/{session_id}/{listing_id}
async fn remove_from_shortlist(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (session_id, listing_id) = path.into_inner();
    let key = session_key(&session_id)?;

    let items = state.shortlist.remove(&key, listing_id);
    Ok(HttpResponse::Ok().json(ShortlistResponse::from(items)))
}

/// Carry over a shortlist value saved by an older client
///
/// POST /api/v1/shortlist/{session_id}/import
async fn import_shortlist(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ImportShortlistRequest>,
) -> Result<HttpResponse, ApiError> {
    let key = session_key(&path)?;
    req.validate()?;

    let items = state.shortlist.import(&key, &req.raw);
    tracing::debug!("Imported {} shortlist items for {}", items.len(), key);

    Ok(HttpResponse::Ok().json(ShortlistResponse::from(items)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key() {
        assert_eq!(session_key("abc-123_XYZ").unwrap(), "shortlist:abc-123_XYZ");
        assert!(session_key("short").is_err());
        assert!(session_key("has spaces in it").is_err());
        assert!(session_key("../../etc/passwd").is_err());
        assert!(session_key(&"a".repeat(129)).is_err());
    }
}
