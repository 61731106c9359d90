// Route exports
pub mod contact;
pub mod error;
pub mod leads;
pub mod matches;
pub mod shortlist;

use actix_web::{web, HttpRequest};
use std::sync::Arc;

use crate::config::{BusinessContact, MatchingSettings};
use crate::core::{AllowedOrigins, Matcher, Shortlist};
use crate::services::{CacheManager, CaptchaVerifier, JwtVerifier, PostgresClient, RateLimiter};

pub use error::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub lead_rate_limiter: Arc<RateLimiter>,
    pub captcha: Arc<CaptchaVerifier>,
    pub jwt: Arc<JwtVerifier>,
    pub origins: Arc<AllowedOrigins>,
    pub shortlist: Shortlist,
    pub contact: Arc<BusinessContact>,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
    /// Honour `Forwarded`/`X-Forwarded-For` when resolving the client address
    pub trust_proxy: bool,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(leads::configure)
            .configure(shortlist::configure)
            .configure(contact::configure),
    );
}

/// Client address for rate limiting and captcha checks
///
/// Forwarding headers are client-controlled unless a proxy in front of the
/// service overwrites them, so they are only read when `trust_proxy` is set.
/// Otherwise the socket peer address is used.
pub(crate) fn client_ip(req: &HttpRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        return req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub(crate) fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}
