// Service exports
pub mod auth;
pub mod cache;
pub mod captcha;
pub mod postgres;
pub mod rate_limit;

pub use auth::{AuthError, Claims, JwtVerifier};
pub use cache::{CacheError, CacheKey, CacheManager, SharedConnection};
pub use captcha::{CaptchaError, CaptchaVerifier};
pub use postgres::{PostgresClient, PostgresError};
pub use rate_limit::{RateLimitDecision, RateLimitError, RateLimiter};
