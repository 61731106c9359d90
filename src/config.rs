use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::domain::{
    ScoringWeights, DEFAULT_ACCEPTING_WEIGHT, DEFAULT_ADVISOR_TYPE_WEIGHT,
    DEFAULT_COMPLETENESS_WEIGHT, DEFAULT_LOCATION_WEIGHT, DEFAULT_RATING_WEIGHT,
    DEFAULT_RESPONSE_RATE_WEIGHT, DEFAULT_RESPONSE_TIME_WEIGHT, DEFAULT_SPECIALTY_WEIGHT,
    DEFAULT_VERIFICATION_WEIGHT,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub captcha: CaptchaSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub contact: ContactSettings,
    #[serde(default)]
    pub shortlist: ShortlistSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Read the client address from `X-Forwarded-For`; only safe behind a proxy that overwrites it
    #[serde(default)]
    pub trust_proxy: bool,
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
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    /// Listings fetched from the store per search before ranking
    #[serde(default = "default_candidate_pool_size")]
    pub candidate_pool_size: u32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            candidate_pool_size: default_candidate_pool_size(),
        }
    }
}

fn default_limit() -> u16 { 10 }
fn default_max_limit() -> u16 { 50 }
fn default_candidate_pool_size() -> u32 { 200 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_accepting_weight")]
    pub accepting: f64,
    #[serde(default = "default_specialty_weight")]
    pub specialty: f64,
    #[serde(default = "default_advisor_type_weight")]
    pub advisor_type: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_verification_weight")]
    pub verification: f64,
    #[serde(default = "default_response_rate_weight")]
    pub response_rate: f64,
    #[serde(default = "default_response_time_weight")]
    pub response_time: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_completeness_weight")]
    pub completeness: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            accepting: default_accepting_weight(),
            specialty: default_specialty_weight(),
            advisor_type: default_advisor_type_weight(),
            location: default_location_weight(),
            verification: default_verification_weight(),
            response_rate: default_response_rate_weight(),
            response_time: default_response_time_weight(),
            rating: default_rating_weight(),
            completeness: default_completeness_weight(),
        }
    }
}

fn default_accepting_weight() -> f64 { DEFAULT_ACCEPTING_WEIGHT }
fn default_specialty_weight() -> f64 { DEFAULT_SPECIALTY_WEIGHT }
fn default_advisor_type_weight() -> f64 { DEFAULT_ADVISOR_TYPE_WEIGHT }
fn default_location_weight() -> f64 { DEFAULT_LOCATION_WEIGHT }
fn default_verification_weight() -> f64 { DEFAULT_VERIFICATION_WEIGHT }
fn default_response_rate_weight() -> f64 { DEFAULT_RESPONSE_RATE_WEIGHT }
fn default_response_time_weight() -> f64 { DEFAULT_RESPONSE_TIME_WEIGHT }
fn default_rating_weight() -> f64 { DEFAULT_RATING_WEIGHT }
fn default_completeness_weight() -> f64 { DEFAULT_COMPLETENESS_WEIGHT }

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            accepting: config.accepting,
            specialty: config.specialty,
            advisor_type: config.advisor_type,
            location: config.location,
            verification: config.verification,
            response_rate: config.response_rate,
            response_time: config.response_time,
            rating: config.rating,
            completeness: config.completeness,
        }
    }
}

/// Sliding-window limits for public endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_rate_limit_requests")]
    pub max_requests: u32,
    #[serde(default = "default_rate_limit_window")]
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_rate_limit_requests(),
            window_secs: default_rate_limit_window(),
        }
    }
}

fn default_rate_limit_requests() -> u32 { 5 }
fn default_rate_limit_window() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_captcha_verify_url")]
    pub verify_url: String,
    #[serde(default = "default_captcha_timeout")]
    pub timeout_secs: u64,
}

impl Default for CaptchaSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            secret_key: String::new(),
            verify_url: default_captcha_verify_url(),
            timeout_secs: default_captcha_timeout(),
        }
    }
}

fn default_captcha_verify_url() -> String {
    "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
}
fn default_captcha_timeout() -> u64 { 5 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecuritySettings {
    /// Origins allowed to call public endpoints; empty allows any
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,
}

fn default_jwt_audience() -> String { "authenticated".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ShortlistSettings {
    #[serde(default = "default_shortlist_max_sessions")]
    pub max_sessions: u64,
    #[serde(default = "default_shortlist_idle_secs")]
    pub idle_secs: u64,
}

impl Default for ShortlistSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_shortlist_max_sessions(),
            idle_secs: default_shortlist_idle_secs(),
        }
    }
}

fn default_shortlist_max_sessions() -> u64 { 100_000 }
fn default_shortlist_idle_secs() -> u64 { 30 * 24 * 60 * 60 }

/// Raw contact settings as they arrive from files and environment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSettings {
    pub email: Option<String>,
    pub support_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub const DEFAULT_CONTACT_EMAIL: &str = "hello@advyser.com.au";

/// Business contact details, resolved once at start-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessContact {
    pub email: String,
    pub support_email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl BusinessContact {
    /// Fallbacks:
    /// - `email`: configured, else [`DEFAULT_CONTACT_EMAIL`]
    /// - `support_email`: configured, else `email`
    /// - `phone`, `address`: configured, else none
    pub fn resolve(settings: &ContactSettings) -> Self {
        let email = non_blank(&settings.email).unwrap_or_else(|| DEFAULT_CONTACT_EMAIL.to_string());
        let support_email = non_blank(&settings.support_email).unwrap_or_else(|| email.clone());

        Self {
            email,
            support_email,
            phone: non_blank(&settings.phone),
            address: non_blank(&settings.address),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
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
    /// 4. Environment variables (prefixed with ADVYSER_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ADVYSER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("ADVYSER")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.allowed_origins")
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
                Environment::with_prefix("ADVYSER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the well-known platform variables on top of the layered config
///
/// `DATABASE_URL`, `REDIS_URL`, `SUPABASE_JWT_SECRET` and
/// `TURNSTILE_SECRET_KEY` win over file values when set.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("database.url", "DATABASE_URL"),
        ("cache.redis_url", "REDIS_URL"),
        ("auth.jwt_secret", "SUPABASE_JWT_SECRET"),
        ("captcha.secret_key", "TURNSTILE_SECRET_KEY"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, var) in overrides {
        if let Ok(value) = env::var(var) {
            if !value.trim().is_empty() {
                builder = builder.set_override(key, value)?;
            }
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::from(&WeightsConfig::default());
        assert_eq!(weights, ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_contact_fallbacks() {
        let contact = BusinessContact::resolve(&ContactSettings::default());
        assert_eq!(contact.email, DEFAULT_CONTACT_EMAIL);
        assert_eq!(contact.support_email, DEFAULT_CONTACT_EMAIL);
        assert_eq!(contact.phone, None);
        assert_eq!(contact.address, None);
    }

    #[test]
    fn test_support_email_falls_back_to_email() {
        let contact = BusinessContact::resolve(&ContactSettings {
            email: Some(" team@advyser.com.au ".to_string()),
            support_email: Some("   ".to_string()),
            phone: Some("1300 000 000".to_string()),
            address: None,
        });
        assert_eq!(contact.email, "team@advyser.com.au");
        assert_eq!(contact.support_email, "team@advyser.com.au");
        assert_eq!(contact.phone.as_deref(), Some("1300 000 000"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("advyser-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
url = "postgres://localhost/advyser"

[cache]
redis_url = "redis://127.0.0.1:6379"

[auth]
jwt_secret = "secret"

[scoring.weights]
rating = 12.0

[security]
allowed_origins = ["https://advyser.com.au"]
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.scoring.weights.rating, 12.0);
        assert_eq!(settings.scoring.weights.accepting, DEFAULT_ACCEPTING_WEIGHT);
        assert_eq!(settings.matching.max_limit, 50);
        assert_eq!(settings.auth.jwt_audience, "authenticated");
        assert_eq!(settings.security.allowed_origins, vec!["https://advyser.com.au"]);
        assert!(!settings.captcha.enabled);
        assert!(!settings.server.trust_proxy);
        assert_eq!(settings.shortlist.max_sessions, 100_000);
        assert_eq!(settings.shortlist.idle_secs, 30 * 24 * 60 * 60);

        std::fs::remove_dir_all(&dir).ok();
    }
}
