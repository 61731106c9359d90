use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use advyser_match::config::{BusinessContact, Settings};
use advyser_match::core::{AllowedOrigins, Matcher, MemoryShortlistStore, Shortlist};
use advyser_match::models::ScoringWeights;
use advyser_match::routes::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use advyser_match::routes::{self, AppState};
use advyser_match::services::{CacheManager, CaptchaVerifier, JwtVerifier, PostgresClient, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Advyser matching service...");

    let weights = ScoringWeights::from(&settings.scoring.weights);
    if let Err(e) = weights.validate() {
        error!("Invalid scoring weights: {}", e);
        return Err(std::io::Error::other(e.to_string()));
    }

    // Initialize cache manager
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            Arc::new(c)
        }
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            return Err(std::io::Error::other("Redis connection required"));
        }
    };

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let postgres = match PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        Some(db_min_conn),
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            return Err(std::io::Error::other(format!("PostgreSQL connection error: {}", e)));
        }
    };

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let lead_rate_limiter = Arc::new(RateLimiter::new(
        cache.connection(),
        "leads",
        settings.rate_limit.max_requests,
        Duration::from_secs(settings.rate_limit.window_secs),
    ));

    let captcha = CaptchaVerifier::new(
        settings.captcha.verify_url.clone(),
        settings.captcha.secret_key.clone(),
        settings.captcha.enabled,
        Duration::from_secs(settings.captcha.timeout_secs),
    )
    .map_err(|e| std::io::Error::other(format!("Captcha client error: {}", e)))?;

    if !captcha.is_enabled() {
        warn!("Captcha verification is disabled");
    }

    let origins = match AllowedOrigins::new(settings.security.allowed_origins.as_slice()) {
        Ok(origins) => origins,
        Err(e) => {
            error!("Invalid security.allowed_origins: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    if origins.is_empty() {
        warn!("No allowed origins configured, public endpoints accept any origin");
    }
    let cors_origins: Vec<String> = origins.iter().map(str::to_string).collect();

    let matcher = Matcher::new(weights);
    info!("Matcher initialized with weights: {:?}", weights);

    let app_state = AppState {
        postgres,
        cache,
        lead_rate_limiter,
        captcha: Arc::new(captcha),
        jwt: Arc::new(JwtVerifier::new(&settings.auth.jwt_secret, &settings.auth.jwt_audience)),
        origins: Arc::new(origins),
        shortlist: Shortlist::new(Arc::new(MemoryShortlistStore::with_limits(
            settings.shortlist.max_sessions,
            Duration::from_secs(settings.shortlist.idle_secs),
        ))),
        contact: Arc::new(BusinessContact::resolve(&settings.contact)),
        matcher,
        matching: settings.matching.clone(),
        trust_proxy: settings.server.trust_proxy,
    };

    if settings.server.trust_proxy {
        info!("Client addresses taken from X-Forwarded-For");
    }

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = if cors_origins.is_empty() {
            Cors::permissive()
        } else {
            cors_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
                .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
