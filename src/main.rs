use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use mesa_abierta::config::{LoggingSettings, Settings};
use mesa_abierta::core::MatchingEngine;
use mesa_abierta::routes::{self, matching::AppState};
use mesa_abierta::services::{AppwriteClient, AppwriteCollections};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Install the global tracing subscriber
fn init_tracing(logging: &LoggingSettings) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&logging.level))
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging comes from settings, so a broken config is logged with the defaults
    let settings = Settings::load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default()
        .with_env_overrides();
    init_tracing(&logging);

    info!("Starting Mesa Abierta matching service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    let appwrite = match &settings.appwrite {
        Some(aw) => {
            let collections = AppwriteCollections {
                months: settings.collection.months.clone(),
                participants: settings.collection.participants.clone(),
            };
            let client = AppwriteClient::new(
                aw.endpoint.clone(),
                aw.api_key.clone(),
                aw.project_id.clone(),
                aw.database_id.clone(),
                collections,
                Duration::from_secs(aw.timeout_secs.unwrap_or(30)),
            )
            .map_err(|e| {
                error!("Failed to create Appwrite client: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            info!("Appwrite client initialized");
            Some(Arc::new(client))
        }
        None => {
            warn!("No Appwrite settings, only submitted snapshots can be matched");
            None
        }
    };

    if settings.matching.shuffle_seed.is_some() {
        warn!("Fixed shuffle seed configured, matching runs are reproducible");
    }

    let engine = MatchingEngine::new(settings.matching.default_capacity);

    info!("Matching engine initialized (default capacity: {})", engine.default_capacity());

    let app_state = AppState {
        engine,
        appwrite,
        shuffle_seed: settings.matching.shuffle_seed,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(2);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
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
