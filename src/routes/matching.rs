use actix_web::{web, HttpResponse, Responder};
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;
use crate::core::{apply_host_food_overrides, MatchingEngine, MatchingError};
use crate::models::{
    ErrorResponse, FoodCategory, HealthResponse, MonthSnapshot, RunMatchingRequest,
    RunMatchingResponse, RunStoredMonthRequest,
};
use crate::services::{AppwriteClient, AppwriteError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchingEngine,
    /// Absent when no document store is configured
    pub appwrite: Option<Arc<AppwriteClient>>,
    pub shuffle_seed: Option<u64>,
}

impl AppState {
    /// Run the engine with a fresh shuffle, or the configured seed if any
    fn run_engine(&self, snapshot: &MonthSnapshot) -> Result<crate::models::MatchPlan, MatchingError> {
        match self.shuffle_seed {
            Some(seed) => self.engine.run(snapshot, &mut rand::rngs::StdRng::seed_from_u64(seed)),
            None => self.engine.run(snapshot, &mut rand::thread_rng()),
        }
    }
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/run", web::post().to(run_matching))
        .route("/months/{month_id}/matching", web::post().to(run_stored_month));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.appwrite.is_some() { "healthy" } else { "standalone" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Turn an engine outcome into the HTTP response of the matching endpoints
fn respond(
    result: Result<crate::models::MatchPlan, MatchingError>,
    overrides: &HashMap<String, FoodCategory>,
) -> HttpResponse {
    match result {
        Ok(plan) => {
            let plan = apply_host_food_overrides(plan, overrides);
            HttpResponse::Ok().json(RunMatchingResponse::from_plan(plan))
        }
        Err(e) => {
            tracing::info!("Matching refused ({}): {}", e.code(), e);
            let body = RunMatchingResponse::failure(e.to_string());
            match e {
                MatchingError::MonthNotFound(_) => HttpResponse::NotFound().json(body),
                _ => HttpResponse::UnprocessableEntity().json(body),
            }
        }
    }
}

/// Run matching over a supplied snapshot
///
/// POST /api/v1/matching/run
///
/// Request body:
/// ```json
/// {
///   "monthId": "2026-10",
///   "month": { "id": "2026-10", "status": "open" },
///   "participants": [
///     { "id": "h1", "role": "host", "maxGuestUnits": 4 },
///     { "id": "g1", "role": "guest", "hasPlusOne": true }
///   ],
///   "hostFoodOverrides": { "h1": "dessert" }
/// }
/// ```
async fn run_matching(
    state: web::Data<AppState>,
    req: web::Json<RunMatchingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for run_matching request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let (snapshot, overrides) = req.into_inner().into_parts();

    tracing::info!(
        "Running matching for month {} over {} submitted participants",
        snapshot.month_id,
        snapshot.participants.len()
    );

    respond(state.run_engine(&snapshot), &overrides)
}

/// Load a month from the document store and run matching on it
///
/// POST /api/v1/months/{monthId}/matching
async fn run_stored_month(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<RunStoredMonthRequest>>,
) -> impl Responder {
    let month_id = path.into_inner();

    let Some(appwrite) = state.appwrite.as_ref() else {
        return HttpResponse::ServiceUnavailable().json(ErrorResponse {
            error: "Document store not configured".to_string(),
            message: "Stored months cannot be matched without an Appwrite connection".to_string(),
            status_code: 503,
        });
    };

    let snapshot = match appwrite.fetch_snapshot(&month_id).await {
        Ok(snapshot) => snapshot,
        Err(e @ AppwriteError::InvalidInput(_)) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid month ID".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
        Err(e) => {
            tracing::error!("Failed to load month {}: {}", month_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to load month".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    let overrides = body.map(|b| b.into_inner().host_food_overrides).unwrap_or_default();

    respond(state.run_engine(&snapshot), &overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::AppwriteCollections;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn state() -> AppState {
        AppState {
            engine: MatchingEngine::default(),
            appwrite: None,
            shuffle_seed: Some(11),
        }
    }

    fn app_config(cfg: &mut web::ServiceConfig) {
        cfg.service(web::scope("/api/v1").configure(configure));
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(app_config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.status, "standalone");
    }

    #[actix_web::test]
    async fn test_run_matching_success() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(app_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matching/run")
            .set_json(json!({
                "monthId": "2026-10",
                "month": { "id": "2026-10", "status": "open" },
                "participants": [
                    { "id": "h1", "role": "host", "maxGuestUnits": 4 },
                    { "id": "g1", "role": "guest", "hasPlusOne": true },
                    { "id": "g2", "role": "guest" }
                ],
                "hostFoodOverrides": { "h1": "dessert" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["totalMatches"], 1);
        assert_eq!(body["guestsAssigned"], 2);
        assert_eq!(body["guestsUnassigned"], 0);
        assert_eq!(body["matches"][0]["hostId"], "h1");
        assert_eq!(body["matches"][0]["hostFood"], "dessert");
        assert_eq!(body["matches"][0]["usedUnits"], 3);
        assert_eq!(body["matches"][0]["guests"][0]["foodAssignment"], "main_course");
        assert!(body.get("warning").is_none());
    }

    #[actix_web::test]
    async fn test_run_matching_shortfall_warns() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(app_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matching/run")
            .set_json(json!({
                "monthId": "2026-10",
                "month": { "id": "2026-10", "status": "open" },
                "participants": [
                    { "id": "h1", "role": "host", "maxGuestUnits": 3 },
                    { "id": "g1", "role": "guest", "hasPlusOne": true },
                    { "id": "g2", "role": "guest", "hasPlusOne": true }
                ]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["guestsUnassigned"], 1);
        assert_eq!(body["unassigned"]["guests"][0]["hasPlusOne"], true);
        assert!(body["warning"].is_string());
    }

    #[actix_web::test]
    async fn test_run_matching_no_hosts() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(app_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matching/run")
            .set_json(json!({
                "monthId": "2026-10",
                "month": { "id": "2026-10", "status": "open" },
                "participants": [{ "id": "g1", "role": "guest" }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 422);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("host"));
        assert!(body.get("matches").is_none());
    }

    #[actix_web::test]
    async fn test_run_matching_missing_month() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(app_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matching/run")
            .set_json(json!({ "monthId": "2026-12", "participants": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 404);
    }

    #[actix_web::test]
    async fn test_run_matching_rejects_empty_month_id() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(app_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matching/run")
            .set_json(json!({ "monthId": "", "participants": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn test_stored_month_without_store() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(app_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/months/2026-10/matching")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 503);
    }

    #[actix_web::test]
    async fn test_stored_month_rejects_unusable_id() {
        let appwrite = AppwriteClient::new(
            "http://127.0.0.1:1".to_string(),
            "key".to_string(),
            "project".to_string(),
            "db".to_string(),
            AppwriteCollections {
                months: "months".to_string(),
                participants: "participants".to_string(),
            },
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        let mut state = state();
        state.appwrite = Some(Arc::new(appwrite));

        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(app_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/months/2026*10/matching")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 400);
    }
}
