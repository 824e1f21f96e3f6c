//! JSON API over the engine. Handlers are thin: parse, call one engine operation, serialize.

use crate::error::TournamentError;
use crate::models::{BattleId, CategoryId, NewCategory, Outcome, PoolId, TournamentId};
use crate::Engine;
use actix_web::{
    get,
    http::StatusCode,
    post,
    web::{self, Data, Json, Path},
    HttpResponse, Responder, ResponseError,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Shared engine handed to every handler.
pub type AppState = Data<Engine>;

impl ResponseError for TournamentError {
    fn status_code(&self) -> StatusCode {
        match self {
            TournamentError::NotFound { .. } => StatusCode::NOT_FOUND,
            TournamentError::InvalidTransition { .. } | TournamentError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            TournamentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let blockers = match self {
            TournamentError::Validation(b) => b.clone(),
            _ => Vec::new(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "retryable": self.is_retryable(),
            "blockers": blockers,
        }))
    }
}

type ApiResult = Result<HttpResponse, TournamentError>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    date: NaiveDate,
}

#[derive(Deserialize)]
struct RegisterPerformerBody {
    name: String,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and category id.
#[derive(Deserialize)]
struct CategoryPath {
    id: TournamentId,
    category_id: CategoryId,
}

#[derive(Deserialize)]
struct BattlePath {
    id: BattleId,
}

#[derive(Deserialize)]
struct PoolPath {
    id: PoolId,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "battle-tournament",
    })
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> ApiResult {
    let body = body.into_inner();
    let name = body.name.trim();
    if name.is_empty() {
        return Err(TournamentError::validation("tournament name must not be empty"));
    }
    Ok(HttpResponse::Created().json(state.create_tournament(name, body.date)))
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> impl Responder {
    HttpResponse::Ok().json(state.tournaments())
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.tournament(path.id)?))
}

/// Add a category (registration only).
#[post("/api/tournaments/{id}/categories")]
async fn api_add_category(state: AppState, path: Path<TournamentPath>, body: Json<NewCategory>) -> ApiResult {
    let category = state.add_category(path.id, body.into_inner())?;
    Ok(HttpResponse::Created().json(category))
}

/// Register a performer (registration only).
#[post("/api/tournaments/{id}/categories/{category_id}/performers")]
async fn api_register_performer(
    state: AppState,
    path: Path<CategoryPath>,
    body: Json<RegisterPerformerBody>,
) -> ApiResult {
    let performer = state.register_performer(path.id, path.category_id, &body.name)?;
    Ok(HttpResponse::Created().json(performer))
}

/// Bulk registration from a `category,name` CSV body.
#[post("/api/tournaments/{id}/roster")]
async fn api_import_roster(state: AppState, path: Path<TournamentPath>, body: String) -> ApiResult {
    let ids = state.import_roster(path.id, body.as_bytes())?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "registered": ids })))
}

#[get("/api/tournaments/{id}/phase-validation")]
async fn api_phase_validation(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.phase_validation(path.id)?))
}

#[post("/api/tournaments/{id}/advance")]
async fn api_advance_phase(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.advance_tournament_phase(path.id)?))
}

#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel_tournament(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.cancel_tournament(path.id)?))
}

#[get("/api/battles/{id}")]
async fn api_get_battle(state: AppState, path: Path<BattlePath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.battle(path.id)?))
}

#[post("/api/battles/{id}/start")]
async fn api_start_battle(state: AppState, path: Path<BattlePath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.start_battle(path.id)?))
}

#[post("/api/battles/{id}/outcome")]
async fn api_record_outcome(state: AppState, path: Path<BattlePath>, body: Json<Outcome>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.record_battle_outcome(path.id, &body)?))
}

#[get("/api/pools/{id}/standings")]
async fn api_pool_standings(state: AppState, path: Path<PoolPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.standings(path.id)?))
}

/// Register every API route on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_list_tournaments)
        .service(api_get_tournament)
        .service(api_add_category)
        .service(api_register_performer)
        .service(api_import_roster)
        .service(api_phase_validation)
        .service(api_advance_phase)
        .service(api_cancel_tournament)
        .service(api_get_battle)
        .service(api_start_battle)
        .service(api_record_outcome)
        .service(api_pool_standings);
}
