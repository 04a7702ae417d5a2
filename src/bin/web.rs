//! JSON API over the competition store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default; override with HOST, PORT, INACTIVITY_TIMEOUT_SECS and
//! CLEANUP_INTERVAL_SECS.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, NaiveDate, Utc};
use competition_engine::models::CompetitionSettings;
use competition_engine::{
    identities_from_csv, plan_bracket, Competition, CompetitionError, CompetitionFormat,
    CompetitionId, CompetitionResult, CompetitionStore, ErrorKind, Identity, MatchStatistics,
    ParticipantId, ServerConfig,
};
use serde::Deserialize;
use uuid::Uuid;

type AppState = Data<CompetitionStore>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
    competitions: usize,
}

#[derive(Deserialize)]
struct CreateCompetitionBody {
    name: String,
    #[serde(default)]
    format: CompetitionFormat,
    created_by: Option<Uuid>,
    description: Option<String>,
    min_participants: Option<u32>,
    max_participants: Option<u32>,
    entry_fee: Option<f64>,
    registration_start: Option<NaiveDate>,
    registration_end: Option<NaiveDate>,
    #[serde(default)]
    settings: CompetitionSettings,
}

#[derive(Deserialize)]
struct RegisterBody {
    id: Option<Uuid>,
    name: String,
    seed: Option<u32>,
}

#[derive(Deserialize)]
struct ReasonBody {
    reason: Option<String>,
}

#[derive(Deserialize)]
struct PlanQuery {
    format: CompetitionFormat,
    participants: usize,
}

#[derive(Deserialize)]
struct CompetitionPath {
    id: CompetitionId,
}

#[derive(Deserialize)]
struct ParticipantPath {
    id: CompetitionId,
    participant_id: ParticipantId,
}

#[derive(Deserialize)]
struct RoundPath {
    id: CompetitionId,
    round: u32,
}

#[derive(Deserialize)]
struct GroupPath {
    id: CompetitionId,
    round: u32,
    group: u32,
}

#[derive(Deserialize)]
struct GroupParticipantPath {
    id: CompetitionId,
    round: u32,
    group: u32,
    participant_id: ParticipantId,
}

fn error_response(e: &CompetitionError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Duplicate | ErrorKind::InvalidStateTransition => HttpResponse::Conflict().json(body),
        ErrorKind::PreconditionNotMet | ErrorKind::InvalidPlan => {
            HttpResponse::UnprocessableEntity().json(body)
        }
    }
}

/// Apply `op` transactionally and answer with the updated competition.
fn mutate(
    store: &CompetitionStore,
    id: CompetitionId,
    op: impl FnOnce(&mut Competition, DateTime<Utc>) -> CompetitionResult<()>,
) -> HttpResponse {
    let now = Utc::now();
    let result = store.update(id, |c| {
        op(c, now)?;
        Ok(c.clone())
    });
    match result {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health(state: AppState) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "competition-engine",
        competitions: state.len(),
    })
}

/// Dry-run the bracket planner.
#[get("/api/plan")]
async fn api_plan(query: Query<PlanQuery>) -> HttpResponse {
    match plan_bracket(query.format, query.participants, &CompetitionSettings::default()) {
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(e) => error_response(&e),
    }
}

#[post("/api/competitions")]
async fn api_create_competition(state: AppState, body: Json<CreateCompetitionBody>) -> HttpResponse {
    let body = body.into_inner();
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": "Name is required" }));
    }
    let mut competition = Competition::new(
        name,
        body.format,
        body.created_by.unwrap_or_else(Uuid::new_v4),
        Utc::now(),
    )
    .with_capacity(body.min_participants.unwrap_or(2), body.max_participants)
    .with_registration_window(body.registration_start, body.registration_end)
    .with_entry_fee(body.entry_fee)
    .with_settings(body.settings);
    competition.description = body.description;

    let snapshot = competition.clone();
    match state.insert(competition) {
        Ok(_) => HttpResponse::Ok().json(snapshot),
        Err(e) => error_response(&e),
    }
}

#[get("/api/competitions/{id}")]
async fn api_get_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    match state.get(path.id) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

#[get("/api/competitions/{id}/leaderboard")]
async fn api_leaderboard(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    match state.get(path.id) {
        Ok(c) => HttpResponse::Ok().json(c.leaderboard()),
        Err(e) => error_response(&e),
    }
}

#[post("/api/competitions/{id}/open")]
async fn api_open_registration(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.open_registration(now))
}

/// Register one identity; `seed` is optional.
#[post("/api/competitions/{id}/participants")]
async fn api_register(state: AppState, path: Path<CompetitionPath>, body: Json<RegisterBody>) -> HttpResponse {
    let body = body.into_inner();
    let identity = match body.id {
        Some(id) => Identity::new(id, body.name.trim()),
        None => Identity::named(body.name.trim()),
    };
    mutate(&state, path.id, |c, now| {
        let id = identity.id;
        c.register_participant(identity, now)?;
        if body.seed.is_some() {
            c.set_seed(id, body.seed, now)?;
        }
        Ok(())
    })
}

/// Bulk registration from a CSV body (`id,name`). All rows register or none do.
#[post("/api/competitions/{id}/participants/import")]
async fn api_import(state: AppState, path: Path<CompetitionPath>, body: String) -> HttpResponse {
    let identities = match identities_from_csv(body.as_bytes()) {
        Ok(ids) => ids,
        Err(e) => {
            return HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    mutate(&state, path.id, |c, now| {
        identities
            .into_iter()
            .try_for_each(|identity| c.register_participant(identity, now))
    })
}

#[post("/api/competitions/{id}/participants/{participant_id}/confirm")]
async fn api_confirm(state: AppState, path: Path<ParticipantPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.confirm_participant(path.participant_id, now))
}

#[post("/api/competitions/{id}/participants/{participant_id}/withdraw")]
async fn api_withdraw(
    state: AppState,
    path: Path<ParticipantPath>,
    body: Option<Json<ReasonBody>>,
) -> HttpResponse {
    let reason = body.and_then(|b| b.into_inner().reason);
    mutate(&state, path.id, |c, now| c.withdraw_participant(path.participant_id, reason, now))
}

#[post("/api/competitions/{id}/participants/{participant_id}/eliminate")]
async fn api_eliminate(state: AppState, path: Path<ParticipantPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.eliminate_participant(path.participant_id, now))
}

#[post("/api/competitions/{id}/participants/{participant_id}/disqualify")]
async fn api_disqualify(state: AppState, path: Path<ParticipantPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.disqualify_participant(path.participant_id, now))
}

#[post("/api/competitions/{id}/start")]
async fn api_start(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.start(now))
}

#[post("/api/competitions/{id}/advance")]
async fn api_advance(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.advance_round(now))
}

#[post("/api/competitions/{id}/complete")]
async fn api_complete(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.complete(now))
}

#[post("/api/competitions/{id}/cancel")]
async fn api_cancel(state: AppState, path: Path<CompetitionPath>, body: Option<Json<ReasonBody>>) -> HttpResponse {
    let reason = body.and_then(|b| b.into_inner().reason);
    mutate(&state, path.id, |c, now| c.cancel(reason, now))
}

#[post("/api/competitions/{id}/rounds/{round}/start")]
async fn api_start_round(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.start_round(path.round, now))
}

#[post("/api/competitions/{id}/rounds/{round}/complete")]
async fn api_complete_round(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.complete_round(path.round, now))
}

#[post("/api/competitions/{id}/rounds/{round}/cancel")]
async fn api_cancel_round(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.cancel_round(path.round, now))
}

#[post("/api/competitions/{id}/rounds/{round}/groups/{group}/start")]
async fn api_start_group(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.start_group(path.round, path.group, now))
}

#[post("/api/competitions/{id}/rounds/{round}/groups/{group}/complete")]
async fn api_complete_group(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.complete_group(path.round, path.group, now))
}

#[post("/api/competitions/{id}/rounds/{round}/groups/{group}/cancel")]
async fn api_cancel_group(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| c.cancel_group(path.round, path.group, now))
}

#[post("/api/competitions/{id}/rounds/{round}/groups/{group}/participants")]
async fn api_add_group_participant(
    state: AppState,
    path: Path<GroupPath>,
    body: Json<RegisterBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let identity = match body.id {
        Some(id) => Identity::new(id, body.name.trim()),
        None => Identity::named(body.name.trim()),
    };
    mutate(&state, path.id, |c, now| {
        c.add_group_participant(path.round, path.group, identity, body.seed, now)
    })
}

#[delete("/api/competitions/{id}/rounds/{round}/groups/{group}/participants/{participant_id}")]
async fn api_remove_group_participant(state: AppState, path: Path<GroupParticipantPath>) -> HttpResponse {
    mutate(&state, path.id, |c, now| {
        c.remove_group_participant(path.round, path.group, path.participant_id, now)
    })
}

/// Report additive statistics for one participant in a group.
#[put("/api/competitions/{id}/rounds/{round}/groups/{group}/participants/{participant_id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<GroupParticipantPath>,
    body: Json<MatchStatistics>,
) -> HttpResponse {
    mutate(&state, path.id, |c, now| {
        c.record_result(path.round, path.group, path.participant_id, &body, now)
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(CompetitionStore::new());

    // Background task: periodically drop competitions nobody has touched for a while
    let state_cleanup = state.clone();
    let (interval, timeout) = (config.cleanup_interval, config.inactivity_timeout);
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(interval);
        loop {
            ticker.tick().await;
            state_cleanup.evict_inactive(timeout);
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_plan)
            .service(api_create_competition)
            .service(api_get_competition)
            .service(api_leaderboard)
            .service(api_open_registration)
            .service(api_import)
            .service(api_register)
            .service(api_confirm)
            .service(api_withdraw)
            .service(api_eliminate)
            .service(api_disqualify)
            .service(api_start)
            .service(api_advance)
            .service(api_complete)
            .service(api_cancel)
            .service(api_start_round)
            .service(api_complete_round)
            .service(api_cancel_round)
            .service(api_start_group)
            .service(api_complete_group)
            .service(api_cancel_group)
            .service(api_add_group_participant)
            .service(api_remove_group_participant)
            .service(api_record_result)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
