//! Single binary web server: JSON API over the tournament services, backed by SQLite.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATABASE_PATH; log level with RUST_LOG.

use actix_web::{
    get, post, put,
    web::{self, Bytes, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use carom_tournament::logic::GroupSchedule;
use carom_tournament::store::{self, create_pool, DbPool};
use carom_tournament::{
    services, Entrant, EntrantId, ErrorKind, GameMatch, GroupId, MatchId, MatchResult, Phase,
    RankingSettings, Settings, Tournament, TournamentConfig, TournamentError, TournamentId,
};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

type AppPool = Data<DbPool>;
type AppRanking = Data<RankingSettings>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    start_time: NaiveDateTime,
    #[serde(default)]
    config: TournamentConfig,
}

#[derive(Deserialize)]
struct CreatePlayerBody {
    name: String,
    #[serde(default)]
    club: Option<String>,
}

#[derive(Deserialize)]
struct RemoveEntrantsBody {
    entrant_ids: Vec<EntrantId>,
}

#[derive(Deserialize, Default)]
struct GenerateGroupsBody {
    #[serde(default)]
    overrides: HashMap<String, GroupSchedule>,
}

#[derive(Deserialize)]
struct SwapBody {
    a: EntrantId,
    b: EntrantId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentEntrantPath {
    id: TournamentId,
    entrant_id: EntrantId,
}

#[derive(Deserialize)]
struct GroupPath {
    group_id: GroupId,
}

#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

/// A tournament with its roster and the phases generated so far.
#[derive(Serialize)]
struct TournamentOverview {
    tournament: Tournament,
    entrants: Vec<Entrant>,
    phases: Vec<Phase>,
    matches: Vec<GameMatch>,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let mut response = match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest(),
        ErrorKind::StateConflict => HttpResponse::Conflict(),
        ErrorKind::NotFound => HttpResponse::NotFound(),
        ErrorKind::InsufficientData => HttpResponse::UnprocessableEntity(),
        ErrorKind::Storage => {
            log::error!("Storage failure: {e}");
            HttpResponse::InternalServerError()
        }
    };
    response.json(serde_json::json!({ "error": e.to_string() }))
}

/// Run a blocking store operation on a pooled connection and render its outcome as JSON.
async fn with_conn<T, F>(pool: &AppPool, op: F) -> HttpResponse
where
    T: Serialize + Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, TournamentError> + Send + 'static,
{
    let pool = pool.clone();
    let outcome = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, r2d2::Error>(op(&mut conn))
    })
    .await;
    match outcome {
        Ok(Ok(Ok(value))) => HttpResponse::Ok().json(value),
        Ok(Ok(Err(e))) => error_response(&e),
        Ok(Err(e)) => {
            log::error!("No database connection available: {e}");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "error": "database unavailable" }))
        }
        Err(e) => {
            log::error!("Blocking task failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "internal error" }))
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "carom-tournament",
    })
}

#[post("/api/tournaments")]
async fn api_create_tournament(pool: AppPool, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    with_conn(&pool, move |conn| {
        services::create_tournament(conn, &body.name, body.start_time, body.config)
    })
    .await
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(pool: AppPool, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| {
        Ok(TournamentOverview {
            tournament: store::tournaments::get(conn, id)?,
            entrants: store::entrants::list_by_tournament(conn, id)?,
            phases: store::phases::list_by_tournament(conn, id)?,
            matches: store::matches::list_by_tournament(conn, id)?,
        })
    })
    .await
}

#[post("/api/players")]
async fn api_create_player(pool: AppPool, body: Json<CreatePlayerBody>) -> HttpResponse {
    let body = body.into_inner();
    with_conn(&pool, move |conn| {
        services::create_player(conn, &body.name, body.club.as_deref())
    })
    .await
}

/// Players by national score.
#[get("/api/ranking")]
async fn api_ranking(pool: AppPool) -> HttpResponse {
    with_conn(&pool, |conn| store::players::list_ranked(conn)).await
}

#[post("/api/tournaments/{id}/entrants")]
async fn api_register_entrant(
    pool: AppPool,
    path: Path<TournamentPath>,
    body: Json<services::Registration>,
) -> HttpResponse {
    let id = path.id;
    let registration = body.into_inner();
    with_conn(&pool, move |conn| services::register_entrant(conn, id, &registration)).await
}

/// Roster upload: CSV body with a `name,club,handicap,average` header.
#[post("/api/tournaments/{id}/entrants/import")]
async fn api_import_roster(pool: AppPool, path: Path<TournamentPath>, body: Bytes) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| services::import_roster_csv(conn, id, &body[..])).await
}

#[post("/api/tournaments/{id}/entrants/remove")]
async fn api_remove_entrants(
    pool: AppPool,
    path: Path<TournamentPath>,
    body: Json<RemoveEntrantsBody>,
) -> HttpResponse {
    let id = path.id;
    let ids = body.into_inner().entrant_ids;
    with_conn(&pool, move |conn| services::remove_entrants(conn, id, &ids)).await
}

#[get("/api/tournaments/{id}/groups/preview")]
async fn api_preview_groups(pool: AppPool, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| services::preview_groups(conn, id, &HashMap::new())).await
}

#[post("/api/tournaments/{id}/groups")]
async fn api_generate_groups(
    pool: AppPool,
    path: Path<TournamentPath>,
    body: Option<Json<GenerateGroupsBody>>,
) -> HttpResponse {
    let id = path.id;
    let overrides = body.map(|b| b.into_inner()).unwrap_or_default().overrides;
    with_conn(&pool, move |conn| services::generate_groups(conn, id, &overrides)).await
}

#[get("/api/tournaments/{id}/standings")]
async fn api_tournament_standings(pool: AppPool, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| services::tournament_standings(conn, id)).await
}

#[get("/api/tournaments/{id}/groups/{group_id}/standings")]
async fn api_group_standings(pool: AppPool, path: Path<GroupPath>) -> HttpResponse {
    let group_id = path.group_id;
    with_conn(&pool, move |conn| services::group_standings(conn, group_id)).await
}

#[post("/api/tournaments/{id}/playoffs")]
async fn api_generate_playoffs(pool: AppPool, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| services::generate_playoffs(conn, id)).await
}

#[post("/api/tournaments/{id}/rounds/next")]
async fn api_next_round(pool: AppPool, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| services::generate_next_round(conn, id)).await
}

/// Referee score sheet for one match.
#[put("/api/matches/{match_id}/result")]
async fn api_record_result(pool: AppPool, path: Path<MatchPath>, body: Json<MatchResult>) -> HttpResponse {
    let match_id = path.match_id;
    let result = body.into_inner();
    with_conn(&pool, move |conn| services::record_match_result(conn, match_id, &result)).await
}

#[post("/api/tournaments/{id}/entrants/swap")]
async fn api_swap_entrants(pool: AppPool, path: Path<TournamentPath>, body: Json<SwapBody>) -> HttpResponse {
    let id = path.id;
    let SwapBody { a, b } = body.into_inner();
    with_conn(&pool, move |conn| services::swap_entrants(conn, id, a, b)).await
}

#[post("/api/tournaments/{id}/entrants/{entrant_id}/disqualify")]
async fn api_disqualify(pool: AppPool, path: Path<TournamentEntrantPath>) -> HttpResponse {
    let (id, entrant_id) = (path.id, path.entrant_id);
    with_conn(&pool, move |conn| services::disqualify_entrant(conn, id, entrant_id)).await
}

#[post("/api/tournaments/{id}/finalize")]
async fn api_finalize(pool: AppPool, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| services::finalize_tournament(conn, id)).await
}

#[post("/api/tournaments/{id}/ranking-points")]
async fn api_assign_points(pool: AppPool, ranking: AppRanking, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    let scale = ranking.point_scale.clone();
    with_conn(&pool, move |conn| services::assign_ranking_points(conn, id, &scale)).await
}

#[get("/api/tournaments/{id}/ranking-points")]
async fn api_ranking_points(pool: AppPool, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_conn(&pool, move |conn| store::rankings::list_for_tournament(conn, id)).await
}

#[post("/api/ranking/recompute")]
async fn api_recompute_ranking(pool: AppPool, ranking: AppRanking) -> HttpResponse {
    let settings = ranking.get_ref().clone();
    let today = chrono::Local::now().date_naive();
    with_conn(&pool, move |conn| services::recompute_global_ranking(conn, today, &settings)).await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::from_env();
    let pool = create_pool(&settings.server.database_path).map_err(std::io::Error::other)?;
    {
        let conn = pool.get().map_err(std::io::Error::other)?;
        store::setup::init_schema(&conn).map_err(std::io::Error::other)?;
    }
    log::info!("Using database {}", settings.server.database_path);

    let bind = (settings.server.host.clone(), settings.server.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let pool = Data::new(pool);
    let ranking = Data::new(settings.ranking);
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(ranking.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_create_player)
            .service(api_ranking)
            .service(api_register_entrant)
            .service(api_import_roster)
            .service(api_remove_entrants)
            .service(api_preview_groups)
            .service(api_generate_groups)
            .service(api_tournament_standings)
            .service(api_group_standings)
            .service(api_generate_playoffs)
            .service(api_next_round)
            .service(api_record_result)
            .service(api_swap_entrants)
            .service(api_disqualify)
            .service(api_finalize)
            .service(api_assign_points)
            .service(api_ranking_points)
            .service(api_recompute_ranking)
    })
    .bind(bind)?
    .run()
    .await
}
