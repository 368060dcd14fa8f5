//! Single binary web server: JSON API that a chat bot or other front-end drives.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, MAFIA_DB (SQLite path), MAFIA_SEED (role shuffle seed).

use actix_web::{
    get, post,
    web::{Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use mafia_game::{Config, GameError, GameSession, PlayerId, SqliteStore};
use serde::Deserialize;
use std::sync::RwLock;

/// The one game this server hosts.
type AppState = Data<RwLock<GameSession<SqliteStore>>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterPlayerBody {
    id: PlayerId,
    username: String,
}

#[derive(Deserialize)]
struct CastVoteBody {
    voter_id: PlayerId,
    voter_username: String,
    target: String,
}

#[derive(Deserialize)]
struct ResetRoundBody {
    #[serde(default)]
    include_deaths: bool,
}

fn error_response(e: &GameError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        GameError::DuplicateId(_) => HttpResponse::Conflict().json(body),
        GameError::TransactionFailure(_) => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(body)
        }
        GameError::NotEnoughPlayers { .. } | GameError::InvalidState => {
            HttpResponse::BadRequest().json(body)
        }
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "lock error" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "mafia-game",
    })
}

/// Phase, round number and who is still alive.
#[get("/api/game")]
async fn api_get_game(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.snapshot() {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => error_response(&e),
    }
}

/// Register a player (Setup only).
#[post("/api/players")]
async fn api_register_player(state: AppState, body: Json<RegisterPlayerBody>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.register_player(body.id, body.username.trim()) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "registered": body.id })),
        Err(e) => error_response(&e),
    }
}

/// Mafia usernames, sent privately to mafia members by the front-end.
#[get("/api/game/mafia")]
async fn api_mafia(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.roster().mafia_usernames() {
        Ok(names) => HttpResponse::Ok().json(names),
        Err(e) => error_response(&e),
    }
}

/// Assign roles and open the first night.
#[post("/api/game/start")]
async fn api_start_game(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.start_game().and_then(|()| g.snapshot()) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => error_response(&e),
    }
}

/// Cast a vote in the current phase; `accepted` is false for rejected votes.
#[post("/api/game/votes")]
async fn api_cast_vote(state: AppState, body: Json<CastVoteBody>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.cast_vote(body.voter_id, &body.voter_username, &body.target) {
        Ok(accepted) => HttpResponse::Ok().json(serde_json::json!({ "accepted": accepted })),
        Err(e) => error_response(&e),
    }
}

/// Resolve the current night or day and advance the phase.
#[post("/api/game/resolve")]
async fn api_resolve_round(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.resolve_round() {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    }
}

#[get("/api/game/winner")]
async fn api_check_winner(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.check_winner() {
        Ok(winner) => HttpResponse::Ok().json(serde_json::json!({ "winner": winner })),
        Err(e) => error_response(&e),
    }
}

/// Clear votes; with `include_deaths`, also revive everyone.
#[post("/api/game/reset")]
async fn api_reset_round(state: AppState, body: Option<Json<ResetRoundBody>>) -> HttpResponse {
    let include_deaths = body.map(|b| b.include_deaths).unwrap_or(false);
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.reset_round(include_deaths).and_then(|()| g.snapshot()) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => error_response(&e),
    }
}

/// Back to Setup with the same players.
#[post("/api/game/restart")]
async fn api_restart(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.restart().and_then(|()| g.snapshot()) {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => error_response(&e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let store = SqliteStore::open(&config.db_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let session = match config.seed {
        Some(seed) => {
            log::info!("Role shuffles seeded with {}", seed);
            GameSession::seeded(store, seed)
        }
        None => GameSession::new(store),
    };

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{} (db: {})", bind.0, bind.1, config.db_path);

    let state = Data::new(RwLock::new(session));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_get_game)
            .service(api_register_player)
            .service(api_mafia)
            .service(api_start_game)
            .service(api_cast_vote)
            .service(api_resolve_round)
            .service(api_check_winner)
            .service(api_reset_round)
            .service(api_restart)
    })
    .bind(bind)?
    .run()
    .await
}
