// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{answer, group, leaderboard, question},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (groups, questions, answers, leaderboard).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, dispatcher, scorer).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let group_routes = Router::new()
        .route("/groups", get(group::list_groups).post(group::create_group))
        .route(
            "/groups/{id}",
            put(group::update_group).delete(group::delete_group),
        );

    let question_routes = Router::new()
        .route(
            "/questions",
            get(question::list_questions).post(question::create_question),
        )
        .route("/questions/{id}", delete(question::delete_question))
        .route("/questions/{id}/send", post(question::send_question))
        .route("/questions/{id}/expire", post(question::expire_question))
        .route("/active-question", get(question::get_active_question));

    let answer_routes = Router::new()
        .route("/answer", post(answer::submit_answer))
        .route("/answers/{question_id}", get(answer::get_question_answers))
        .route(
            "/participant/{ticket_id}",
            get(answer::get_participant_results),
        );

    let leaderboard_routes =
        Router::new().route("/leaderboard", get(leaderboard::get_leaderboard));

    Router::new()
        .nest(
            "/api/quiz",
            Router::new()
                .merge(group_routes)
                .merge(question_routes)
                .merge(answer_routes)
                .merge(leaderboard_routes),
        )
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
