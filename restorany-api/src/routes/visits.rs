use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    domain::models::{NewVisit, UserId, VenueId, Visit, VisitId, VisitStats},
    repositories::VisitRepository,
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(log_visit))
        .route("/:id", delete(delete_visit))
        .route("/restaurant/:id", get(venue_visits))
        .route("/user/:id", get(user_visits))
        .route("/user/:id/stats", get(user_stats))
}

#[instrument(
    name = "POST /visits",
    skip(app_state, body),
    fields(user_id = %body.user_id, venue_id = %body.venue_id)
)]
async fn log_visit(
    State(app_state): State<AppState>,
    Json(body): Json<NewVisit>,
) -> Result<(StatusCode, Json<Visit>), ApiError> {
    let visit = app_state.visit_repo.log(&body).await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

#[instrument(name = "DELETE /visits/:id", skip(app_state))]
async fn delete_visit(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state.visit_repo.delete(VisitId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /visits/restaurant/:id", skip(app_state))]
async fn venue_visits(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Visit>>, ApiError> {
    let visits = app_state.visit_repo.venue_visits(VenueId::new(id)).await?;
    Ok(Json(visits))
}

#[instrument(name = "GET /visits/user/:id", skip(app_state))]
async fn user_visits(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Visit>>, ApiError> {
    let visits = app_state.visit_repo.user_visits(UserId::new(id)).await?;
    Ok(Json(visits))
}

#[instrument(name = "GET /visits/user/:id/stats", skip(app_state))]
async fn user_stats(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VisitStats>, ApiError> {
    let stats = app_state.visit_repo.user_stats(UserId::new(id)).await?;
    Ok(Json(stats))
}
