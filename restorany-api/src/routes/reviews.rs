use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::models::{NewReview, Review, ReviewId, ReviewPage, ReviewPatch, UserId, VenueId},
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_review))
        .route("/:id", put(edit_review).delete(retract_review))
        .route("/restaurant/:id", get(venue_reviews))
        .route("/user/:id", get(user_reviews))
}

#[instrument(
    name = "POST /reviews",
    skip(app_state, body),
    fields(user_id = %body.user_id, venue_id = %body.venue_id)
)]
async fn submit_review(
    State(app_state): State<AppState>,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let review = app_state.ledger.submit(body).await?;
    tracing::info!("Review {} submitted for venue {}", review.id, review.venue_id);
    Ok((StatusCode::CREATED, Json(review)))
}

#[instrument(name = "PUT /reviews/:id", skip(app_state, body))]
async fn edit_review(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ReviewPatch>,
) -> Result<Json<Review>, ApiError> {
    let review = app_state.ledger.edit(ReviewId::new(id), body).await?;
    Ok(Json(review))
}

#[instrument(name = "DELETE /reviews/:id", skip(app_state))]
async fn retract_review(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state.ledger.retract(ReviewId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<i64>,
    limit: Option<i64>,
}

#[instrument(name = "GET /reviews/restaurant/:id", skip(app_state))]
async fn venue_reviews(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PageParams>,
) -> Result<Json<ReviewPage>, ApiError> {
    let page = app_state
        .ledger
        .venue_reviews(VenueId::new(id), params.page, params.limit)
        .await?;
    Ok(Json(page))
}

#[instrument(name = "GET /reviews/user/:id", skip(app_state))]
async fn user_reviews(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = app_state.ledger.user_reviews(UserId::new(id)).await?;
    Ok(Json(reviews))
}
