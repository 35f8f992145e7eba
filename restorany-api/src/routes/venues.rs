use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::discovery::geo::GeoPoint,
    domain::discovery::{Candidate, DiscoveryRequest, SortKey},
    domain::models::{NewVenue, Venue, VenueId, VenuePatch},
    repositories::VenueRepository,
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(discover_venues).post(create_venue))
        .route(
            "/:id",
            get(get_venue).put(update_venue).delete(delete_venue),
        )
}

#[derive(Debug, Deserialize)]
struct DiscoverParams {
    lat: Option<f64>,
    lng: Option<f64>,
    radius: Option<f64>,
    q: Option<String>,
    min_rating: Option<f64>,
    category: Option<String>,
    sort: Option<SortKey>,
}

impl DiscoverParams {
    fn center(&self) -> Result<Option<GeoPoint>, ApiError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(Some(GeoPoint::new(lat, lng))),
            (None, None) => Ok(None),
            _ => Err(ApiError::bad_request(
                "lat and lng must be supplied together",
            )),
        }
    }
}

#[instrument(name = "GET /restaurants", skip(app_state, params))]
async fn discover_venues(
    State(app_state): State<AppState>,
    Query(params): Query<DiscoverParams>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    let request = DiscoveryRequest {
        center: params.center()?,
        radius_km: params.radius,
        query: params.q.clone(),
        min_rating: params.min_rating,
        category: params.category.clone(),
        sort: params.sort,
    };

    let candidates = app_state.discovery.discover(request).await?;
    Ok(Json(candidates))
}

#[derive(Debug, Deserialize)]
struct GetVenueParams {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[instrument(name = "GET /restaurants/:id", skip(app_state))]
async fn get_venue(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<GetVenueParams>,
) -> Result<Json<Candidate>, ApiError> {
    let venue = app_state.venue_repo.get(VenueId::new(id)).await?;

    let candidate = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => {
            let center = GeoPoint::new(lat, lng);
            center.validate()?;
            let distance = center.distance_km(&venue.location);
            Candidate::with_distance(venue, distance)
        }
        _ => Candidate::plain(venue),
    };

    Ok(Json(candidate))
}

#[instrument(name = "POST /restaurants", skip(app_state, body), fields(name = %body.name))]
async fn create_venue(
    State(app_state): State<AppState>,
    Json(body): Json<NewVenue>,
) -> Result<(StatusCode, Json<Venue>), ApiError> {
    body.location.validate()?;
    let venue = app_state.venue_repo.create(&body).await?;
    tracing::info!("Created venue {} ({})", venue.id, venue.name);
    Ok((StatusCode::CREATED, Json(venue)))
}

#[instrument(name = "PUT /restaurants/:id", skip(app_state, body))]
async fn update_venue(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<VenuePatch>,
) -> Result<Json<Venue>, ApiError> {
    if let Some(location) = &body.location {
        location.validate()?;
    }
    let venue = app_state.venue_repo.update(VenueId::new(id), &body).await?;
    Ok(Json(venue))
}

#[instrument(name = "DELETE /restaurants/:id", skip(app_state))]
async fn delete_venue(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state.venue_repo.delete(VenueId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
