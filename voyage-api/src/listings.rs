use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use voyage_core::{Listing, ListingPatch, NewListing};

use crate::{error::AppError, middleware::AuthUser, state::AppState};

/// Reads are public; every write needs a bearer token.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings/", get(list_listings).post(create_listing))
        .route(
            "/listings/{id}/",
            get(get_listing)
                .put(update_listing)
                .patch(partial_update_listing)
                .delete(delete_listing),
        )
}

async fn load(state: &AppState, id: Uuid) -> Result<Listing, AppError> {
    state
        .listing_repo
        .get_listing(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("No listing with ID {id}.")))
}

/// GET /listings/
async fn list_listings(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, AppError> {
    Ok(Json(state.listing_repo.list_listings().await?))
}

/// GET /listings/{id}/
async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Listing>, AppError> {
    Ok(Json(load(&state, id).await?))
}

/// POST /listings/
async fn create_listing(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<NewListing>, AppError>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    let listing = Listing::create(req)?;
    state.listing_repo.create_listing(&listing).await?;

    tracing::info!("Listing {} created by {}", listing.id, user.user_id);
    Ok((StatusCode::CREATED, Json(listing)))
}

/// PUT /listings/{id}/
async fn update_listing(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    WithRejection(Json(req), _): WithRejection<Json<NewListing>, AppError>,
) -> Result<Json<Listing>, AppError> {
    let mut listing = load(&state, id).await?;
    listing.replace(req)?;
    state.listing_repo.update_listing(&listing).await?;
    Ok(Json(listing))
}

/// PATCH /listings/{id}/
async fn partial_update_listing(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    WithRejection(Json(patch), _): WithRejection<Json<ListingPatch>, AppError>,
) -> Result<Json<Listing>, AppError> {
    let mut listing = load(&state, id).await?;
    listing.apply(patch)?;
    state.listing_repo.update_listing(&listing).await?;
    Ok(Json(listing))
}

/// DELETE /listings/{id}/
/// Listings that still have bookings are kept.
async fn delete_listing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load(&state, id).await?;

    let booked = state
        .booking_repo
        .list_bookings()
        .await?
        .iter()
        .any(|b| b.listing_id == id);
    if booked {
        return Err(AppError::ConflictError(format!("Listing {id} has bookings and cannot be deleted.")));
    }

    state.listing_repo.delete_listing(id).await?;
    tracing::info!("Listing {} deleted by {}", id, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
