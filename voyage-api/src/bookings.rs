use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use voyage_core::{Booking, BookingPatch, Listing, NewBooking};

use crate::{error::AppError, middleware::AuthUser, state::AppState};

/// Every booking route requires a bearer token.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings/", get(list_bookings).post(create_booking))
        .route(
            "/bookings/{id}/",
            get(get_booking)
                .put(update_booking)
                .patch(partial_update_booking)
                .delete(delete_booking),
        )
}

async fn load(state: &AppState, id: Uuid) -> Result<Booking, AppError> {
    state
        .booking_repo
        .get_booking(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("No booking with ID {id}.")))
}

/// A referenced listing that does not exist is a bad request, not a 404.
async fn referenced_listing(state: &AppState, listing_id: Uuid) -> Result<Listing, AppError> {
    state
        .listing_repo
        .get_listing(listing_id)
        .await?
        .ok_or_else(|| AppError::ValidationError(format!("Invalid listing_id \"{listing_id}\" - object does not exist.")))
}

/// GET /bookings/
async fn list_bookings(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.booking_repo.list_bookings().await?))
}

/// GET /bookings/{id}/
async fn get_booking(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(load(&state, id).await?))
}

/// POST /bookings/
/// The booking is owned by the caller.
async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<NewBooking>, AppError>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let listing = referenced_listing(&state, req.listing_id).await?;
    let booking = Booking::create(req, user.user_id, &listing)?;
    state.booking_repo.create_booking(&booking).await?;

    tracing::info!("Booking {} created for listing {} by {}", booking.id, listing.id, user.user_id);
    Ok((StatusCode::CREATED, Json(booking)))
}

/// PUT /bookings/{id}/
async fn update_booking(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    WithRejection(Json(req), _): WithRejection<Json<NewBooking>, AppError>,
) -> Result<Json<Booking>, AppError> {
    let mut booking = load(&state, id).await?;
    let listing = referenced_listing(&state, req.listing_id).await?;
    booking.replace(req, &listing)?;
    state.booking_repo.update_booking(&booking).await?;
    Ok(Json(booking))
}

/// PATCH /bookings/{id}/
async fn partial_update_booking(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    WithRejection(Json(patch), _): WithRejection<Json<BookingPatch>, AppError>,
) -> Result<Json<Booking>, AppError> {
    let mut booking = load(&state, id).await?;
    let listing = referenced_listing(&state, patch.listing_id.unwrap_or(booking.listing_id)).await?;
    booking.apply(patch, &listing)?;
    state.booking_repo.update_booking(&booking).await?;
    Ok(Json(booking))
}

/// DELETE /bookings/{id}/
/// Payments are never deleted, so neither is a booking that has one.
async fn delete_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load(&state, id).await?;

    if state.payment_repo.find_by_booking(id).await?.is_some() {
        return Err(AppError::ConflictError(format!("Booking {id} has a payment record and cannot be deleted.")));
    }

    state.booking_repo.delete_booking(id).await?;
    tracing::info!("Booking {} deleted by {}", id, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
