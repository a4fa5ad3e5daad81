use actix_web::{HttpResponse, Result, web};

use auth_services::middleware::AuthenticatedUser;
use listing_services::{BookingRequest, BookingService, ListingError};

/// Books a place for the authenticated user
pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    user: AuthenticatedUser,
    request: web::Json<BookingRequest>,
) -> Result<HttpResponse, ListingError> {
    let booking = booking_service
        .create_booking(&user.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// Lists the authenticated user's bookings with their places
pub async fn list_bookings(
    booking_service: web::Data<BookingService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ListingError> {
    let bookings = booking_service.list_user_bookings(&user.0).await?;
    Ok(HttpResponse::Ok().json(bookings))
}
