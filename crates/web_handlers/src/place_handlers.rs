use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use auth_services::middleware::AuthenticatedUser;
use listing_services::*;

/// Lists every place (public)
pub async fn list_places(place_service: web::Data<PlaceService>) -> Result<HttpResponse, ListingError> {
    let places = place_service.list_places().await?;
    Ok(HttpResponse::Ok().json(places))
}

/// Gets a single place by ID (public)
pub async fn get_place(
    place_service: web::Data<PlaceService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ListingError> {
    let place = place_service.get_place(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(place))
}

/// Lists the places owned by the authenticated user
pub async fn user_places(
    place_service: web::Data<PlaceService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ListingError> {
    let places = place_service.list_owner_places(&user.0).await?;
    Ok(HttpResponse::Ok().json(places))
}

/// Creates a place owned by the authenticated user
pub async fn create_place(
    place_service: web::Data<PlaceService>,
    user: AuthenticatedUser,
    request: web::Json<PlaceInput>,
) -> Result<HttpResponse, ListingError> {
    let place = place_service
        .create_place(&user.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(place))
}

/// Updates a place; only its owner may do so
pub async fn update_place(
    place_service: web::Data<PlaceService>,
    user: AuthenticatedUser,
    request: web::Json<UpdatePlaceRequest>,
) -> Result<HttpResponse, ListingError> {
    place_service
        .update_place(&user.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
