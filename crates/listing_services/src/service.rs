use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::repository::{BookingRepository, PlaceRepository};
use crate::types::*;

/// Service for creating, reading and updating places
#[derive(Clone)]
pub struct PlaceService {
    places: Arc<dyn PlaceRepository>,
}

impl PlaceService {
    /// Creates a new instance of `PlaceService` over the given storage
    pub fn new(places: Arc<dyn PlaceRepository>) -> Self {
        Self { places }
    }

    /// Creates a place owned by `owner`
    pub async fn create_place(&self, owner: &Uuid, input: PlaceInput) -> Result<Place, ListingError> {
        input
            .validate()
            .map_err(|e| ListingError::Validation(format!("Validation error: {}", e)))?;

        let now = Utc::now();
        let place = Place {
            id: Uuid::new_v4(),
            owner: *owner,
            title: input.title.trim().to_string(),
            address: input.address,
            photos: input.photos,
            description: input.description,
            perks: input.perks,
            extra_info: input.extra_info,
            check_in: input.check_in,
            check_out: input.check_out,
            max_guests: input.max_guests,
            price: input.price,
            created_at: now,
            updated_at: now,
        };
        place.check()?;

        let place = self.places.insert(place).await?;
        log::info!("🏠 Place {} created by {}", place.id, owner);

        Ok(place)
    }

    /// Gets a place by id
    pub async fn get_place(&self, id: &Uuid) -> Result<Place, ListingError> {
        self.places
            .find_by_id(id)
            .await?
            .ok_or(ListingError::PlaceNotFound)
    }

    /// Gets every place
    pub async fn list_places(&self) -> Result<Vec<Place>, ListingError> {
        self.places.list_all().await
    }

    /// Gets the places owned by `owner`
    pub async fn list_owner_places(&self, owner: &Uuid) -> Result<Vec<Place>, ListingError> {
        self.places.list_by_owner(owner).await
    }

    /// Overwrites the supplied fields of a place owned by `caller`.
    ///
    /// Concurrent updates are not serialized: the last write wins.
    pub async fn update_place(
        &self,
        caller: &Uuid,
        request: UpdatePlaceRequest,
    ) -> Result<Place, ListingError> {
        let mut place = self.get_place(&request.id).await?;

        if place.owner != *caller {
            log::warn!("🚫 User {} tried to edit place {}", caller, place.id);
            return Err(ListingError::NotOwner);
        }

        place.apply(request.changes);
        place.check()?;
        self.places.update(&place).await?;

        Ok(place)
    }
}

/// Service for creating and listing bookings
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    places: Arc<dyn PlaceRepository>,
}

impl BookingService {
    /// Creates a new instance of `BookingService` over the given storage
    pub fn new(bookings: Arc<dyn BookingRepository>, places: Arc<dyn PlaceRepository>) -> Self {
        Self { bookings, places }
    }

    /// Books a place for `user`
    pub async fn create_booking(
        &self,
        user: &Uuid,
        request: BookingRequest,
    ) -> Result<Booking, ListingError> {
        request
            .validate()
            .map_err(|e| ListingError::Validation(format!("Validation error: {}", e)))?;

        let nights = nights_between(request.check_in, request.check_out);
        if nights < 1 {
            return Err(ListingError::InvalidDateRange);
        }

        let place = self
            .places
            .find_by_id(&request.place)
            .await?
            .ok_or(ListingError::PlaceNotFound)?;

        if request.number_of_guests > place.max_guests {
            return Err(ListingError::Validation(format!(
                "This place accepts at most {} guests",
                place.max_guests
            )));
        }

        let price = match request.price {
            Some(price) => price,
            None => nights
                .checked_mul(place.price)
                .ok_or_else(|| ListingError::Validation("Price out of range".to_string()))?,
        };

        let booking = Booking {
            id: Uuid::new_v4(),
            place: place.id,
            user: *user,
            check_in: request.check_in,
            check_out: request.check_out,
            number_of_guests: request.number_of_guests,
            name: request.name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            price,
            created_at: Utc::now(),
        };

        let booking = self.bookings.insert(booking).await?;
        log::info!("📅 Booking {} created for place {}", booking.id, booking.place);

        Ok(booking)
    }

    /// Lists `user`'s bookings with their places embedded
    pub async fn list_user_bookings(&self, user: &Uuid) -> Result<Vec<BookingDetails>, ListingError> {
        let bookings = self.bookings.list_for_user(user).await?;

        let mut place_ids: Vec<Uuid> = bookings.iter().map(|b| b.place).collect();
        place_ids.sort();
        place_ids.dedup();

        let places: HashMap<Uuid, Place> = self
            .places
            .find_many(&place_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let details = bookings
            .into_iter()
            .filter_map(|booking| match places.get(&booking.place) {
                Some(place) => Some(BookingDetails::new(booking, place.clone())),
                None => {
                    log::warn!("⚠️ Booking {} references a missing place", booking.id);
                    None
                }
            })
            .collect();

        Ok(details)
    }
}
