use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{Booking, ListingError, Place};

const BOOKING_PLACE_FK: &str = "bookings_place_id_fkey";
const BOOKING_USER_FK: &str = "bookings_user_id_fkey";

/// Maps a violated `bookings` foreign key to the row that went missing.
fn missing_reference(constraint: Option<&str>) -> Option<ListingError> {
    match constraint? {
        BOOKING_PLACE_FK => Some(ListingError::PlaceNotFound),
        BOOKING_USER_FK => Some(ListingError::UserNotFound),
        _ => None,
    }
}

/// Storage operations for places.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Stores a new place.
    async fn insert(&self, place: Place) -> Result<Place, ListingError>;

    /// Looks a place up by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Place>, ListingError>;

    /// Looks up several places at once; missing ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Place>, ListingError>;

    /// Every place, oldest first.
    async fn list_all(&self) -> Result<Vec<Place>, ListingError>;

    /// Places owned by `owner`, oldest first.
    async fn list_by_owner(&self, owner: &Uuid) -> Result<Vec<Place>, ListingError>;

    /// Writes every field of `place` back to storage.
    async fn update(&self, place: &Place) -> Result<(), ListingError>;
}

/// Storage operations for bookings.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Stores a new booking.
    async fn insert(&self, booking: Booking) -> Result<Booking, ListingError>;

    /// Bookings made by `user`, oldest first.
    async fn list_for_user(&self, user: &Uuid) -> Result<Vec<Booking>, ListingError>;
}

const PLACE_COLUMNS: &str = "id, owner_id, title, address, photos, description, perks, \
     extra_info, check_in, check_out, max_guests, price, created_at, updated_at";

const BOOKING_COLUMNS: &str =
    "id, place_id, user_id, check_in, check_out, number_of_guests, name, phone, price, created_at";

fn place_from_row(row: &PgRow) -> Place {
    Place {
        id: row.get("id"),
        owner: row.get("owner_id"),
        title: row.get("title"),
        address: row.get("address"),
        photos: row.get("photos"),
        description: row.get("description"),
        perks: row.get("perks"),
        extra_info: row.get("extra_info"),
        check_in: row.get("check_in"),
        check_out: row.get("check_out"),
        max_guests: row.get("max_guests"),
        price: row.get("price"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn booking_from_row(row: &PgRow) -> Booking {
    Booking {
        id: row.get("id"),
        place: row.get("place_id"),
        user: row.get("user_id"),
        check_in: row.get("check_in"),
        check_out: row.get("check_out"),
        number_of_guests: row.get("number_of_guests"),
        name: row.get("name"),
        phone: row.get("phone"),
        price: row.get("price"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL-backed place storage.
pub struct PgPlaceRepository {
    pool: PgPool,
}

impl PgPlaceRepository {
    /// Creates a new repository over the provided connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn insert(&self, place: Place) -> Result<Place, ListingError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO places (
                id, owner_id, title, address, photos, description, perks,
                extra_info, check_in, check_out, max_guests, price, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {PLACE_COLUMNS}
            "#
        ))
        .bind(place.id)
        .bind(place.owner)
        .bind(&place.title)
        .bind(&place.address)
        .bind(&place.photos)
        .bind(&place.description)
        .bind(&place.perks)
        .bind(&place.extra_info)
        .bind(&place.check_in)
        .bind(&place.check_out)
        .bind(place.max_guests)
        .bind(place.price)
        .bind(place.created_at)
        .bind(place.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(place_from_row(&row))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Place>, ListingError> {
        let row = sqlx::query(&format!("SELECT {PLACE_COLUMNS} FROM places WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(place_from_row))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Place>, ListingError> {
        let rows = sqlx::query(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(place_from_row).collect())
    }

    async fn list_all(&self) -> Result<Vec<Place>, ListingError> {
        let rows = sqlx::query(&format!(
            "SELECT {PLACE_COLUMNS} FROM places ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(place_from_row).collect())
    }

    async fn list_by_owner(&self, owner: &Uuid) -> Result<Vec<Place>, ListingError> {
        let rows = sqlx::query(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE owner_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(place_from_row).collect())
    }

    async fn update(&self, place: &Place) -> Result<(), ListingError> {
        let result = sqlx::query(
            r#"
            UPDATE places
            SET title = $2,
                address = $3,
                photos = $4,
                description = $5,
                perks = $6,
                extra_info = $7,
                check_in = $8,
                check_out = $9,
                max_guests = $10,
                price = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(place.id)
        .bind(&place.title)
        .bind(&place.address)
        .bind(&place.photos)
        .bind(&place.description)
        .bind(&place.perks)
        .bind(&place.extra_info)
        .bind(&place.check_in)
        .bind(&place.check_out)
        .bind(place.max_guests)
        .bind(place.price)
        .bind(place.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ListingError::PlaceNotFound);
        }

        Ok(())
    }
}

/// PostgreSQL-backed booking storage.
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Creates a new repository over the provided connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<Booking, ListingError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (
                id, place_id, user_id, check_in, check_out,
                number_of_guests, name, phone, price, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(booking.place)
        .bind(booking.user)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.number_of_guests)
        .bind(&booking.name)
        .bind(&booking.phone)
        .bind(booking.price)
        .bind(booking.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let missing = match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    missing_reference(db.constraint())
                }
                _ => None,
            };
            missing.unwrap_or(ListingError::Database(e))
        })?;

        Ok(booking_from_row(&row))
    }

    async fn list_for_user(&self, user: &Uuid) -> Result<Vec<Booking>, ListingError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(booking_from_row).collect())
    }
}

/// In-process place storage for tests and local experiments.
#[derive(Default)]
pub struct InMemoryPlaceRepository {
    places: RwLock<HashMap<Uuid, Place>>,
}

impl InMemoryPlaceRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first(mut places: Vec<Place>) -> Vec<Place> {
    places.sort_by_key(|p| p.created_at);
    places
}

#[async_trait]
impl PlaceRepository for InMemoryPlaceRepository {
    async fn insert(&self, place: Place) -> Result<Place, ListingError> {
        self.places.write().await.insert(place.id, place.clone());
        Ok(place)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Place>, ListingError> {
        Ok(self.places.read().await.get(id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Place>, ListingError> {
        let places = self.places.read().await;
        Ok(ids.iter().filter_map(|id| places.get(id).cloned()).collect())
    }

    async fn list_all(&self) -> Result<Vec<Place>, ListingError> {
        let places = self.places.read().await;
        Ok(oldest_first(places.values().cloned().collect()))
    }

    async fn list_by_owner(&self, owner: &Uuid) -> Result<Vec<Place>, ListingError> {
        let places = self.places.read().await;
        Ok(oldest_first(
            places.values().filter(|p| p.owner == *owner).cloned().collect(),
        ))
    }

    async fn update(&self, place: &Place) -> Result<(), ListingError> {
        let mut places = self.places.write().await;
        match places.get_mut(&place.id) {
            Some(stored) => {
                *stored = place.clone();
                Ok(())
            }
            None => Err(ListingError::PlaceNotFound),
        }
    }
}

/// In-process booking storage for tests and local experiments.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

impl InMemoryBookingRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<Booking, ListingError> {
        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn list_for_user(&self, user: &Uuid) -> Result<Vec<Booking>, ListingError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().filter(|b| b.user == *user).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_map_to_the_missing_row() {
        assert!(matches!(
            missing_reference(Some("bookings_place_id_fkey")),
            Some(ListingError::PlaceNotFound)
        ));
        assert!(matches!(
            missing_reference(Some("bookings_user_id_fkey")),
            Some(ListingError::UserNotFound)
        ));
        assert!(missing_reference(Some("places_owner_id_fkey")).is_none());
        assert!(missing_reference(None).is_none());
    }
}
