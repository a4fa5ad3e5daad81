use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 ().-]{5,19}$").unwrap();
}

fn default_max_guests() -> i32 {
    1
}

/// A listed property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Unique identifier for the place
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// ID of the user who owns the place
    pub owner: Uuid,
    /// Listing title
    pub title: String,
    /// Street address
    pub address: String,
    /// Photo URLs, in display order
    pub photos: Vec<String>,
    /// Free-form description
    pub description: String,
    /// Amenity tags such as `wifi` or `parking`
    pub perks: Vec<String>,
    /// House rules and other notes
    pub extra_info: String,
    /// Check-in time, as entered by the owner
    pub check_in: String,
    /// Check-out time, as entered by the owner
    pub check_out: String,
    /// Maximum number of guests
    pub max_guests: i32,
    /// Price per night in whole currency units
    pub price: i64,
    /// When the place was created
    pub created_at: DateTime<Utc>,
    /// When the place was last updated
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Overwrites every field present in `changes`.
    pub fn apply(&mut self, changes: PlaceChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(address) = changes.address {
            self.address = address;
        }
        if let Some(photos) = changes.photos {
            self.photos = photos;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(perks) = changes.perks {
            self.perks = perks;
        }
        if let Some(extra_info) = changes.extra_info {
            self.extra_info = extra_info;
        }
        if let Some(check_in) = changes.check_in {
            self.check_in = check_in;
        }
        if let Some(check_out) = changes.check_out {
            self.check_out = check_out;
        }
        if let Some(max_guests) = changes.max_guests {
            self.max_guests = max_guests;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        self.updated_at = Utc::now();
    }

    /// Validates the stored fields after an update was applied.
    pub fn check(&self) -> Result<(), ListingError> {
        if self.title.trim().is_empty() || self.title.chars().count() > 255 {
            return Err(ListingError::Validation(
                "Title must be between 1 and 255 characters".to_string(),
            ));
        }
        if self.max_guests < 1 {
            return Err(ListingError::Validation(
                "Max guests must be at least 1".to_string(),
            ));
        }
        if self.price < 0 {
            return Err(ListingError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request structure for creating a place
#[serde_as]
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInput {
    /// Listing title
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    /// Street address
    #[serde(default)]
    pub address: String,

    /// Photo URLs; the place form submits them as `addedPhotos`
    #[serde(default, alias = "addedPhotos")]
    pub photos: Vec<String>,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Amenity tags
    #[serde(default)]
    pub perks: Vec<String>,

    /// House rules and other notes
    #[serde(default)]
    pub extra_info: String,

    /// Check-in time
    #[serde(default)]
    pub check_in: String,

    /// Check-out time
    #[serde(default)]
    pub check_out: String,

    /// Maximum number of guests
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_max_guests")]
    #[validate(range(min = 1, message = "Max guests must be at least 1"))]
    pub max_guests: i32,

    /// Price per night
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
}

/// Fields of a place that an update may overwrite; absent fields are kept
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceChanges {
    /// New title
    pub title: Option<String>,
    /// New address
    pub address: Option<String>,
    /// New photo list
    #[serde(alias = "addedPhotos")]
    pub photos: Option<Vec<String>>,
    /// New description
    pub description: Option<String>,
    /// New perks
    pub perks: Option<Vec<String>>,
    /// New extra info
    pub extra_info: Option<String>,
    /// New check-in time
    pub check_in: Option<String>,
    /// New check-out time
    pub check_out: Option<String>,
    /// New guest limit
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub max_guests: Option<i32>,
    /// New price
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub price: Option<i64>,
}

/// Request structure for `PUT /api/places`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlaceRequest {
    /// ID of the place to update
    pub id: Uuid,
    /// Fields to overwrite
    #[serde(flatten)]
    pub changes: PlaceChanges,
}

/// A reservation of a place by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique identifier for the booking
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// ID of the booked place
    pub place: Uuid,
    /// ID of the user who made the booking
    pub user: Uuid,
    /// Arrival date
    pub check_in: NaiveDate,
    /// Departure date
    pub check_out: NaiveDate,
    /// Number of guests
    pub number_of_guests: i32,
    /// Contact name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Total price in whole currency units
    pub price: i64,
    /// When the booking was made
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        nights_between(self.check_in, self.check_out)
    }
}

/// Request structure for `POST /api/bookings`
#[serde_as]
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// ID of the place to book
    pub place: Uuid,

    /// Arrival date
    pub check_in: NaiveDate,

    /// Departure date
    pub check_out: NaiveDate,

    /// Number of guests
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_max_guests")]
    #[validate(range(min = 1, message = "At least one guest is required"))]
    pub number_of_guests: i32,

    /// Contact name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Contact phone
    #[validate(regex(path = *PHONE_REGEX, message = "Please enter a valid phone number"))]
    pub phone: String,

    /// Total price; computed from the place's nightly price when omitted
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
}

/// A booking with its place embedded, as returned by `GET /api/bookings`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    /// Unique identifier for the booking
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// The booked place
    pub place: Place,
    /// ID of the user who made the booking
    pub user: Uuid,
    /// Arrival date
    pub check_in: NaiveDate,
    /// Departure date
    pub check_out: NaiveDate,
    /// Number of guests
    pub number_of_guests: i32,
    /// Contact name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Total price
    pub price: i64,
    /// When the booking was made
    pub created_at: DateTime<Utc>,
}

impl BookingDetails {
    /// Joins a booking with its place.
    pub fn new(booking: Booking, place: Place) -> Self {
        Self {
            id: booking.id,
            place,
            user: booking.user,
            check_in: booking.check_in,
            check_out: booking.check_out,
            number_of_guests: booking.number_of_guests,
            name: booking.name,
            phone: booking.phone,
            price: booking.price,
            created_at: booking.created_at,
        }
    }
}

/// Number of nights between two dates; negative when reversed.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Custom error type for place and booking operations
#[derive(thiserror::Error, Debug)]
pub enum ListingError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Place not found
    #[error("Place not found")]
    PlaceNotFound,

    /// The booking user no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Caller does not own the place
    #[error("Not the owner of this place")]
    NotOwner,

    /// Invalid date range
    #[error("Invalid date range: check-out date must be after check-in date")]
    InvalidDateRange,
}

impl actix_web::ResponseError for ListingError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            ListingError::Validation(_) | ListingError::InvalidDateRange => StatusCode::BAD_REQUEST,
            ListingError::PlaceNotFound | ListingError::UserNotFound => StatusCode::NOT_FOUND,
            ListingError::NotOwner => StatusCode::FORBIDDEN,
            ListingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        let body = match self {
            ListingError::Validation(msg) => serde_json::json!({
                "error": "validation_error",
                "message": msg
            }),
            ListingError::PlaceNotFound => serde_json::json!({
                "error": "place_not_found",
                "message": "Place not found"
            }),
            ListingError::UserNotFound => serde_json::json!({
                "error": "user_not_found",
                "message": "User not found"
            }),
            ListingError::NotOwner => serde_json::json!({
                "error": "not_owner",
                "message": "You are not the owner of this place"
            }),
            ListingError::InvalidDateRange => serde_json::json!({
                "error": "invalid_date_range",
                "message": "Check-out date must be after check-in date"
            }),
            ListingError::Database(e) => {
                log::error!("❌ Listing query failed: {}", e);
                serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
