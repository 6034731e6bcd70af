use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a booking. `Rejected` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "rejected" => Some(BookingStatus::Rejected),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// The only legal moves: pending -> confirmed, pending -> rejected,
    /// confirmed -> completed.
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        matches!(
            (self, target),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub stylist_id: i64,
    pub service_id: i64,
    pub appointment_time: DateTime<Utc>,
    pub status: String,
}

/// Booking row joined with the stylist username and service name. The two
/// extra fields are computed on read and never persisted.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BookingDetails {
    pub id: i64,
    pub user_id: i64,
    pub stylist_id: i64,
    pub service_id: i64,
    pub appointment_time: DateTime<Utc>,
    pub status: String,
    pub stylist_name: String,
    pub service_name: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingCreate {
    pub stylist_id: i64,
    pub service_id: i64,
    pub appointment_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BookingCreateForUser {
    pub user_id: i64,
    pub stylist_id: i64,
    pub service_id: i64,
    pub appointment_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BookingReschedule {
    pub booking_id: i64,
    pub appointment_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BookingList {
    pub previous_bookings: Vec<BookingDetails>,
    pub upcoming_bookings: Vec<BookingDetails>,
}
