use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::Service;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Stylist {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StylistResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub services: Vec<Service>,
}

impl StylistResponse {
    pub fn new(stylist: Stylist, services: Vec<Service>) -> Self {
        StylistResponse {
            id: stylist.id,
            username: stylist.username,
            email: stylist.email,
            role: stylist.role,
            bio: stylist.bio,
            specialization: stylist.specialization,
            verified: stylist.verified,
            is_active: stylist.is_active,
            created_at: stylist.created_at,
            services,
        }
    }
}

/// Short form embedded in service detail responses.
#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct StylistSummary {
    pub id: i64,
    pub username: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStylistSchema {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub service_ids: Option<Vec<i64>>,
}

/// Whitelisted patch. A supplied `service_ids` list replaces the whole
/// association set rather than merging into it.
#[derive(Debug, Deserialize)]
pub struct StylistUpdate {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub verified: Option<bool>,
    pub is_active: Option<bool>,
    pub service_ids: Option<Vec<i64>>,
}
