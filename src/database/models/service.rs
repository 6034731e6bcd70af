use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stylist::StylistSummary;

// The catalog table keeps its historical `service_id` key name, unlike the
// `id` column every other table uses.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Service {
    pub service_id: i64,
    pub name: String,
    pub description: String,
    pub duration: i64,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ServiceWithStylists {
    #[serde(flatten)]
    pub service: Service,
    pub stylists: Vec<StylistSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceSchema {
    pub name: String,
    pub description: String,
    pub duration: i64,
    pub price: f64,
    pub stylist_ids: Option<Vec<i64>>,
}

/// Whitelisted patch. A supplied `stylist_ids` list replaces the whole
/// association set rather than merging into it.
#[derive(Debug, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub price: Option<f64>,
    pub stylist_ids: Option<Vec<i64>>,
}

/// One association row joined with its service columns, used to batch-load
/// service lists for many stylists at once.
#[derive(Debug, sqlx::FromRow)]
pub struct StylistServiceRow {
    pub stylist_id: i64,
    pub service_id: i64,
    pub name: String,
    pub description: String,
    pub duration: i64,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl StylistServiceRow {
    pub fn into_service(self) -> Service {
        Service {
            service_id: self.service_id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            price: self.price,
            created_at: self.created_at,
        }
    }
}
