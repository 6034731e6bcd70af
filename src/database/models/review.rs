use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub stylist_id: i64,
    pub rating: i64,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewCreate {
    pub stylist_id: i64,
    pub rating: i64,
    pub review_text: Option<String>,
}
