use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::middleware::AuthGuard;
use crate::database::models::{Review, ReviewCreate};
use crate::errors::ApiError;

pub fn reviews_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .service(create_review)
            .service(average_rating),
    );
}

#[post("/stylist")]
async fn create_review(
    body: web::Json<ReviewCreate>,
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let user = auth.principal.into_client().ok_or_else(|| {
        ApiError::Forbidden(
            "Unauthorized access, please login as a client to review stylists".to_string(),
        )
    })?;

    let review = body.into_inner();

    let stylist = sqlx::query_as::<_, (i64,)>("SELECT id FROM stylists WHERE id = ?")
        .bind(review.stylist_id)
        .fetch_optional(pool.as_ref())
        .await?;
    if stylist.is_none() {
        return Err(ApiError::NotFound("Stylist not found".to_string()));
    }

    // The schema CHECK would also catch this; rejecting here keeps the
    // message readable.
    if !(1..=5).contains(&review.rating) {
        return Err(ApiError::InvalidRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"INSERT INTO reviews (user_id, stylist_id, rating, review_text, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(user.id)
    .bind(review.stylist_id)
    .bind(review.rating)
    .bind(review.review_text)
    .bind(Utc::now())
    .execute(pool.as_ref())
    .await?;

    let created = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool.as_ref())
        .await?;

    Ok(HttpResponse::Created().json(created))
}

#[derive(Debug, Deserialize)]
struct AverageRatingQuery {
    stylist_id: i64,
}

/// Mean of all ratings for the stylist, rounded to two decimals. Zero
/// reviews is 0.0, not an error.
#[get("/average_rating")]
async fn average_rating(
    query: web::Query<AverageRatingQuery>,
    pool: web::Data<SqlitePool>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let average =
        sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(rating) FROM reviews WHERE stylist_id = ?")
            .bind(query.stylist_id)
            .fetch_one(pool.as_ref())
            .await?;

    let rounded = match average {
        Some(value) => (value * 100.0).round() / 100.0,
        None => 0.0,
    };

    Ok(HttpResponse::Ok().json(rounded))
}
