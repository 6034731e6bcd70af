use std::collections::HashMap;

use actix_web::{get, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::middleware::{AuthGuard, StylistGuard};
use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{
    PasswordChange, Service, Stylist, StylistResponse, StylistServiceRow,
};
use crate::errors::ApiError;

pub fn stylists_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stylists")
            .service(search_stylists)
            .service(change_password)
            .service(list_stylists)
            .service(get_stylist),
    );
}

/// Loads stylists together with their service sets in two queries: one for
/// the rows, one batch join over the association table.
pub(crate) async fn stylists_with_services(
    pool: &SqlitePool,
    only_active: bool,
) -> Result<Vec<StylistResponse>, ApiError> {
    let query = if only_active {
        "SELECT * FROM stylists WHERE is_active = 1 ORDER BY username"
    } else {
        "SELECT * FROM stylists ORDER BY username"
    };

    let stylists = sqlx::query_as::<_, Stylist>(query).fetch_all(pool).await?;

    let mut services = service_sets(pool).await?;

    Ok(stylists
        .into_iter()
        .map(|stylist| {
            let set = services.remove(&stylist.id).unwrap_or_default();
            StylistResponse::new(stylist, set)
        })
        .collect())
}

pub(crate) async fn service_sets(
    pool: &SqlitePool,
) -> Result<HashMap<i64, Vec<Service>>, ApiError> {
    let rows = sqlx::query_as::<_, StylistServiceRow>(
        r#"SELECT ss.stylist_id, s.service_id, s.name, s.description, s.duration, s.price, s.created_at
           FROM stylist_services ss
           JOIN services s ON s.service_id = ss.service_id
           ORDER BY s.name"#,
    )
    .fetch_all(pool)
    .await?;

    let mut sets: HashMap<i64, Vec<Service>> = HashMap::new();
    for row in rows {
        sets.entry(row.stylist_id).or_default().push(row.into_service());
    }
    Ok(sets)
}

pub(crate) async fn stylist_with_services(
    pool: &SqlitePool,
    stylist_id: i64,
) -> Result<StylistResponse, ApiError> {
    let stylist = sqlx::query_as::<_, Stylist>("SELECT * FROM stylists WHERE id = ?")
        .bind(stylist_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Stylist with id {stylist_id} does not exist"))
        })?;

    let services = sqlx::query_as::<_, Service>(
        r#"SELECT s.service_id, s.name, s.description, s.duration, s.price, s.created_at
           FROM stylist_services ss
           JOIN services s ON s.service_id = ss.service_id
           WHERE ss.stylist_id = ?
           ORDER BY s.name"#,
    )
    .bind(stylist_id)
    .fetch_all(pool)
    .await?;

    Ok(StylistResponse::new(stylist, services))
}

#[get("")]
async fn list_stylists(
    pool: web::Data<SqlitePool>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let stylists = stylists_with_services(pool.as_ref(), true).await?;
    Ok(HttpResponse::Ok().json(stylists))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    specialization: String,
}

#[get("/search")]
async fn search_stylists(
    query: web::Query<SearchQuery>,
    pool: web::Data<SqlitePool>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let stylists = sqlx::query_as::<_, Stylist>(
        r#"SELECT * FROM stylists
           WHERE is_active = 1 AND specialization LIKE '%' || ? || '%'
           ORDER BY username"#,
    )
    .bind(&query.specialization)
    .fetch_all(pool.as_ref())
    .await?;

    let mut services = service_sets(pool.as_ref()).await?;

    let stylists: Vec<StylistResponse> = stylists
        .into_iter()
        .map(|stylist| {
            let set = services.remove(&stylist.id).unwrap_or_default();
            StylistResponse::new(stylist, set)
        })
        .collect();

    Ok(HttpResponse::Ok().json(stylists))
}

#[get("/{id}")]
async fn get_stylist(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let stylist = stylist_with_services(pool.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stylist))
}

#[put("/profile/change_password")]
async fn change_password(
    body: web::Json<PasswordChange>,
    pool: web::Data<SqlitePool>,
    guard: StylistGuard,
) -> Result<HttpResponse, ApiError> {
    let change = body.into_inner();

    if !verify_password(&change.old_password, &guard.stylist.password_hash) {
        return Err(ApiError::Forbidden("Old password is incorrect".to_string()));
    }

    let password_hash =
        hash_password(&change.new_password).map_err(|_| ApiError::InternalError)?;

    sqlx::query("UPDATE stylists SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(guard.stylist.id)
        .execute(pool.as_ref())
        .await?;

    let stylist = stylist_with_services(pool.as_ref(), guard.stylist.id).await?;
    Ok(HttpResponse::Ok().json(stylist))
}
