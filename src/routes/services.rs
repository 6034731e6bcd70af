use actix_web::{get, web, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::middleware::AuthGuard;
use crate::database::models::{Service, ServiceWithStylists, StylistSummary};
use crate::errors::ApiError;

pub fn services_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .service(list_services)
            .service(get_service),
    );
}

pub(crate) async fn service_with_stylists(
    pool: &SqlitePool,
    service_id: i64,
) -> Result<ServiceWithStylists, ApiError> {
    let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE service_id = ?")
        .bind(service_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    let stylists = sqlx::query_as::<_, StylistSummary>(
        r#"SELECT st.id, st.username, st.specialization
           FROM stylist_services ss
           JOIN stylists st ON st.id = ss.stylist_id
           WHERE ss.service_id = ?
           ORDER BY st.username"#,
    )
    .bind(service_id)
    .fetch_all(pool)
    .await?;

    Ok(ServiceWithStylists { service, stylists })
}

#[get("")]
async fn list_services(
    pool: web::Data<SqlitePool>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY name")
        .fetch_all(pool.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(services))
}

#[get("/{id}")]
async fn get_service(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let service = service_with_stylists(pool.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(service))
}
