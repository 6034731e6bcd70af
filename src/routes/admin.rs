use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use sqlx::{SqlitePool, Transaction};

use crate::auth::middleware::AdminGuard;
use crate::auth::password::hash_password;
use crate::database::models::{
    Admin, BookingDetails, BookingStatus, CreateAdminSchema, CreateServiceSchema,
    CreateStylistSchema, ServiceUpdate, SignupSchema, StylistUpdate, User, UserResponse,
    ROLE_ADMIN, ROLE_STYLIST, ROLE_SUPERADMIN,
};
use crate::errors::ApiError;
use crate::routes::bookings::{transition_booking, TransitionActor};
use crate::routes::services::service_with_stylists;
use crate::routes::stylists::{stylist_with_services, stylists_with_services};
use crate::routes::users::create_client;

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admins")
            .service(create_user)
            .service(delete_user)
            .service(list_users)
            .service(create_admin)
            .service(delete_admin)
            .service(create_stylist)
            .service(update_stylist)
            .service(delete_stylist)
            .service(verify_stylist)
            .service(suspend_stylist)
            .service(list_stylists)
            .service(create_service)
            .service(update_service)
            .service(delete_service)
            .service(list_bookings)
            .service(accept_booking)
            .service(reject_booking)
            .service(complete_booking),
    );
}

// --- accounts ---------------------------------------------------------------

#[post("/create_user")]
async fn create_user(
    body: web::Json<SignupSchema>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let user = create_client(pool.as_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

#[delete("/delete_user/{id}")]
async fn delete_user(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let existing = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool.as_ref())
        .await?;
    if existing.is_none() {
        return Err(ApiError::NotFound(
            "The requested user profile does not exist".to_string(),
        ));
    }

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool.as_ref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/users")]
async fn list_users(
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
        .fetch_all(pool.as_ref())
        .await?;

    let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

#[post("/create_admin")]
async fn create_admin(
    body: web::Json<CreateAdminSchema>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let schema = body.into_inner();

    let role = schema.role.unwrap_or_else(|| ROLE_ADMIN.to_string());
    if role != ROLE_ADMIN && role != ROLE_SUPERADMIN {
        return Err(ApiError::InvalidRequest(
            "role must be either admin or superadmin".to_string(),
        ));
    }

    let existing =
        sqlx::query_as::<_, (i64,)>("SELECT id FROM admins WHERE username = ? OR email = ?")
            .bind(&schema.username)
            .bind(&schema.email)
            .fetch_optional(pool.as_ref())
            .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Admin with this username or email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&schema.password).map_err(|_| ApiError::InternalError)?;

    let result = sqlx::query(
        r#"INSERT INTO admins (username, email, password_hash, role, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(&schema.username)
    .bind(&schema.email)
    .bind(password_hash)
    .bind(role)
    .bind(Utc::now())
    .execute(pool.as_ref())
    .await?;

    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool.as_ref())
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&admin)))
}

#[delete("/delete_admin/{id}")]
async fn delete_admin(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let admin_id = path.into_inner();

    let existing = sqlx::query_as::<_, (i64,)>("SELECT id FROM admins WHERE id = ?")
        .bind(admin_id)
        .fetch_optional(pool.as_ref())
        .await?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Admin not found".to_string()));
    }

    sqlx::query("DELETE FROM admins WHERE id = ?")
        .bind(admin_id)
        .execute(pool.as_ref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

// --- stylists ---------------------------------------------------------------

/// Replaces a stylist's service set: every listed service must exist, and
/// either the whole new set is linked or the transaction rolls back.
async fn replace_stylist_services(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    stylist_id: i64,
    service_ids: &[i64],
) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM stylist_services WHERE stylist_id = ?")
        .bind(stylist_id)
        .execute(&mut *tx)
        .await?;

    for service_id in service_ids {
        let service =
            sqlx::query_as::<_, (i64,)>("SELECT service_id FROM services WHERE service_id = ?")
                .bind(service_id)
                .fetch_optional(&mut *tx)
                .await?;
        if service.is_none() {
            return Err(ApiError::NotFound(format!(
                "Service with id {service_id} does not exist"
            )));
        }

        sqlx::query("INSERT INTO stylist_services (stylist_id, service_id) VALUES (?, ?)")
            .bind(stylist_id)
            .bind(service_id)
            .execute(&mut *tx)
            .await?;
    }

    Ok(())
}

/// Mirror of `replace_stylist_services` for the service side.
async fn replace_service_stylists(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    service_id: i64,
    stylist_ids: &[i64],
) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM stylist_services WHERE service_id = ?")
        .bind(service_id)
        .execute(&mut *tx)
        .await?;

    for stylist_id in stylist_ids {
        let stylist = sqlx::query_as::<_, (i64,)>("SELECT id FROM stylists WHERE id = ?")
            .bind(stylist_id)
            .fetch_optional(&mut *tx)
            .await?;
        if stylist.is_none() {
            return Err(ApiError::NotFound(format!(
                "Stylist with id {stylist_id} does not exist"
            )));
        }

        sqlx::query("INSERT INTO stylist_services (stylist_id, service_id) VALUES (?, ?)")
            .bind(stylist_id)
            .bind(service_id)
            .execute(&mut *tx)
            .await?;
    }

    Ok(())
}

#[post("/create_stylist")]
async fn create_stylist(
    body: web::Json<CreateStylistSchema>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let schema = body.into_inner();

    let mut tx = pool.begin().await?;

    let existing =
        sqlx::query_as::<_, (i64,)>("SELECT id FROM stylists WHERE username = ? OR email = ?")
            .bind(&schema.username)
            .bind(&schema.email)
            .fetch_optional(&mut tx)
            .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Stylist with this username or email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&schema.password).map_err(|_| ApiError::InternalError)?;

    let result = sqlx::query(
        r#"INSERT INTO stylists
           (username, email, password_hash, role, bio, specialization, verified, is_active, created_at)
           VALUES (?, ?, ?, ?, ?, ?, 0, 1, ?)"#,
    )
    .bind(&schema.username)
    .bind(&schema.email)
    .bind(password_hash)
    .bind(ROLE_STYLIST)
    .bind(&schema.bio)
    .bind(&schema.specialization)
    .bind(Utc::now())
    .execute(&mut tx)
    .await?;

    let stylist_id = result.last_insert_rowid();

    if let Some(service_ids) = &schema.service_ids {
        replace_stylist_services(&mut tx, stylist_id, service_ids).await?;
    }

    tx.commit().await?;

    let stylist = stylist_with_services(pool.as_ref(), stylist_id).await?;
    Ok(HttpResponse::Created().json(stylist))
}

#[put("/update_stylist/{id}")]
async fn update_stylist(
    path: web::Path<i64>,
    body: web::Json<StylistUpdate>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let stylist_id = path.into_inner();
    let patch = body.into_inner();

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, (i64,)>("SELECT id FROM stylists WHERE id = ?")
        .bind(stylist_id)
        .fetch_optional(&mut tx)
        .await?;
    if existing.is_none() {
        return Err(ApiError::NotFound(
            "The requested stylist profile does not exist".to_string(),
        ));
    }

    sqlx::query(
        r#"UPDATE stylists
           SET email = COALESCE(?, email),
               bio = COALESCE(?, bio),
               specialization = COALESCE(?, specialization),
               verified = COALESCE(?, verified),
               is_active = COALESCE(?, is_active)
           WHERE id = ?"#,
    )
    .bind(patch.email)
    .bind(patch.bio)
    .bind(patch.specialization)
    .bind(patch.verified)
    .bind(patch.is_active)
    .bind(stylist_id)
    .execute(&mut tx)
    .await?;

    if let Some(service_ids) = &patch.service_ids {
        replace_stylist_services(&mut tx, stylist_id, service_ids).await?;
    }

    tx.commit().await?;

    let stylist = stylist_with_services(pool.as_ref(), stylist_id).await?;
    Ok(HttpResponse::Ok().json(stylist))
}

#[delete("/delete_stylist/{id}")]
async fn delete_stylist(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let stylist_id = path.into_inner();

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, (i64,)>("SELECT id FROM stylists WHERE id = ?")
        .bind(stylist_id)
        .fetch_optional(&mut tx)
        .await?;
    if existing.is_none() {
        return Err(ApiError::NotFound(
            "The requested stylist profile does not exist".to_string(),
        ));
    }

    sqlx::query("DELETE FROM stylist_services WHERE stylist_id = ?")
        .bind(stylist_id)
        .execute(&mut tx)
        .await?;

    // Booking history goes with the stylist; the schema cascades.
    sqlx::query("DELETE FROM stylists WHERE id = ?")
        .bind(stylist_id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}

#[post("/stylists/verify/{id}")]
async fn verify_stylist(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let stylist_id = path.into_inner();

    let updated = sqlx::query("UPDATE stylists SET verified = 1 WHERE id = ?")
        .bind(stylist_id)
        .execute(pool.as_ref())
        .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Stylist not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Stylist approved successfully."
    })))
}

#[post("/stylists/suspend/{id}")]
async fn suspend_stylist(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let stylist_id = path.into_inner();

    let updated = sqlx::query("UPDATE stylists SET is_active = 0 WHERE id = ?")
        .bind(stylist_id)
        .execute(pool.as_ref())
        .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Stylist not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Stylist suspended successfully."
    })))
}

#[get("/stylists")]
async fn list_stylists(
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    // Admins see every stylist: active, suspended, verified or not.
    let stylists = stylists_with_services(pool.as_ref(), false).await?;
    Ok(HttpResponse::Ok().json(stylists))
}

// --- services ---------------------------------------------------------------

#[post("/create_service")]
async fn create_service(
    body: web::Json<CreateServiceSchema>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let schema = body.into_inner();

    let mut tx = pool.begin().await?;

    let existing =
        sqlx::query_as::<_, (i64,)>("SELECT service_id FROM services WHERE name = ?")
            .bind(&schema.name)
            .fetch_optional(&mut tx)
            .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Service with this name already exists".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"INSERT INTO services (name, description, duration, price, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(&schema.name)
    .bind(&schema.description)
    .bind(schema.duration)
    .bind(schema.price)
    .bind(Utc::now())
    .execute(&mut tx)
    .await?;

    let service_id = result.last_insert_rowid();

    if let Some(stylist_ids) = &schema.stylist_ids {
        replace_service_stylists(&mut tx, service_id, stylist_ids).await?;
    }

    tx.commit().await?;

    let service = service_with_stylists(pool.as_ref(), service_id).await?;
    Ok(HttpResponse::Created().json(service))
}

#[put("/update_service/{id}")]
async fn update_service(
    path: web::Path<i64>,
    body: web::Json<ServiceUpdate>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let service_id = path.into_inner();
    let patch = body.into_inner();

    let mut tx = pool.begin().await?;

    let existing =
        sqlx::query_as::<_, (i64,)>("SELECT service_id FROM services WHERE service_id = ?")
            .bind(service_id)
            .fetch_optional(&mut tx)
            .await?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Service not found".to_string()));
    }

    sqlx::query(
        r#"UPDATE services
           SET name = COALESCE(?, name),
               description = COALESCE(?, description),
               duration = COALESCE(?, duration),
               price = COALESCE(?, price)
           WHERE service_id = ?"#,
    )
    .bind(patch.name)
    .bind(patch.description)
    .bind(patch.duration)
    .bind(patch.price)
    .bind(service_id)
    .execute(&mut tx)
    .await?;

    if let Some(stylist_ids) = &patch.stylist_ids {
        replace_service_stylists(&mut tx, service_id, stylist_ids).await?;
    }

    tx.commit().await?;

    let service = service_with_stylists(pool.as_ref(), service_id).await?;
    Ok(HttpResponse::Ok().json(service))
}

#[delete("/delete_service/{id}")]
async fn delete_service(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let service_id = path.into_inner();

    let mut tx = pool.begin().await?;

    let existing =
        sqlx::query_as::<_, (i64,)>("SELECT service_id FROM services WHERE service_id = ?")
            .bind(service_id)
            .fetch_optional(&mut tx)
            .await?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Service not found".to_string()));
    }

    sqlx::query("DELETE FROM stylist_services WHERE service_id = ?")
        .bind(service_id)
        .execute(&mut tx)
        .await?;

    sqlx::query("DELETE FROM services WHERE service_id = ?")
        .bind(service_id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}

// --- bookings ---------------------------------------------------------------

#[get("/bookings")]
async fn list_bookings(
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let bookings = sqlx::query_as::<_, BookingDetails>(
        r#"SELECT b.id, b.user_id, b.stylist_id, b.service_id,
                  b.appointment_time, b.status,
                  st.username AS stylist_name, s.name AS service_name
           FROM bookings b
           JOIN stylists st ON st.id = b.stylist_id
           JOIN services s ON s.service_id = b.service_id
           ORDER BY b.appointment_time DESC"#,
    )
    .fetch_all(pool.as_ref())
    .await?;

    Ok(HttpResponse::Ok().json(bookings))
}

#[post("/bookings/accept/{id}")]
async fn accept_booking(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let details = transition_booking(
        pool.as_ref(),
        path.into_inner(),
        TransitionActor::Admin,
        BookingStatus::Confirmed,
    )
    .await?;
    Ok(HttpResponse::Ok().json(details))
}

#[post("/bookings/reject/{id}")]
async fn reject_booking(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let details = transition_booking(
        pool.as_ref(),
        path.into_inner(),
        TransitionActor::Admin,
        BookingStatus::Rejected,
    )
    .await?;
    Ok(HttpResponse::Ok().json(details))
}

#[post("/bookings/complete/{id}")]
async fn complete_booking(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    _guard: AdminGuard,
) -> Result<HttpResponse, ApiError> {
    let details = transition_booking(
        pool.as_ref(),
        path.into_inner(),
        TransitionActor::Admin,
        BookingStatus::Completed,
    )
    .await?;
    Ok(HttpResponse::Ok().json(details))
}
