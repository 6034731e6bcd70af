use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::auth::middleware::{AuthGuard, Principal, StylistGuard};
use crate::database::models::{
    Booking, BookingCreate, BookingCreateForUser, BookingDetails, BookingList, BookingReschedule,
    BookingStatus,
};
use crate::errors::ApiError;

pub fn bookings_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .service(create_booking)
            .service(create_booking_for_user)
            .service(reschedule_booking)
            .service(accept_booking)
            .service(reject_booking)
            .service(complete_booking)
            .service(delete_booking)
            .service(list_bookings),
    );
}

const DETAILS_SELECT: &str = r#"SELECT b.id, b.user_id, b.stylist_id, b.service_id,
       b.appointment_time, b.status,
       st.username AS stylist_name, s.name AS service_name
  FROM bookings b
  JOIN stylists st ON st.id = b.stylist_id
  JOIN services s ON s.service_id = b.service_id"#;

pub(crate) async fn fetch_booking_details(
    pool: &SqlitePool,
    booking_id: i64,
) -> Result<BookingDetails, ApiError> {
    let query = format!("{DETAILS_SELECT} WHERE b.id = ?");
    sqlx::query_as::<_, BookingDetails>(&query)
        .bind(booking_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))
}

/// Runs the precondition chain and inserts a pending booking, all inside one
/// transaction so the slot pre-check and the insert cannot be split by a
/// concurrent writer.
async fn insert_booking(
    pool: &SqlitePool,
    user_id: i64,
    booking: BookingCreate,
) -> Result<i64, ApiError> {
    let mut tx = pool.begin().await?;

    let service = sqlx::query_as::<_, (i64,)>("SELECT service_id FROM services WHERE service_id = ?")
        .bind(booking.service_id)
        .fetch_optional(&mut tx)
        .await?;
    if service.is_none() {
        return Err(ApiError::NotFound("Service not found".to_string()));
    }

    let stylist = sqlx::query_as::<_, (i64,)>("SELECT id FROM stylists WHERE id = ?")
        .bind(booking.stylist_id)
        .fetch_optional(&mut tx)
        .await?;
    if stylist.is_none() {
        return Err(ApiError::NotFound("Stylist not found".to_string()));
    }

    let offered = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM stylist_services WHERE stylist_id = ? AND service_id = ?",
    )
    .bind(booking.stylist_id)
    .bind(booking.service_id)
    .fetch_one(&mut tx)
    .await?;
    if offered == 0 {
        return Err(ApiError::InvalidRequest(
            "stylist does not offer this service".to_string(),
        ));
    }

    if booking.appointment_time <= Utc::now() {
        return Err(ApiError::InvalidRequest(
            "appointment time must be in the future".to_string(),
        ));
    }

    ensure_slot_free(&mut tx, booking.stylist_id, booking.appointment_time, None).await?;

    let result = sqlx::query(
        r#"INSERT INTO bookings (user_id, stylist_id, service_id, appointment_time, status)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(user_id)
    .bind(booking.stylist_id)
    .bind(booking.service_id)
    .bind(booking.appointment_time)
    .bind(BookingStatus::Pending.as_str())
    .execute(&mut tx)
    .await?;

    tx.commit().await?;

    Ok(result.last_insert_rowid())
}

/// Only an exact-timestamp match against a confirmed booking counts as a
/// collision; pending bookings may stack on a slot.
async fn ensure_slot_free(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    stylist_id: i64,
    appointment_time: DateTime<Utc>,
    exclude_booking: Option<i64>,
) -> Result<(), ApiError> {
    let taken = match exclude_booking {
        Some(booking_id) => {
            sqlx::query_scalar::<_, i64>(
                r#"SELECT COUNT(*) FROM bookings
                   WHERE stylist_id = ? AND appointment_time = ? AND status = 'confirmed'
                     AND id != ?"#,
            )
            .bind(stylist_id)
            .bind(appointment_time)
            .bind(booking_id)
            .fetch_one(tx)
            .await?
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"SELECT COUNT(*) FROM bookings
                   WHERE stylist_id = ? AND appointment_time = ? AND status = 'confirmed'"#,
            )
            .bind(stylist_id)
            .bind(appointment_time)
            .fetch_one(tx)
            .await?
        }
    };

    if taken > 0 {
        return Err(ApiError::Conflict(
            "stylist already booked at this time".to_string(),
        ));
    }
    Ok(())
}

pub(crate) enum TransitionActor {
    /// Must be the stylist the booking is assigned to.
    Stylist(i64),
    Admin,
}

fn transition_rejection(current: BookingStatus, target: BookingStatus) -> ApiError {
    let message = match target {
        BookingStatus::Confirmed => "only pending bookings can be accepted".to_string(),
        BookingStatus::Rejected => "only pending bookings can be rejected".to_string(),
        BookingStatus::Completed => {
            if current == BookingStatus::Completed {
                "booking is already completed".to_string()
            } else {
                "booking must be confirmed before completion".to_string()
            }
        }
        BookingStatus::Pending => "bookings cannot return to pending".to_string(),
    };
    ApiError::InvalidRequest(message)
}

/// Single entry point for accept / reject / complete. The partial unique
/// index on confirmed slots turns a concurrent double-accept into a Conflict
/// instead of a corrupted calendar.
pub(crate) async fn transition_booking(
    pool: &SqlitePool,
    booking_id: i64,
    actor: TransitionActor,
    target: BookingStatus,
) -> Result<BookingDetails, ApiError> {
    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(booking_id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    if let TransitionActor::Stylist(stylist_id) = actor {
        if booking.stylist_id != stylist_id {
            return Err(ApiError::Forbidden(
                "You are not assigned to this booking".to_string(),
            ));
        }
    }

    let current = BookingStatus::parse(&booking.status).ok_or(ApiError::InternalError)?;
    if !current.can_transition_to(target) {
        return Err(transition_rejection(current, target));
    }

    let update = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(target.as_str())
        .bind(booking_id)
        .execute(&mut tx)
        .await;

    if let Err(err) = update {
        return Err(match err {
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                ApiError::Conflict("stylist already booked at this time".to_string())
            }
            other => other.into(),
        });
    }

    tx.commit().await?;

    fetch_booking_details(pool, booking_id).await
}

#[post("/create")]
async fn create_booking(
    body: web::Json<BookingCreate>,
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let user = auth
        .principal
        .into_client()
        .ok_or_else(|| ApiError::Forbidden("Please login as a client to book".to_string()))?;

    let booking_id = insert_booking(pool.as_ref(), user.id, body.into_inner()).await?;
    let details = fetch_booking_details(pool.as_ref(), booking_id).await?;

    Ok(HttpResponse::Created().json(details))
}

#[post("/create/for/targeted_user")]
async fn create_booking_for_user(
    body: web::Json<BookingCreateForUser>,
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    if matches!(auth.principal, Principal::Client(_)) {
        return Err(ApiError::Forbidden(
            "Only stylists and admins can book on behalf of a user".to_string(),
        ));
    }

    let body = body.into_inner();

    let target = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE id = ?")
        .bind(body.user_id)
        .fetch_optional(pool.as_ref())
        .await?;
    if target.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let booking = BookingCreate {
        stylist_id: body.stylist_id,
        service_id: body.service_id,
        appointment_time: body.appointment_time,
    };

    let booking_id = insert_booking(pool.as_ref(), body.user_id, booking).await?;
    let details = fetch_booking_details(pool.as_ref(), booking_id).await?;

    Ok(HttpResponse::Created().json(details))
}

#[put("/update")]
async fn reschedule_booking(
    body: web::Json<BookingReschedule>,
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let user = auth
        .principal
        .into_client()
        .ok_or_else(|| ApiError::Forbidden("Unauthorized access".to_string()))?;

    let reschedule = body.into_inner();

    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(reschedule.booking_id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    if booking.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You can only reschedule your own bookings".to_string(),
        ));
    }

    let status = BookingStatus::parse(&booking.status).ok_or(ApiError::InternalError)?;
    match status {
        BookingStatus::Pending => {}
        BookingStatus::Confirmed | BookingStatus::Completed => {
            return Err(ApiError::InvalidRequest(
                "booking already confirmed/completed, create a new booking instead".to_string(),
            ));
        }
        BookingStatus::Rejected => {
            return Err(ApiError::InvalidRequest(
                "only pending bookings can be rescheduled".to_string(),
            ));
        }
    }

    if reschedule.appointment_time <= Utc::now() {
        return Err(ApiError::InvalidRequest(
            "appointment time must be in the future".to_string(),
        ));
    }

    ensure_slot_free(
        &mut tx,
        booking.stylist_id,
        reschedule.appointment_time,
        Some(booking.id),
    )
    .await?;

    sqlx::query("UPDATE bookings SET appointment_time = ? WHERE id = ?")
        .bind(reschedule.appointment_time)
        .bind(booking.id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;

    let details = fetch_booking_details(pool.as_ref(), booking.id).await?;
    Ok(HttpResponse::Ok().json(details))
}

#[post("/accept/{id}")]
async fn accept_booking(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    guard: StylistGuard,
) -> Result<HttpResponse, ApiError> {
    let details = transition_booking(
        pool.as_ref(),
        path.into_inner(),
        TransitionActor::Stylist(guard.stylist.id),
        BookingStatus::Confirmed,
    )
    .await?;
    Ok(HttpResponse::Ok().json(details))
}

#[post("/reject/{id}")]
async fn reject_booking(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    guard: StylistGuard,
) -> Result<HttpResponse, ApiError> {
    let details = transition_booking(
        pool.as_ref(),
        path.into_inner(),
        TransitionActor::Stylist(guard.stylist.id),
        BookingStatus::Rejected,
    )
    .await?;
    Ok(HttpResponse::Ok().json(details))
}

#[post("/complete/{id}")]
async fn complete_booking(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    guard: StylistGuard,
) -> Result<HttpResponse, ApiError> {
    let details = transition_booking(
        pool.as_ref(),
        path.into_inner(),
        TransitionActor::Stylist(guard.stylist.id),
        BookingStatus::Completed,
    )
    .await?;
    Ok(HttpResponse::Ok().json(details))
}

#[delete("/delete/{id}")]
async fn delete_booking(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let user = auth
        .principal
        .into_client()
        .ok_or_else(|| ApiError::Forbidden("Unauthorized access".to_string()))?;

    let booking_id = path.into_inner();

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(booking_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    if booking.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You can only delete your own bookings".to_string(),
        ));
    }

    sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(booking_id)
        .execute(pool.as_ref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Past and upcoming bookings for the caller, partitioned on the current
/// instant. Clients see their own, stylists their assigned, admins all.
#[get("/")]
async fn list_bookings(
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let filter = match &auth.principal {
        Principal::Client(user) => Some(("b.user_id", user.id)),
        Principal::Stylist(stylist) => Some(("b.stylist_id", stylist.id)),
        Principal::Admin(_) => None,
    };

    let now = Utc::now();

    let (previous_bookings, upcoming_bookings) = match filter {
        Some((column, id)) => {
            let previous = sqlx::query_as::<_, BookingDetails>(&format!(
                "{DETAILS_SELECT} WHERE {column} = ? AND b.appointment_time <= ? \
                 ORDER BY b.appointment_time DESC"
            ))
            .bind(id)
            .bind(now)
            .fetch_all(pool.as_ref())
            .await?;

            let upcoming = sqlx::query_as::<_, BookingDetails>(&format!(
                "{DETAILS_SELECT} WHERE {column} = ? AND b.appointment_time > ? \
                 ORDER BY b.appointment_time ASC"
            ))
            .bind(id)
            .bind(now)
            .fetch_all(pool.as_ref())
            .await?;

            (previous, upcoming)
        }
        None => {
            let previous = sqlx::query_as::<_, BookingDetails>(&format!(
                "{DETAILS_SELECT} WHERE b.appointment_time <= ? \
                 ORDER BY b.appointment_time DESC"
            ))
            .bind(now)
            .fetch_all(pool.as_ref())
            .await?;

            let upcoming = sqlx::query_as::<_, BookingDetails>(&format!(
                "{DETAILS_SELECT} WHERE b.appointment_time > ? \
                 ORDER BY b.appointment_time ASC"
            ))
            .bind(now)
            .fetch_all(pool.as_ref())
            .await?;

            (previous, upcoming)
        }
    };

    Ok(HttpResponse::Ok().json(BookingList {
        previous_bookings,
        upcoming_bookings,
    }))
}
