use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::auth::middleware::AuthGuard;
use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{
    PasswordChange, SignupSchema, User, UserProfileUpdate, UserResponse, ROLE_CLIENT,
};
use crate::errors::ApiError;

pub fn users_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(signup)
            .service(get_profile)
            .service(update_profile)
            .service(delete_profile)
            .service(change_password),
    );
}

/// Shared with the admin-facing create_user endpoint.
pub(crate) async fn create_client(
    pool: &SqlitePool,
    schema: SignupSchema,
) -> Result<User, ApiError> {
    let existing =
        sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE username = ? OR email = ?")
            .bind(&schema.username)
            .bind(&schema.email)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Err(ApiError::Conflict(
            "User with this username or email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&schema.password).map_err(|_| ApiError::InternalError)?;

    let result = sqlx::query(
        r#"INSERT INTO users (username, email, password_hash, role, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(&schema.username)
    .bind(&schema.email)
    .bind(password_hash)
    .bind(ROLE_CLIENT)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    Ok(user)
}

#[post("/signup")]
async fn signup(
    body: web::Json<SignupSchema>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let user = create_client(pool.as_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

#[get("/profile")]
async fn get_profile(auth: AuthGuard) -> Result<HttpResponse, ApiError> {
    let user = auth
        .principal
        .into_client()
        .ok_or_else(|| ApiError::Forbidden("Unauthorized access".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

#[put("/profile")]
async fn update_profile(
    body: web::Json<UserProfileUpdate>,
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let user = auth
        .principal
        .into_client()
        .ok_or_else(|| ApiError::Forbidden("Unauthorized access".to_string()))?;

    let patch = body.into_inner();

    sqlx::query(
        r#"UPDATE users
           SET username = COALESCE(?, username),
               email = COALESCE(?, email)
           WHERE id = ?"#,
    )
    .bind(patch.username)
    .bind(patch.email)
    .bind(user.id)
    .execute(pool.as_ref())
    .await?;

    let updated = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(pool.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}

#[delete("/profile")]
async fn delete_profile(
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let user = auth
        .principal
        .into_client()
        .ok_or_else(|| ApiError::Forbidden("Unauthorized access".to_string()))?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user.id)
        .execute(pool.as_ref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[put("/profile/change_password")]
async fn change_password(
    body: web::Json<PasswordChange>,
    pool: web::Data<SqlitePool>,
    auth: AuthGuard,
) -> Result<HttpResponse, ApiError> {
    let user = auth
        .principal
        .into_client()
        .ok_or_else(|| ApiError::Forbidden("Unauthorized access".to_string()))?;

    let change = body.into_inner();

    if !verify_password(&change.old_password, &user.password_hash) {
        return Err(ApiError::Forbidden("Old password is incorrect".to_string()));
    }

    let password_hash =
        hash_password(&change.new_password).map_err(|_| ApiError::InternalError)?;

    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(user.id)
        .execute(pool.as_ref())
        .await?;

    let updated = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(pool.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}
