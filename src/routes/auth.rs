use actix_web::{post, web, Either, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::password::verify_password;
use crate::auth::token::generate_access_token;
use crate::configuration::Settings;
use crate::database::models::LoginSchema;
use crate::errors::ApiError;

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(login);
}

/// Credentials are looked up in a fixed precedence order: admins, then
/// stylists, then clients. The first table with a matching username wins and
/// its stored role (which may be `superadmin`) goes into the token.
#[post("/login")]
async fn login(
    body: Either<web::Json<LoginSchema>, web::Form<LoginSchema>>,
    pool: web::Data<SqlitePool>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let LoginSchema { username, password } = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let mut credential: Option<(String, String)> = None;
    for table in ["admins", "stylists", "users"] {
        let query = format!("SELECT password_hash, role FROM {table} WHERE username = ?");
        credential = sqlx::query_as::<_, (String, String)>(&query)
            .bind(&username)
            .fetch_optional(pool.as_ref())
            .await?;
        if credential.is_some() {
            break;
        }
    }

    let (password_hash, role) = credential
        .ok_or_else(|| ApiError::AuthenticationError("Invalid credentials".to_string()))?;

    if !verify_password(&password, &password_hash) {
        return Err(ApiError::AuthenticationError(
            "Invalid credentials".to_string(),
        ));
    }

    let access_token = generate_access_token(
        &username,
        &role,
        &settings.auth.secret_key,
        settings.auth.token_expire_minutes,
    )
    .map_err(|_| ApiError::InternalError)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "token_type": "bearer"
    })))
}
