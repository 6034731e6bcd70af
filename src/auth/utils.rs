use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;

use crate::configuration::AdminSettings;
use crate::database::models::ROLE_ADMIN;

use super::password::hash_password;

/// Idempotent bootstrap: inserts the configured admin account on first start
/// and is a no-op afterwards.
pub async fn create_default_admin_if_not_exists(
    pool: &SqlitePool,
    settings: &AdminSettings,
) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, (i64,)>("SELECT id FROM admins WHERE username = ? LIMIT 1")
        .bind(&settings.username)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    if settings.password.expose_secret() == "change-me" {
        log::warn!(
            "admin.password is still the packaged default. Set APP_ADMIN__PASSWORD in production."
        );
    }

    let password_hash = hash_password(settings.password.expose_secret())
        .map_err(|_| sqlx::Error::Protocol("password hash failed".into()))?;

    sqlx::query(
        r#"INSERT INTO admins (username, email, password_hash, role, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(&settings.username)
    .bind(&settings.email)
    .bind(password_hash)
    .bind(ROLE_ADMIN)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    log::info!("seeded default admin account '{}'", settings.username);

    Ok(())
}
