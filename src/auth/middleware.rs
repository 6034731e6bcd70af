use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use sqlx::SqlitePool;

use crate::configuration::Settings;
use crate::database::models::{
    Admin, Stylist, User, ROLE_ADMIN, ROLE_CLIENT, ROLE_STYLIST, ROLE_SUPERADMIN,
};
use crate::errors::ApiError;

use super::token::verify_access_token;

/// A live, re-resolved account behind a valid token.
#[derive(Debug, Clone)]
pub enum Principal {
    Admin(Admin),
    Stylist(Stylist),
    Client(User),
}

impl Principal {
    pub fn username(&self) -> &str {
        match self {
            Principal::Admin(admin) => &admin.username,
            Principal::Stylist(stylist) => &stylist.username,
            Principal::Client(user) => &user.username,
        }
    }

    pub fn role(&self) -> &str {
        match self {
            Principal::Admin(admin) => &admin.role,
            Principal::Stylist(stylist) => &stylist.role,
            Principal::Client(user) => &user.role,
        }
    }

    pub fn into_client(self) -> Option<User> {
        match self {
            Principal::Client(user) => Some(user),
            _ => None,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, ApiError> {
    let header = req.headers().get("Authorization").ok_or_else(|| {
        ApiError::AuthenticationError("You are not logged in, please provide a token".to_string())
    })?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::AuthenticationError("Invalid token format".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
        .ok_or_else(|| ApiError::AuthenticationError("Invalid token format".to_string()))
}

/// One keyed lookup, discriminated by the role claim. The token's role tells
/// us which table holds the account; a deleted or renamed account simply
/// fails to resolve.
async fn resolve_principal(
    pool: &SqlitePool,
    username: &str,
    role: &str,
) -> Result<Principal, ApiError> {
    let principal = match role {
        ROLE_ADMIN | ROLE_SUPERADMIN => {
            sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = ? AND role = ?")
                .bind(username)
                .bind(role)
                .fetch_optional(pool)
                .await?
                .map(Principal::Admin)
        }
        ROLE_STYLIST => {
            sqlx::query_as::<_, Stylist>("SELECT * FROM stylists WHERE username = ? AND role = ?")
                .bind(username)
                .bind(role)
                .fetch_optional(pool)
                .await?
                .map(Principal::Stylist)
        }
        ROLE_CLIENT => {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? AND role = ?")
                .bind(username)
                .bind(role)
                .fetch_optional(pool)
                .await?
                .map(Principal::Client)
        }
        _ => None,
    };

    principal.ok_or_else(|| {
        ApiError::AuthenticationError("could not validate credentials".to_string())
    })
}

fn request_context(
    req: &HttpRequest,
) -> Result<(web::Data<SqlitePool>, web::Data<Settings>), ApiError> {
    let pool = req
        .app_data::<web::Data<SqlitePool>>()
        .cloned()
        .ok_or(ApiError::InternalError)?;
    let settings = req
        .app_data::<web::Data<Settings>>()
        .cloned()
        .ok_or(ApiError::InternalError)?;
    Ok((pool, settings))
}

/// Any authenticated principal.
pub struct AuthGuard {
    pub principal: Principal,
}

impl FromRequest for AuthGuard {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let context = request_context(req);
        let token = bearer_token(req);

        async move {
            let (pool, settings) = context?;
            let claims = verify_access_token(&token?, &settings.auth.secret_key)?;
            let principal = resolve_principal(&pool, &claims.sub, &claims.role).await?;
            Ok(AuthGuard { principal })
        }
        .boxed_local()
    }
}

/// Must resolve in the admins table.
pub struct AdminGuard {
    pub admin: Admin,
}

impl FromRequest for AdminGuard {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let inner = AuthGuard::from_request(req, payload);

        async move {
            match inner.await?.principal {
                Principal::Admin(admin) => Ok(AdminGuard { admin }),
                _ => Err(ApiError::Forbidden(
                    "Access restricted: Admin privileges required".to_string(),
                )),
            }
        }
        .boxed_local()
    }
}

/// Must resolve in the stylists table.
pub struct StylistGuard {
    pub stylist: Stylist,
}

impl FromRequest for StylistGuard {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let inner = AuthGuard::from_request(req, payload);

        async move {
            match inner.await?.principal {
                Principal::Stylist(stylist) => Ok(StylistGuard { stylist }),
                _ => Err(ApiError::Forbidden(
                    "Access restricted: Only for stylists".to_string(),
                )),
            }
        }
        .boxed_local()
    }
}
