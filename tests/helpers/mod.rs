#![allow(dead_code)]

use std::net::TcpListener;

use chrono::{Duration, Utc};
use secrecy::Secret;
use sqlx::SqlitePool;

use gorgies::auth::utils::create_default_admin_if_not_exists;
use gorgies::configuration::{
    AdminSettings, ApplicationSettings, AuthSettings, DatabaseSettings, Settings,
};
use gorgies::{database, startup};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const STYLIST_PASSWORD: &str = "stylist-pass";
pub const CLIENT_PASSWORD: &str = "client-pass";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    let pool = database::get_connection_pool("sqlite::memory:", 1)
        .await
        .expect("failed to open the test database");
    database::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let settings = Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        auth: AuthSettings {
            secret_key: Secret::new("test-only-signing-secret".to_string()),
            token_expire_minutes: 30,
        },
        admin: AdminSettings {
            username: ADMIN_USERNAME.to_string(),
            email: "admin@example.com".to_string(),
            password: Secret::new(ADMIN_PASSWORD.to_string()),
        },
    };

    create_default_admin_if_not_exists(&pool, &settings.admin)
        .await
        .expect("failed to seed the admin account");

    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind an ephemeral port");
    let port = listener.local_addr().unwrap().port();

    let server = startup::run(listener, pool.clone(), settings).expect("failed to build the server");
    tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        pool,
        client: reqwest::Client::new(),
    }
}

pub fn future_time(hours: i64) -> String {
    (Utc::now() + Duration::hours(hours)).to_rfc3339()
}

pub fn past_time(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339()
}

impl TestApp {
    fn with_token(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let request = self.client.get(format!("{}{path}", self.address));
        self.with_token(request, token)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        let request = self.client.post(format!("{}{path}", self.address)).json(body);
        self.with_token(request, token)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        let request = self.client.put(format!("{}{path}", self.address)).json(body);
        self.with_token(request, token)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let request = self.client.delete(format!("{}{path}", self.address));
        self.with_token(request, token)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post(
                "/login",
                None,
                &serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(200, response.status().as_u16(), "login failed for {username}");

        let body: serde_json::Value = response.json().await.expect("login body was not json");
        body["access_token"]
            .as_str()
            .expect("login body had no access_token")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn signup_client(&self, username: &str) -> String {
        let response = self
            .post(
                "/users/signup",
                None,
                &serde_json::json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": CLIENT_PASSWORD,
                }),
            )
            .await;
        assert_eq!(201, response.status().as_u16(), "signup failed for {username}");

        self.login(username, CLIENT_PASSWORD).await
    }

    pub async fn create_service(&self, admin_token: &str, name: &str) -> i64 {
        let response = self
            .post(
                "/admins/create_service",
                Some(admin_token),
                &serde_json::json!({
                    "name": name,
                    "description": format!("{name} description"),
                    "duration": 30,
                    "price": 20.0,
                }),
            )
            .await;
        assert_eq!(201, response.status().as_u16(), "create_service failed");

        let body: serde_json::Value = response.json().await.unwrap();
        body["service_id"].as_i64().expect("service_id missing")
    }

    pub async fn create_stylist(
        &self,
        admin_token: &str,
        username: &str,
        service_ids: &[i64],
    ) -> i64 {
        let response = self
            .post(
                "/admins/create_stylist",
                Some(admin_token),
                &serde_json::json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": STYLIST_PASSWORD,
                    "specialization": "color",
                    "service_ids": service_ids,
                }),
            )
            .await;
        assert_eq!(201, response.status().as_u16(), "create_stylist failed");

        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().expect("stylist id missing")
    }

    pub async fn user_id(&self, username: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .expect("user not found")
    }

    pub async fn booking_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// A service, a stylist offering it, and logged-in stylist/client tokens —
/// the fixture most booking tests start from.
pub struct Salon {
    pub admin_token: String,
    pub service_id: i64,
    pub stylist_id: i64,
    pub stylist_token: String,
    pub client_token: String,
}

pub async fn seed_salon(app: &TestApp) -> Salon {
    let admin_token = app.admin_token().await;
    let service_id = app.create_service(&admin_token, "Haircut").await;
    let stylist_id = app
        .create_stylist(&admin_token, "selena", &[service_id])
        .await;
    let stylist_token = app.login("selena", STYLIST_PASSWORD).await;
    let client_token = app.signup_client("casey").await;

    Salon {
        admin_token,
        service_id,
        stylist_id,
        stylist_token,
        client_token,
    }
}
