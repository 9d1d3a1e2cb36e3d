#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use meeting_rooms::auth::jwt::{encode_token, AccessClaims};
use meeting_rooms::config::Config;
use meeting_rooms::state::{AppState, SharedState};

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";
pub const MAX_UPLOAD_SIZE: usize = 3 * 1024 * 1024;

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(&self, username: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/user/register",
            &json!({
                "username": username,
                "nickName": username,
                "password": password,
                "email": format!("{username}@test.com"),
            }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/user/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn admin_login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/user/admin/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Register a user and log in, returning the login body.
    pub async fn signed_in(&self, username: &str, password: &str) -> Value {
        let (body, status) = self.register(username, password).await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        let (body, status) = self.login(username, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body
    }

    /// Seed roles, permissions and the zhangsan/lisi accounts.
    pub async fn seed_users(&self) {
        let (body, status) = self.post("/user/initData", &json!({})).await;
        assert_eq!(status, StatusCode::OK, "user seed failed: {body}");
    }

    pub async fn create_room(&self, name: &str, capacity: i32, location: &str) -> (Value, StatusCode) {
        self.post(
            "/meeting-room/create",
            &json!({ "name": name, "capacity": capacity, "location": location }),
        )
        .await
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(database_url: String, upload_dir: PathBuf) -> Config {
    Config {
        database_url,
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        access_token_ttl: Duration::minutes(30),
        refresh_token_ttl: Duration::days(7),
        upload_dir,
        max_upload_size: MAX_UPLOAD_SIZE,
        log_level: "warn".to_string(),
    }
}

/// Mint an access token directly, bypassing login.
pub fn access_token(user_id: i64, permissions: &[&str]) -> String {
    let claims = AccessClaims::new(
        user_id,
        format!("user{user_id}"),
        vec![],
        permissions.iter().map(|p| p.to_string()).collect(),
        Duration::minutes(30),
    );
    encode_token(&claims, JWT_SECRET).unwrap()
}

/// Serve a router on a random local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}

/// State backed by a pool that never connects, for routes that fail before touching the database.
pub fn offline_state() -> SharedState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@127.0.0.1:1/unused")
        .expect("lazy pool");
    Arc::new(AppState {
        pool,
        config: test_config(String::new(), std::env::temp_dir().join("rooms_offline_uploads")),
    })
}

/// Spawn the full app against a pool that never connects.
pub async fn spawn_offline_app() -> (SocketAddr, Client) {
    let state = offline_state();
    let app = meeting_rooms::build_app(state.pool.clone(), state.config.clone());
    (serve(app).await, Client::new())
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let db_name = format!("rooms_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let upload_dir = std::env::temp_dir().join(&db_name);
    let config = test_config(test_url, upload_dir.clone());
    let app = meeting_rooms::build_app(pool.clone(), config);
    let addr = serve(app).await;

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
        upload_dir,
    }
}

/// Drop the test database and upload directory after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;
    let _ = tokio::fs::remove_dir_all(&app.upload_dir).await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
