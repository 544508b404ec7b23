use convo_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::factory::assemble_state,
    infra::repositories::{
        sqlite_auth_repo::SqliteAuthRepo,
        sqlite_event_repo::SqliteEventRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    domain::ports::BlobStore,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

/// In-memory blob store that remembers what was written.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryBlobStore {
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, _content_type: &str, data: &[u8]) -> Result<(), AppError> {
        self.blobs.lock().unwrap().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, AppError> {
        Ok(format!("https://blobs.test/{}", key))
    }
}

/// Blob store whose uploads always fail.
#[allow(dead_code)]
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(&self, _key: &str, _content_type: &str, _data: &[u8]) -> Result<(), AppError> {
        Err(AppError::Storage("bucket unavailable".into()))
    }

    async fn public_url(&self, _key: &str) -> Result<String, AppError> {
        Err(AppError::Storage("bucket unavailable".into()))
    }
}

#[allow(dead_code)]
pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
    pub user_id: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
pub async fn test_pool() -> (Pool<Sqlite>, String) {
    let db_filename = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", db_filename);

    let connection_options = SqliteConnectOptions::from_str(&db_url)
        .unwrap()
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(10));

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(connection_options)
        .await
        .expect("Failed to connect to test db");

    sqlx::migrate!("./migrations/sqlite")
        .run(&pool)
        .await
        .expect("Failed to migrate test db");

    (pool, db_filename)
}

#[allow(dead_code)]
pub fn remove_db_files(db_filename: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", db_filename, suffix));
    }
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_blob_store(Arc::new(MemoryBlobStore::default())).await
    }

    pub async fn with_blob_store(blob_store: Arc<dyn BlobStore>) -> Self {
        let (pool, db_filename) = test_pool().await;

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: format!("sqlite://{}", db_filename),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            storage_dir: std::env::temp_dir().join("convo-test-files").to_string_lossy().into_owned(),
            public_base_url: "http://localhost".to_string(),
            blob_store_url: None,
            blob_store_token: None,
        };

        let state = assemble_state(
            config,
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteEventRepo::new(pool.clone())),
            Arc::new(SqliteAuthRepo::new(pool.clone())),
            blob_store,
        ).expect("Failed to assemble test state");
        let state = Arc::new(state);

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Sends a JSON request, optionally as a signed-in user, and returns the
    /// status with the parsed body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&AuthHeaders>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn signup(&self, email: &str, username: Option<&str>) -> AuthHeaders {
        let payload = json!({
            "email": email,
            "password": "secret123",
            "username": username,
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if response.status() != StatusCode::CREATED {
            panic!("Signup failed in test helper: status {}", response.status());
        }

        auth_from_response(response).await
    }

    /// Creates an event as `auth` and returns its id.
    pub async fn create_event(&self, auth: &AuthHeaders, title: &str, date: &str, capacity: i32) -> String {
        let (status, body) = self.send("POST", "/api/v1/events", Some(auth), Some(event_payload(title, date, capacity))).await;
        assert_eq!(status, StatusCode::CREATED, "create_event failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

#[allow(dead_code)]
pub fn event_payload(title: &str, date: &str, capacity: i32) -> Value {
    json!({
        "title": title,
        "date": date,
        "start_time": "18:00",
        "end_time": "21:00",
        "location": "Community Hall",
        "description": "Bring snacks",
        "capacity": capacity,
    })
}

#[allow(dead_code)]
pub fn member_ids(event: &Value, list: &str) -> Vec<String> {
    event[list]
        .as_array()
        .map(|items| items.iter().map(|i| i["user_id"].as_str().unwrap().to_string()).collect())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub async fn auth_from_response(response: axum::response::Response) -> AuthHeaders {
    let cookies: Vec<String> = response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();

    let access_token_cookie = cookies.iter()
        .find(|c| c.starts_with("access_token="))
        .expect("No access_token cookie returned");

    let start = "access_token=".len();
    let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
    let access_token = access_token_cookie[start..start + end].to_string();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
    let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();
    let user_id = body_json["user"]["id"].as_str().expect("No user id in body").to_string();

    AuthHeaders {
        access_token,
        csrf_token,
        user_id,
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        remove_db_files(&self.db_filename);
    }
}
