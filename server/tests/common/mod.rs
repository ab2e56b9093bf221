#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use larder_server::db::{self, DbPool};
use larder_server::media::MediaStore;
use larder_server::{app, AppState};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::OnceLock;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

/// Build a [`TestApp`]. Returns from the test only when database tests were
/// explicitly skipped with [`SKIP_DB_TESTS_ENV`].
#[macro_export]
macro_rules! test_app {
    () => {
        match common::TestApp::new() {
            Some(app) => app,
            None => {
                eprintln!("{} set, skipping", common::SKIP_DB_TESTS_ENV);
                return;
            }
        }
    };
}

pub const DATABASE_URL_ENV: &str = "TEST_DATABASE_URL";
pub const SKIP_DB_TESTS_ENV: &str = "LARDER_SKIP_DB_TESTS";

#[derive(Debug, PartialEq, Eq)]
pub enum TestDatabase {
    Url(String),
    Skipped,
}

/// A missing database URL is an error unless skipping was requested.
pub fn test_database(url: Option<String>, skip: Option<String>) -> Result<TestDatabase, String> {
    match (url.filter(|u| !u.trim().is_empty()), skip) {
        (Some(url), _) => Ok(TestDatabase::Url(url)),
        (None, Some(_)) => Ok(TestDatabase::Skipped),
        (None, None) => Err(format!(
            "{DATABASE_URL_ENV} is not set: point it at a PostgreSQL database, \
             or set {SKIP_DB_TESTS_ENV}=1 to skip database-backed tests"
        )),
    }
}

static POOL: OnceLock<Option<DbPool>> = OnceLock::new();

/// One migrated pool per test binary. Panics when no database is configured
/// and skipping was not requested.
pub fn pool() -> Option<DbPool> {
    POOL.get_or_init(|| {
        let setting = test_database(
            std::env::var(DATABASE_URL_ENV).ok(),
            std::env::var(SKIP_DB_TESTS_ENV).ok(),
        );
        match setting {
            Ok(TestDatabase::Url(url)) => {
                std::env::set_var("INSECURE_PASSWORD_HASHING", "1");
                Some(db::create_pool(&url).expect("failed to set up test database"))
            }
            Ok(TestDatabase::Skipped) => None,
            Err(message) => panic!("{}", message),
        }
    })
    .clone()
}

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub media: TempDir,
}

impl TestApp {
    pub fn new() -> Option<Self> {
        let pool = pool()?;
        let media = tempfile::tempdir().expect("tempdir");
        let router = app(AppState::new(
            pool.clone(),
            MediaStore::new(media.path(), "/media"),
        ));
        Some(TestApp {
            router,
            pool,
            media,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Multipart upload with a single file field.
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "larder-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Register a fresh user and return a bearer token for them.
    pub async fn signup(&self) -> String {
        let email = unique_email();
        let (status, _) = self
            .call(
                Method::POST,
                "/api/user/create",
                None,
                Some(json!({"email": email, "password": "testpass123", "name": "Test Cook"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .call(
                Method::POST,
                "/api/user/token",
                None,
                Some(json!({"email": email, "password": "testpass123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_tag(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post("/api/recipes/tags", token, json!({"name": name}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_ingredient(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post("/api/recipes/ingredients", token, json!({"name": name}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_recipe(&self, token: &str, payload: Value) -> Value {
        let (status, body) = self.post("/api/recipes/recipes", token, payload).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }
}

pub fn unique_email() -> String {
    format!("cook-{}@example.com", Uuid::new_v4())
}

pub fn sample_recipe(title: &str) -> Value {
    json!({"title": title, "time_minutes": 10, "price": "5.00"})
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(10, 10));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}
