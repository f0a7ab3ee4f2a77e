#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use marquee_api::config::ServerConfig;
use marquee_api::router::build_app_router;
use marquee_api::state::AppState;

const BOUNDARY: &str = "marquee-test-boundary";

/// Build a test `ServerConfig` with safe defaults and uploads under `root`.
pub fn test_config(root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        upload_root: root,
        max_upload_bytes: 1024 * 1024,
    }
}

/// The application with its full middleware stack over `pool`.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub root: TempDir,
}

pub fn build_test_app(pool: SqlitePool) -> TestApp {
    let root = tempfile::tempdir().unwrap();
    let state = AppState::new(pool.clone(), test_config(root.path().to_path_buf()));
    TestApp {
        router: build_app_router(state),
        pool,
        root,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, form: Multipart) -> Response<Body> {
        self.send(form.into_request(Method::POST, uri)).await
    }

    pub async fn put_form(&self, uri: &str, form: Multipart) -> Response<Body> {
        self.send(form.into_request(Method::PUT, uri)).await
    }
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

/// A `multipart/form-data` body under construction.
#[derive(Default)]
pub struct Multipart {
    parts: Vec<Part>,
}

enum Part {
    Text { name: String, value: String },
    File { name: String, file_name: String, bytes: Vec<u8> },
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text part. Repeating a name sends the field several times.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(Part::Text {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Replace every text part called `name` with a single one.
    pub fn set(mut self, name: &str, value: &str) -> Self {
        self.parts
            .retain(|part| !matches!(part, Part::Text { name: n, .. } if n == name));
        self.text(name, value)
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.parts.push(Part::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        self
    }

    fn into_request(self, method: Method, uri: &str) -> Request<Body> {
        let mut body = Vec::new();
        for part in self.parts {
            match part {
                Part::Text { name, value } => body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .as_bytes(),
                ),
                Part::File {
                    name,
                    file_name,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                             filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }
}

pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// A valid movie form; callers append cast and files or `set` overrides.
pub fn movie_form(name: &str, category_id: i64, cinema_id: i64) -> Multipart {
    Multipart::new()
        .text("name", name)
        .text("description", "A lighthouse keeper waits for dawn.")
        .text("price", "75.00")
        .text("status", "NowShowing")
        .text("release_date_time", "2025-10-14T19:30")
        .text("duration_minutes", "118")
        .text("category_id", &category_id.to_string())
        .text("cinema_id", &cinema_id.to_string())
}

/// Categories 1..=3, cinema 1 and actors 1..=3.
pub async fn seed(pool: &SqlitePool) {
    for name in ["Action", "Comedy", "Drama"] {
        sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
    }
    sqlx::query("INSERT INTO cinemas (name, address) VALUES ('Roxy', '1 Main St')")
        .execute(pool)
        .await
        .unwrap();
    for name in ["Ada Lane", "Ben Park", "Cy Moss"] {
        sqlx::query("INSERT INTO actors (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
    }
}
