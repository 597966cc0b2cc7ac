#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use catalist_api::auth::jwt::{generate_access_token, JwtConfig};
use catalist_api::auth::password::hash_password;
use catalist_api::config::{RecognitionConfig, ServerConfig};
use catalist_api::router::build_app_router;
use catalist_api::state::AppState;
use catalist_core::recognition::CatRecognizer;
use catalist_db::models::user::{CreateUser, User};
use catalist_db::repositories::UserRepo;
use catalist_db::DbPool;
use catalist_events::EventBus;

/// Password given to every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "purr-purr-123";

/// A running test application plus handles on its internals.
pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub event_bus: Arc<EventBus>,
    pub config: ServerConfig,
    /// Keeps the static and upload directories alive for the test.
    pub dir: tempfile::TempDir,
}

impl TestApp {
    /// A fresh router sharing this app's state (routers are consumed by `oneshot`).
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn token_for(&self, user: &User) -> String {
        generate_access_token(user.id, user.role(), &self.config.jwt)
            .expect("token generation should succeed")
    }
}

/// Build a test `ServerConfig` rooted at `dir`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        static_dir: dir.join("public"),
        upload_dir: dir.join("uploads"),
        max_upload_bytes: 2 * 1024 * 1024,
        password_reset_expiry_mins: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
        recognition: RecognitionConfig::default(),
        admin_email: None,
        admin_password: None,
    }
}

/// Build the full application router over a fresh in-memory database.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(|_| {}).await
}

/// Like [`build_test_app`], with a chance to adjust the config first.
pub async fn build_test_app_with(configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("public")).expect("static dir");
    std::fs::create_dir_all(dir.path().join("uploads")).expect("upload dir");

    let mut config = test_config(dir.path());
    configure(&mut config);
    let pool = catalist_db::create_memory_pool()
        .await
        .expect("in-memory database");
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        recognizer: CatRecognizer::default(),
    };
    let router = build_app_router(state, &config);

    TestApp {
        router,
        pool,
        event_bus,
        config,
        dir,
    }
}

/// Insert a user directly; the password is [`TEST_PASSWORD`].
pub async fn create_user(pool: &DbPool, email: &str, is_admin: bool) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            phone: None,
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            is_admin,
        },
    )
    .await
    .expect("user creation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::delete(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

/// POST a multipart form where every part is a file.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    parts: &[(&str, Vec<u8>)],
    token: Option<&str>,
) -> Response<Body> {
    let boundary = "catalist-test-boundary";
    let mut body = Vec::new();
    for (name, bytes) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let mut builder = Request::post(uri).header(
        CONTENT_TYPE,
        format!("multipart/form-data; boundary={boundary}"),
    );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("body should be UTF-8")
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A PNG with a left/right colour split, distinct per `(left, right)` pair.
pub fn png_image(left: [u8; 3], right: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_fn(32, 32, |x, _| {
        if x < 16 {
            image::Rgb(left)
        } else {
            image::Rgb(right)
        }
    });
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("PNG encoding should succeed");
    bytes
}
