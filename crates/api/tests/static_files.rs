//! Static website serving and the 404 fallback.

mod common;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use catalist_api::static_files::FALLBACK_NOT_FOUND_BODY;
use common::{body_json, body_text, build_test_app, get, post_json, TestApp};

fn write_site_file(test: &TestApp, path: &str, contents: &str) {
    let full = test.config.static_dir.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, contents).unwrap();
}

fn content_type(response: &axum::http::Response<axum::body::Body>) -> String {
    response.headers()[CONTENT_TYPE].to_str().unwrap().to_string()
}

#[tokio::test]
async fn root_serves_index() {
    let test = build_test_app().await;
    write_site_file(&test, "index.html", "<h1>CATalist</h1>");

    let response = get(test.app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/html"));
    assert_eq!(body_text(response).await, "<h1>CATalist</h1>");

    let response = get(test.app(), "/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn assets_get_mime_types() {
    let test = build_test_app().await;
    write_site_file(&test, "js/app.js", "console.log('meow');");
    write_site_file(&test, "css/site.css", "body {}");
    write_site_file(&test, "data/blob.unknownext", "???");

    let response = get(test.app(), "/js/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).contains("javascript"));

    let response = get(test.app(), "/css/site.css").await;
    assert!(content_type(&response).starts_with("text/css"));

    let response = get(test.app(), "/data/blob.unknownext").await;
    assert_eq!(content_type(&response), "application/octet-stream");
}

#[tokio::test]
async fn directories_serve_their_index() {
    let test = build_test_app().await;
    write_site_file(&test, "adopt/index.html", "adopt page");

    let response = get(test.app(), "/adopt/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "adopt page");
}

#[tokio::test]
async fn missing_file_uses_custom_404_page() {
    let test = build_test_app().await;
    write_site_file(&test, "404.html", "<p>This cat wandered off</p>");

    let response = get(test.app(), "/no/such/page.html").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "<p>This cat wandered off</p>");
}

#[tokio::test]
async fn missing_file_without_custom_page() {
    let test = build_test_app().await;

    let response = get(test.app(), "/missing.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&response).starts_with("text/html"));
    assert_eq!(body_text(response).await, FALLBACK_NOT_FOUND_BODY);
}

#[tokio::test]
async fn unknown_api_paths_fall_through_to_404() {
    let test = build_test_app().await;

    let response = get(test.app(), "/api/not-a-route").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, FALLBACK_NOT_FOUND_BODY);

    let response = post_json(test.app(), "/api/not-a-route", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_routes_take_precedence() {
    let test = build_test_app().await;
    write_site_file(&test, "api/cats", "shadowed");

    let response = get(test.app(), "/api/cats").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_array());
}

#[tokio::test]
async fn missing_upload_uses_the_site_404_page() {
    let test = build_test_app().await;
    write_site_file(&test, "404.html", "<p>lost</p>");

    let response = get(test.app(), "/uploads/cats/1/nope.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "<p>lost</p>");
}

#[tokio::test]
async fn missing_upload_without_custom_page() {
    let test = build_test_app().await;

    let response = get(test.app(), "/uploads/nothing-here.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, FALLBACK_NOT_FOUND_BODY);
}
