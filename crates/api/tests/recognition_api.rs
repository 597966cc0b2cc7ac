//! HTTP-level tests for camera capture recognition.

mod common;

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use catalist_db::models::cat::{Cat, CreateCat};
use catalist_db::repositories::CatRepo;
use common::{
    body_json, build_test_app, create_user, png_image, post_json, post_multipart, TestApp,
};
use serde_json::json;

const GINGER: ([u8; 3], [u8; 3]) = ([230, 130, 40], [250, 240, 220]);
const TUXEDO: ([u8; 3], [u8; 3]) = ([10, 10, 10], [245, 245, 245]);

async fn seed_cat(test: &TestApp, name: &str) -> Cat {
    CatRepo::create(
        &test.pool,
        &CreateCat {
            name: name.to_string(),
            gender: None,
            age: None,
            breed: None,
            color: None,
            location: None,
            description: None,
            health_status: None,
            image_url: None,
            status: None,
        },
    )
    .await
    .expect("cat creation should succeed")
}

/// Two cats, each with one reference photo.
async fn seed_references(test: &TestApp) -> (Cat, Cat) {
    let admin = create_user(&test.pool, "admin@cats.com", true).await;
    let token = test.token_for(&admin);
    let ginger = seed_cat(test, "Marmalade").await;
    let tuxedo = seed_cat(test, "Domino").await;

    for (cat, colours) in [(&ginger, GINGER), (&tuxedo, TUXEDO)] {
        let response = post_multipart(
            test.app(),
            &format!("/api/cats/{}/images", cat.id),
            &[("image", png_image(colours.0, colours.1))],
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    (ginger, tuxedo)
}

#[tokio::test]
async fn multipart_photo_matches_its_cat() {
    let test = build_test_app().await;
    let (ginger, tuxedo) = seed_references(&test).await;

    let response = post_multipart(
        test.app(),
        "/api/cats/recognize",
        &[("image", png_image(GINGER.0, GINGER.1))],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["reference_count"], 2);

    let matches = data["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["cat_id"], ginger.id);
    assert_eq!(matches[0]["cat_name"], "Marmalade");
    assert_eq!(matches[0]["matched"], true);
    assert_eq!(matches[0]["hamming_distance"], 0);
    assert!(matches[0]["similarity"].as_f64().unwrap() > 0.999);
    assert_eq!(matches[0]["cat"]["name"], "Marmalade");
    assert_eq!(matches[1]["cat_id"], tuxedo.id);
    assert!(
        matches[1]["similarity"].as_f64().unwrap() < matches[0]["similarity"].as_f64().unwrap()
    );

    assert_eq!(data["best_match"]["cat_id"], ginger.id);
}

#[tokio::test]
async fn json_data_url_is_accepted() {
    let test = build_test_app().await;
    let (_, tuxedo) = seed_references(&test).await;

    let encoded = STANDARD.encode(png_image(TUXEDO.0, TUXEDO.1));
    let response = post_json(
        test.app(),
        "/api/cats/recognize?limit=1",
        json!({ "image": format!("data:image/png;base64,{encoded}") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let matches = json["data"]["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["cat_id"], tuxedo.id);
}

#[tokio::test]
async fn no_references_means_no_matches() {
    let test = build_test_app().await;

    let encoded = STANDARD.encode(png_image(GINGER.0, GINGER.1));
    let response = post_json(test.app(), "/api/cats/recognize", json!({ "image": encoded })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["reference_count"], 0);
    assert!(json["data"]["matches"].as_array().unwrap().is_empty());
    assert!(json["data"]["best_match"].is_null());
}

#[tokio::test]
async fn bad_payloads_are_rejected() {
    let test = build_test_app().await;

    let response = post_json(test.app(), "/api/cats/recognize", json!({ "image": "%%%" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let not_an_image = STANDARD.encode(b"just some text");
    let response =
        post_json(test.app(), "/api/cats/recognize", json!({ "image": not_an_image })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_multipart(
        test.app(),
        "/api/cats/recognize",
        &[("photo", png_image(GINGER.0, GINGER.1))],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cat_signature_aggregates_references() {
    let test = build_test_app().await;
    let (ginger, _) = seed_references(&test).await;

    let response = common::get(test.app(), &format!("/api/cats/{}/signature", ginger.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["cat_id"], ginger.id);
    assert_eq!(data["reference_count"], 1);
    assert!(data["hash_bits"].as_u64().unwrap() > 0);
    assert!(!data["hash_hex"].as_str().unwrap().is_empty());

    let embedding: Vec<f64> = data["embedding"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    let norm = embedding.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert!((norm - 1.0).abs() < 1e-3);
}

#[tokio::test]
async fn cat_signature_without_references() {
    let test = build_test_app().await;
    let cat = seed_cat(&test, "Shy").await;

    let response = common::get(test.app(), &format!("/api/cats/{}/signature", cat.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["reference_count"], 0);
    assert!(data["hash_hex"].is_null());
    assert!(data["embedding"].is_null());

    let response = common::get(test.app(), "/api/cats/9999/signature").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn weak_top_match_is_not_a_best_match() {
    let test = common::build_test_app_with(|config| {
        config.recognition.similarity_threshold = 1.5;
    })
    .await;
    seed_references(&test).await;

    let encoded = STANDARD.encode(png_image(GINGER.0, GINGER.1));
    let response = post_json(test.app(), "/api/cats/recognize", json!({ "image": encoded })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    let matches = data["matches"].as_array().unwrap();
    assert!(!matches.is_empty());
    assert!(matches.iter().all(|m| m["matched"] == false));
    assert!(data["best_match"].is_null());
}

#[tokio::test]
async fn oversized_capture_is_rejected() {
    let test = common::build_test_app_with(|config| {
        config.max_upload_bytes = 1024;
    })
    .await;

    let encoded = STANDARD.encode(vec![7u8; 4096]);
    let response = post_json(test.app(), "/api/cats/recognize", json!({ "image": encoded })).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");

    let response = post_multipart(
        test.app(),
        "/api/cats/recognize",
        &[("image", vec![7u8; 4096])],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn malformed_limit_uses_error_envelope() {
    let test = build_test_app().await;

    let encoded = STANDARD.encode(png_image(GINGER.0, GINGER.1));
    let response = post_json(
        test.app(),
        "/api/cats/recognize?limit=lots",
        json!({ "image": encoded }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
