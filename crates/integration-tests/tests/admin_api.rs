//! Integration tests for the admin API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`teslix migrate`)
//! - The admin server running (cargo run -p teslix-admin)
//! - `ADMIN_SECRET` set to the key the server was started with

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use teslix_integration_tests::{ADMIN_KEY_HEADER, admin_base_url, admin_secret};

fn key() -> String {
    admin_secret().expect("ADMIN_SECRET must be set")
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_login() {
    let client = Client::new();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/admin/login"))
        .header(ADMIN_KEY_HEADER, key())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/api/admin/login"))
        .header(ADMIN_KEY_HEADER, "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_product_lifecycle() {
    let client = Client::new();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/admin/products"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({
            "title": "Зеркало левое Model Y",
            "description": "Integration test listing",
            "price": "3200",
            "images": ["/uploads/test.jpg"],
            "tags": ["Model Y", "Кузов"],
            "availability": "in_stock"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = resp.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let updated: Value = client
        .patch(format!("{base_url}/api/admin/products/{id}"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({ "price": 2900, "availability": "reserved" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["price"], 2900);
    assert_eq!(updated["availability"], "reserved");

    let edited: Value = client
        .post(format!("{base_url}/api/admin/products/{id}/images"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({ "op": "append", "urls": ["/uploads/test-2.jpg"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        edited["images"],
        json!(["/uploads/test.jpg", "/uploads/test-2.jpg"])
    );

    let edited: Value = client
        .post(format!("{base_url}/api/admin/products/{id}/images"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({ "op": "move", "from": 1, "to": 0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(edited["images"][0], "/uploads/test-2.jpg");

    let resp = client
        .post(format!("{base_url}/api/admin/products/{id}/images"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({ "op": "remove_at", "index": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = client
        .post(format!("{base_url}/api/admin/products/{id}/images"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({ "op": "remove", "url": "/uploads/test.jpg" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .delete(format!("{base_url}/api/admin/products?id={id}"))
        .header(ADMIN_KEY_HEADER, key())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .patch(format!("{base_url}/api/admin/products/{id}"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({ "price": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_vehicle_create_and_delete() {
    let client = Client::new();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/admin/cars"))
        .header(ADMIN_KEY_HEADER, key())
        .json(&json!({
            "make": "Tesla",
            "model": "Model 3",
            "year": "2019",
            "vin": "5YJ3E1EA7KF000000",
            "mileage": 81000,
            "images": ["/uploads/car.jpg"],
            "status": "in_stock"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = resp.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = client
        .delete(format!("{base_url}/api/admin/cars?id={id}"))
        .header(ADMIN_KEY_HEADER, key())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_single_upload() {
    let part = reqwest::multipart::Part::bytes(b"not really a jpeg".to_vec())
        .file_name("probe.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = Client::new()
        .post(format!("{}/api/admin/upload", admin_base_url()))
        .header(ADMIN_KEY_HEADER, key())
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert!(body["url"].as_str().unwrap().ends_with("-probe.txt"));
}
