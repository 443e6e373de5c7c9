mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{error_code, send, token, TestServer};
use portal_suite::types::Portal;

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(
        server
            .post("/store/auth/login")
            .header("content-type", "application/json")
            .body("{not json"),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn unknown_enum_value_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.post("/freelance/auth/signup").json(&json!({
        "name": "Ayesha",
        "email": "ayesha@example.com",
        "password": "longenough",
        "role": "overlord",
    })))
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn signup_checks_fields_before_touching_storage() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.post("/store/auth/signup").json(&json!({
        "name": "Bilal",
        "email": "not-an-email",
        "password": "longenough",
    })))
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    Ok(())
}

#[tokio::test]
async fn admin_signup_is_forbidden() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.post("/tutoring/auth/signup").json(&json!({
        "username": "root",
        "email": "root@example.com",
        "password": "longenough",
        "role": "admin",
    })))
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    let (status, _) = send(server.post("/freelance/auth/signup").json(&json!({
        "name": "Root",
        "email": "root@example.com",
        "password": "longenough",
        "role": "admin",
    })))
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn invalid_path_id_is_a_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/store/products/id/not-a-uuid")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn invalid_sort_is_a_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/store/products?sort=sideways")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn out_of_range_page_is_a_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/store/products?page=9223372036854775807&limit=2")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
    assert!(body["field_errors"]["page"].is_string());
    Ok(())
}

#[tokio::test]
async fn non_positive_quantities_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let customer = token(Portal::Store, "customer")?;
    let (status, body) = send(
        server
            .post("/store/api/cart/add")
            .bearer_auth(&customer)
            .json(&json!({ "product_code": "P-100", "quantity": 0 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);

    let admin = token(Portal::Store, "admin")?;
    let product = uuid::Uuid::new_v4();
    let (status, body) = send(
        server
            .post(&format!("/store/api/admin/products/{}/restock", product))
            .bearer_auth(&admin)
            .json(&json!({ "quantity": -3 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["quantity"], "must be greater than 0");
    Ok(())
}
