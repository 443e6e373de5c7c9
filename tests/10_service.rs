mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use reqwest::StatusCode;
use tower::ServiceExt;

use common::{error_code, send, TestServer};

#[tokio::test]
async fn root_describes_every_portal() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    for portal in ["registration", "tutoring", "freelance", "store"] {
        assert!(body["data"]["portals"][portal].is_string(), "missing {}", portal);
    }
    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/health")).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "SERVICE_UNAVAILABLE");
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/nowhere")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn database_outage_surfaces_as_503() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/store/products")).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn router_serves_without_a_listener() -> Result<()> {
    let app = common::router()?;

    let response = app
        .oneshot(Request::builder().uri("/store/api/wishlist").body(Body::empty())?)
        .await?;
    assert_eq!(response.status().as_u16(), 401);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(error_code(&body), "UNAUTHORIZED");
    Ok(())
}
