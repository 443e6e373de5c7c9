mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::{error_code, send, token, TestServer};
use portal_suite::types::Portal;

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in [
        "/registration/api/schedule",
        "/tutoring/api/sessions/student",
        "/freelance/api/me",
        "/store/api/cart",
    ] {
        let (status, body) = send(server.get(path)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", path);
        assert_eq!(error_code(&body), "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = send(server.get("/store/api/cart").bearer_auth("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn token_from_another_portal_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let tutoring = token(Portal::Tutoring, "student")?;

    let (status, body) = send(server.get("/store/api/cart").bearer_auth(&tutoring)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
    assert_eq!(body["message"], "Token was not issued for this portal");
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_other_roles() -> Result<()> {
    let server = TestServer::spawn().await?;
    let cases = [
        (Portal::Registration, "student", "/registration/api/admin/courses"),
        (Portal::Tutoring, "tutor", "/tutoring/api/admin/tutors"),
        (Portal::Freelance, "client", "/freelance/api/admin/dashboard"),
        (Portal::Store, "customer", "/store/api/admin/dashboard"),
        (Portal::Store, "salesman", "/store/api/admin/users"),
    ];

    for (portal, role, path) in cases {
        let bearer = token(portal, role)?;
        let (status, body) = send(server.get(path).bearer_auth(&bearer)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} as {}", path, role);
        assert_eq!(error_code(&body), "FORBIDDEN");
    }
    Ok(())
}

#[tokio::test]
async fn member_routes_are_split_by_role() -> Result<()> {
    let server = TestServer::spawn().await?;

    let tutor = token(Portal::Tutoring, "tutor")?;
    let (status, _) = send(server.get("/tutoring/api/wishlist").bearer_auth(&tutor)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = token(Portal::Registration, "admin")?;
    let (status, _) = send(server.get("/registration/api/schedule").bearer_auth(&admin)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let customer = token(Portal::Store, "customer")?;
    let (status, _) = send(server.get("/store/api/salesman/orders").bearer_auth(&customer)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let salesman = token(Portal::Store, "salesman")?;
    let order = uuid::Uuid::new_v4();
    let (status, _) = send(
        server
            .put(&format!("/store/api/orders/cancel/{}", order))
            .bearer_auth(&salesman),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let freelancer = token(Portal::Freelance, "freelancer")?;
    let (status, _) = send(
        server
            .post("/freelance/api/projects")
            .bearer_auth(&freelancer)
            .json(&serde_json::json!({})),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn permitted_role_passes_the_gate() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = token(Portal::Store, "admin")?;

    // Past both guards the handler hits the unreachable database.
    let (status, body) = send(server.get("/store/api/admin/dashboard").bearer_auth(&admin)).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&body), "SERVICE_UNAVAILABLE");
    Ok(())
}
