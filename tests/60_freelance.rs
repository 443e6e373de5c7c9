mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use common::{body, TestDb};
use portal_suite::database::models::freelance::{
    BidStatus, FreelanceUser, NotificationKind, Project, ProjectStatus,
};
use portal_suite::services::freelance::FreelanceService;
use portal_suite::services::ServiceError;

async fn user(service: &FreelanceService, name: &str, role: &str) -> Result<FreelanceUser> {
    Ok(service
        .signup(body(json!({
            "name": name,
            "email": format!("{}@example.com", name),
            "password": "password1",
            "role": role,
        })))
        .await?)
}

async fn project(service: &FreelanceService, client: &FreelanceUser, title: &str) -> Result<Project> {
    Ok(service
        .create_project(
            client.id,
            body(json!({
                "title": title,
                "description": "Build a storefront",
                "category": "web",
                "budget": "500",
                "deadline": Utc::now() + Duration::days(30),
            })),
        )
        .await?)
}

#[tokio::test]
async fn accepting_a_bid_notifies_the_freelancer() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = FreelanceService::new(db.pool.clone());

    let client = user(&service, "carla", "client").await?;
    let fay = user(&service, "fay", "freelancer").await?;
    let project = project(&service, &client, "Shop").await?;
    assert_eq!(project.status, ProjectStatus::Open);

    let bid = service
        .place_bid(
            fay.id,
            body(json!({ "project_id": project.id, "proposal": "I can do it", "bid_amount": "450" })),
        )
        .await?;
    assert_eq!(bid.status, BidStatus::Pending);

    let client_inbox = service.notifications(client.id).await?;
    assert!(client_inbox.iter().any(|n| n.kind == NotificationKind::Bid));

    let countered = service.counter_bid(client.id, bid.id, Decimal::from(400)).await?;
    assert_eq!(countered.counter_offer, Some(Decimal::from(400)));

    let err = service.decide_bid(client.id, bid.id, BidStatus::Pending).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidField { .. }));

    let err = service.decide_bid(fay.id, bid.id, BidStatus::Accepted).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let accepted = service.decide_bid(client.id, bid.id, BidStatus::Accepted).await?;
    assert_eq!(accepted.status, BidStatus::Accepted);

    let inbox = service.notifications(fay.id).await?;
    assert!(inbox.iter().any(|n| n.content.contains("accepted")));

    db.cleanup().await
}

#[tokio::test]
async fn only_open_projects_take_bids() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = FreelanceService::new(db.pool.clone());

    let client = user(&service, "carla", "client").await?;
    let fay = user(&service, "fay", "freelancer").await?;
    let gus = user(&service, "gus", "freelancer").await?;
    let project = project(&service, &client, "Shop").await?;

    let err = service.assign_freelancer(client.id, project.id, client.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidField { .. }));

    let assigned = service.assign_freelancer(client.id, project.id, fay.id).await?;
    assert_eq!(assigned.status, ProjectStatus::InProgress);
    assert_eq!(assigned.freelancer_id, Some(fay.id));

    let err = service
        .place_bid(
            gus.id,
            body(json!({ "project_id": project.id, "proposal": "Me too", "bid_amount": "300" })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    db.cleanup().await
}

#[tokio::test]
async fn only_the_assigned_freelancer_logs_time_and_answers_reviews() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = FreelanceService::new(db.pool.clone());

    let client = user(&service, "carla", "client").await?;
    let fay = user(&service, "fay", "freelancer").await?;
    let gus = user(&service, "gus", "freelancer").await?;
    let project = project(&service, &client, "Shop").await?;

    let err = service
        .create_review(client.id, body(json!({ "project_id": project.id, "rating": 5 })))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    service.assign_freelancer(client.id, project.id, fay.id).await?;

    let entry = json!({ "date": Utc::now().date_naive(), "hours": "3.5" });
    let err = service.log_time(gus.id, project.id, body(entry.clone())).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    let logs = service.log_time(fay.id, project.id, body(entry)).await?;
    assert_eq!(logs.len(), 1);

    let review = service
        .create_review(
            client.id,
            body(json!({ "project_id": project.id, "rating": 4, "comment": "Solid work" })),
        )
        .await?;
    assert_eq!(review.freelancer_id, fay.id);

    let err = service
        .create_review(client.id, body(json!({ "project_id": project.id, "rating": 5 })))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let err = service
        .respond_to_review(gus.id, review.id, "Thanks".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    let answered = service.respond_to_review(fay.id, review.id, "Thanks".to_string()).await?;
    assert_eq!(answered.freelancer_response.as_deref(), Some("Thanks"));

    db.cleanup().await
}
