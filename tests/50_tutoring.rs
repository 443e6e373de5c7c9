mod common;

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use common::{body, TestDb};
use portal_suite::database::models::tutoring::{
    SessionStatus, TutorSearch, TutoringUser, VerificationStatus,
};
use portal_suite::services::tutoring::TutoringService;
use portal_suite::services::ServiceError;

async fn tutor(service: &TutoringService, username: &str, location: &str) -> Result<TutoringUser> {
    Ok(service
        .signup(body(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password1",
            "role": "tutor",
            "location": location,
            "hourly_rate": "40",
            "subjects": "Math, Physics",
        })))
        .await?)
}

async fn student(service: &TutoringService, username: &str) -> Result<TutoringUser> {
    Ok(service
        .signup(body(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password1",
            "role": "student",
        })))
        .await?)
}

async fn approve(service: &TutoringService, tutor: &TutoringUser) -> Result<()> {
    service
        .verify_tutor(tutor.id, body(json!({ "status": "approved" })))
        .await?;
    Ok(())
}

#[tokio::test]
async fn tutors_start_pending_and_cannot_be_booked() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = TutoringService::new(db.pool.clone());

    let amna = tutor(&service, "amna", "Lahore").await?;
    assert_eq!(amna.verification_status, Some(VerificationStatus::Pending));
    let bilal = student(&service, "bilal").await?;

    let booking = json!({
        "tutor_id": amna.id,
        "subject": "Math",
        "date": Utc::now().date_naive(),
        "time": "16:00",
        "duration": "1.5",
        "session_type": "online",
    });
    let early = service.book_session(bilal.id, body(booking.clone())).await;
    assert!(matches!(early, Err(ServiceError::Validation(_))));

    approve(&service, &amna).await?;
    let session = service.book_session(bilal.id, body(booking)).await?;
    assert_eq!(session.status, SessionStatus::Pending);
    assert_eq!(session.earnings, Decimal::new(6000, 2));

    let duplicate = service.signup(body(json!({
        "username": "amna",
        "email": "other@example.com",
        "password": "password1",
        "role": "student",
    })))
    .await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    db.cleanup().await
}

#[tokio::test]
async fn only_the_sessions_tutor_moves_it_along() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = TutoringService::new(db.pool.clone());

    let amna = tutor(&service, "amna", "Lahore").await?;
    let other = tutor(&service, "omar", "Karachi").await?;
    approve(&service, &amna).await?;
    let bilal = student(&service, "bilal").await?;

    let session = service
        .book_session(
            bilal.id,
            body(json!({
                "tutor_id": amna.id,
                "subject": "Physics",
                "date": Utc::now().date_naive(),
                "time": "10:00",
                "duration": "2",
                "session_type": "in-person",
            })),
        )
        .await?;

    let stranger = service.set_session_status(other.id, session.id, SessionStatus::Accepted).await;
    assert!(matches!(stranger, Err(ServiceError::NotFound(_))));

    service.set_session_status(amna.id, session.id, SessionStatus::Accepted).await?;
    let done = service.set_session_status(amna.id, session.id, SessionStatus::Completed).await?;
    assert_eq!(done.status, SessionStatus::Completed);
    assert_eq!(done.payment_status.as_str(), "completed");

    let earnings = service.earnings(amna.id).await?;
    assert_eq!(earnings.total_earnings, Decimal::new(80, 0));
    assert_eq!(earnings.weekly_earnings, Decimal::new(80, 0));

    db.cleanup().await
}

#[tokio::test]
async fn reviews_need_a_completed_session_and_happen_once() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = TutoringService::new(db.pool.clone());

    let amna = tutor(&service, "amna", "Lahore").await?;
    approve(&service, &amna).await?;
    let bilal = student(&service, "bilal").await?;
    let session = service
        .book_session(
            bilal.id,
            body(json!({
                "tutor_id": amna.id,
                "subject": "Math",
                "date": Utc::now().date_naive(),
                "time": "12:00",
                "duration": "1",
                "session_type": "online",
            })),
        )
        .await?;

    let review = json!({ "session_id": session.id, "rating": 5, "review_text": "Clear and patient" });
    let early = service.create_review(bilal.id, body(review.clone())).await;
    assert!(matches!(early, Err(ServiceError::Validation(_))));

    service.set_session_status(amna.id, session.id, SessionStatus::Completed).await?;
    let other = student(&service, "sana").await?;
    let not_theirs = service.create_review(other.id, body(review.clone())).await;
    assert!(matches!(not_theirs, Err(ServiceError::NotFound(_))));

    service.create_review(bilal.id, body(review.clone())).await?;
    let again = service.create_review(bilal.id, body(review)).await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));

    let reviews = service.tutor_reviews(amna.id).await?;
    assert_eq!(reviews.len(), 1);

    db.cleanup().await
}

#[tokio::test]
async fn search_treats_wildcards_literally() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = TutoringService::new(db.pool.clone());

    let amna = tutor(&service, "amna", "Lahore").await?;
    approve(&service, &amna).await?;
    tutor(&service, "omar", "Lahore").await?;

    let found = service
        .search_tutors(TutorSearch {
            location: Some("ahor".into()),
            ..Default::default()
        })
        .await?;
    assert_eq!(found.len(), 1, "pending tutors stay hidden");
    assert_eq!(found[0].id, amna.id);

    let wildcard = service
        .search_tutors(TutorSearch {
            location: Some("%".into()),
            ..Default::default()
        })
        .await?;
    assert!(wildcard.is_empty());

    let by_subject = service
        .search_tutors(TutorSearch {
            subject: Some("phys".into()),
            max_rate: Some(Decimal::new(50, 0)),
            ..Default::default()
        })
        .await?;
    assert_eq!(by_subject.len(), 1);

    db.cleanup().await
}
