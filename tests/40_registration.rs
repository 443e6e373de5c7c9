mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{body, send, TestDb, TestServer};
use portal_suite::database::models::registration::{Course, CreateCourse, Student, UpdateCourse};
use portal_suite::services::registration::RegistrationService;
use portal_suite::services::ServiceError;

async fn course(service: &RegistrationService, code: &str, seats: i32, days: &[&str], hours: (&str, &str)) -> Result<Course> {
    Ok(service
        .create_course(body::<CreateCourse>(json!({
            "course_code": code,
            "title": format!("{} lecture", code),
            "department": "CS",
            "seats_available": seats,
            "days": days,
            "start_time": hours.0,
            "end_time": hours.1,
        })))
        .await?)
}

async fn student(service: &RegistrationService, roll_number: &str) -> Result<Student> {
    Ok(service
        .create_student(body(json!({
            "roll_number": roll_number,
            "name": format!("Student {}", roll_number),
            "password": "password1",
        })))
        .await?)
}

#[tokio::test]
async fn last_seat_goes_once() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = RegistrationService::new(db.pool.clone());

    let cs101 = course(&service, "CS101", 1, &["Monday"], ("09:00", "10:00")).await?;
    let first = student(&service, "22F-0001").await?;
    let second = student(&service, "22F-0002").await?;

    let taken = service.register(first.id, cs101.id).await?;
    assert_eq!(taken.seats_available, 0);

    let full = service.register(second.id, cs101.id).await;
    assert!(matches!(full, Err(ServiceError::Validation(ref m)) if m == "No seats available"));
    assert_eq!(service.get_course(cs101.id).await?.seats_available, 0);

    db.cleanup().await
}

#[tokio::test]
async fn double_registration_is_rejected() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = RegistrationService::new(db.pool.clone());

    let cs201 = course(&service, "CS201", 5, &["Tuesday"], ("11:00", "12:30")).await?;
    let ali = student(&service, "22F-0003").await?;

    service.register(ali.id, cs201.id).await?;
    let again = service.register(ali.id, cs201.id).await;
    assert!(matches!(again, Err(ServiceError::Validation(ref m)) if m == "Already registered for this course"));
    assert_eq!(service.get_course(cs201.id).await?.seats_available, 4);

    db.cleanup().await
}

#[tokio::test]
async fn dropping_returns_the_seat() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = RegistrationService::new(db.pool.clone());

    let cs301 = course(&service, "CS301", 2, &["Wednesday"], ("14:00", "15:00")).await?;
    let sara = student(&service, "22F-0004").await?;

    service.register(sara.id, cs301.id).await?;
    let dropped = service.drop_course(sara.id, cs301.id).await?;
    assert_eq!(dropped.seats_available, 2);
    assert!(service.registered_courses(sara.id).await?.is_empty());

    let twice = service.drop_course(sara.id, cs301.id).await;
    assert!(matches!(twice, Err(ServiceError::Validation(_))));
    assert_eq!(service.get_course(cs301.id).await?.seats_available, 2);

    db.cleanup().await
}

#[tokio::test]
async fn overlapping_schedule_is_refused() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = RegistrationService::new(db.pool.clone());

    course(&service, "MA101", 30, &["Monday", "Wednesday"], ("10:00", "11:30")).await?;

    let clash = course(&service, "PH101", 30, &["Wednesday"], ("11:00", "12:00")).await;
    let err = clash.expect_err("overlap on Wednesday must be refused");
    match err.downcast_ref::<ServiceError>() {
        Some(ServiceError::Validation(message)) => assert!(message.starts_with("Time conflict"), "{}", message),
        other => panic!("expected a time conflict, got {:?}", other),
    }

    // Back to back on the same day is fine.
    let after = course(&service, "PH102", 30, &["Wednesday"], ("11:30", "12:30")).await?;

    // Moving it onto the first course's hours is refused as well.
    let moved = service
        .update_course(
            after.id,
            UpdateCourse {
                start_time: Some("10:30".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(moved, Err(ServiceError::Validation(_))));

    db.cleanup().await
}

#[tokio::test]
async fn deleting_a_course_unlinks_it_everywhere() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = RegistrationService::new(db.pool.clone());

    let basics = course(&service, "CS100", 10, &["Thursday"], ("08:00", "09:00")).await?;
    let advanced = service
        .create_course(body(json!({
            "course_code": "CS200",
            "title": "Data Structures",
            "department": "CS",
            "seats_available": 10,
            "prerequisites": ["CS100", "NOPE999"],
        })))
        .await?;
    assert_eq!(advanced.prerequisites, vec![basics.id]);

    let hina = student(&service, "22F-0005").await?;
    service.register(hina.id, basics.id).await?;

    service.delete_course(basics.id).await?;

    assert!(service.registered_courses(hina.id).await?.is_empty());
    assert!(service.get_course(advanced.id).await?.prerequisites.is_empty());
    assert!(matches!(service.get_course(basics.id).await, Err(ServiceError::NotFound(_))));

    db.cleanup().await
}

#[tokio::test]
async fn student_flow_over_http() -> Result<()> {
    let Some(db) = TestDb::create().await? else { return Ok(()) };
    let service = RegistrationService::new(db.pool.clone());

    let cs101 = course(&service, "CS101", 1, &["Friday"], ("09:00", "10:30")).await?;
    student(&service, "22F-0006").await?;
    let server = TestServer::with_pool(db.pool.clone()).await?;

    let (status, login) = send(server.post("/registration/auth/login").json(&json!({
        "username": "22F-0006",
        "password": "password1",
    })))
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["data"]["role"], "student");
    assert_eq!(login["data"]["user"]["roll_number"], "22F-0006");
    let token = login["data"]["token"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(
        server
            .post("/registration/api/enrollments")
            .bearer_auth(&token)
            .json(&json!({ "course_id": cs101.id })),
    )
    .await?;
    assert!(status.is_success(), "register: {}", status);

    let (status, schedule) = send(server.get("/registration/api/schedule").bearer_auth(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule["data"][0]["day"], "Friday");
    assert_eq!(schedule["data"][0]["course_title"], "CS101 lecture");

    let (status, wrong) = send(server.post("/registration/auth/login").json(&json!({
        "username": "22F-0006",
        "password": "not-the-password",
    })))
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["code"], "UNAUTHORIZED");

    db.cleanup().await
}
