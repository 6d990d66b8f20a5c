mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use collegia::config::cors::CorsConfig;
use collegia::config::jwt::JwtConfig;
use collegia::router::init_router;
use collegia::state::AppState;
use common::{
    create_test_admin, create_test_course, create_test_department, create_test_student,
    create_test_teacher, generate_unique_email,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool.clone(),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

async fn login(app: axum::Router, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, body)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_login(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_admin(&mut tx, &email, "testpass123").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, body) = login(app, &email, "testpass123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_type"], "admin");
    assert_eq!(body["user_role"], "admin");
    assert!(body["token"].as_str().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_login_carries_role(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let dept = create_test_department(&mut tx, "Computer Science").await;
    let email = generate_unique_email();
    create_test_teacher(&mut tx, &email, "testpass123", "hod", Some(dept.id), None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, body) = login(app, &email, "testpass123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_type"], "teacher");
    assert_eq!(body["user_role"], "hod");
    assert_eq!(body["user"]["department_id"], dept.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_test_admin(&mut tx, &email, "testpass123").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, _) = login(app, &email, "wrongpassword").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_email(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let (status, _) = login(app, &generate_unique_email(), "whatever123").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pending_student_cannot_login(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let dept = create_test_department(&mut tx, "Physics").await;
    let course = create_test_course(&mut tx, "BSc Physics", dept.id).await;
    let email = generate_unique_email();
    create_test_student(&mut tx, &email, "testpass123", dept.id, course.id, "pending").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, body) = login(app, &email, "testpass123").await;

    // The credentials were fine, the account just is not cleared yet.
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("approval"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rejected_student_login_names_rejection(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let dept = create_test_department(&mut tx, "Physics").await;
    let course = create_test_course(&mut tx, "BSc Physics", dept.id).await;
    let email = generate_unique_email();
    create_test_student(&mut tx, &email, "testpass123", dept.id, course.id, "rejected").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, body) = login(app, &email, "testpass123").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("rejected"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approved_student_login(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let dept = create_test_department(&mut tx, "Physics").await;
    let course = create_test_course(&mut tx, "BSc Physics", dept.id).await;
    let email = generate_unique_email();
    create_test_student(&mut tx, &email, "testpass123", dept.id, course.id, "approved").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, body) = login(app, &email, "testpass123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_type"], "student");
    assert_eq!(body["user"]["academic_year_active"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_login_blocked_after_academic_year(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let dept = create_test_department(&mut tx, "Physics").await;
    let course = create_test_course(&mut tx, "BSc Physics", dept.id).await;
    let email = generate_unique_email();
    let student =
        create_test_student(&mut tx, &email, "testpass123", dept.id, course.id, "approved").await;
    sqlx::query(
        "UPDATE students
         SET academic_year_start = '2024-08-01', academic_year_end = '2025-05-31'
         WHERE id = $1",
    )
    .bind(student.id)
    .execute(&mut *tx)
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, body) = login(app, &email, "testpass123").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("Academic year"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_login_within_academic_year(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let dept = create_test_department(&mut tx, "Physics").await;
    let course = create_test_course(&mut tx, "BSc Physics", dept.id).await;
    let email = generate_unique_email();
    let student =
        create_test_student(&mut tx, &email, "testpass123", dept.id, course.id, "approved").await;
    let today = chrono::Utc::now().date_naive();
    sqlx::query(
        "UPDATE students SET academic_year_start = $1, academic_year_end = $2 WHERE id = $3",
    )
    .bind(today - chrono::Days::new(30))
    .bind(today + chrono::Days::new(300))
    .bind(student.id)
    .execute(&mut *tx)
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let (status, body) = login(app, &email, "testpass123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["academic_year_active"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_first_admin_bootstrap_then_disabled(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let register = |email: String| {
        Request::builder()
            .method("POST")
            .uri("/api/admins/register")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&json!({
                    "name": "Bootstrap Admin",
                    "email": email,
                    "password": "testpass123"
                }))
                .unwrap(),
            ))
            .unwrap()
    };

    let response = app.oneshot(register(generate_unique_email())).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A second registration attempt must be rejected.
    let app = setup_test_app(pool).await;
    let response = app.oneshot(register(generate_unique_email())).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
