mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use collegia::config::cors::CorsConfig;
use collegia::config::jwt::JwtConfig;
use collegia::router::init_router;
use collegia::state::AppState;
use common::{
    TestAccount, create_test_course, create_test_department, create_test_form,
    create_test_student, create_test_teacher, generate_unique_email,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool.clone(),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
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
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn submit_form(
    app: axum::Router,
    token: &str,
    form_id: Uuid,
    data: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/forms/{}/submit", form_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({ "data": data })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, body)
}

async fn review_submission(
    app: axum::Router,
    token: &str,
    submission_id: &str,
    action: &str,
    comments: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut payload = json!({ "action": action });
    if let Some(comments) = comments {
        payload["comments"] = json!(comments);
    }

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/submissions/{}/review", submission_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&payload).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, body)
}

struct WorkflowFixture {
    form_id: Uuid,
    student: TestAccount,
    tutor: TestAccount,
    hod: TestAccount,
    principal: TestAccount,
}

/// One department with one course, a full reviewer chain, and an
/// approved student enrolled in the course.
async fn setup_workflow(pool: &PgPool) -> WorkflowFixture {
    let mut tx = pool.begin().await.unwrap();

    let dept = create_test_department(&mut tx, "Computer Science").await;
    let course = create_test_course(&mut tx, "BSc CS", dept.id).await;
    let form_id = create_test_form(&mut tx, "Leave Application", Some(dept.id)).await;

    let student = create_test_student(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        dept.id,
        course.id,
        "approved",
    )
    .await;
    let tutor = create_test_teacher(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        "tutor",
        Some(dept.id),
        Some(course.id),
    )
    .await;
    let hod = create_test_teacher(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        "hod",
        Some(dept.id),
        None,
    )
    .await;
    let principal = create_test_teacher(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        "principal",
        None,
        None,
    )
    .await;

    tx.commit().await.unwrap();

    WorkflowFixture {
        form_id,
        student,
        tutor,
        hod,
        principal,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_submission_starts_at_tutor_stage(pool: PgPool) {
    let fx = setup_workflow(&pool).await;
    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &fx.student.email, &fx.student.password).await;

    let app = setup_test_app(pool).await;
    let (status, body) = submit_form(app, &token, fx.form_id, json!({"Reason": "leave"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending_tutor");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_required_field_rejected(pool: PgPool) {
    let fx = setup_workflow(&pool).await;
    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &fx.student.email, &fx.student.password).await;

    let app = setup_test_app(pool.clone()).await;
    let (status, body) = submit_form(app, &token, fx.form_id, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Reason"));

    // Nothing was persisted.
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM form_submissions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_full_approval_chain(pool: PgPool) {
    let fx = setup_workflow(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &fx.student.email, &fx.student.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (_, body) = submit_form(
        app,
        &student_token,
        fx.form_id,
        json!({"Reason": "conference"}),
    )
    .await;
    let submission_id = body["submission_id"].as_str().unwrap().to_string();

    for (reviewer, expected) in [
        (&fx.tutor, "pending_hod"),
        (&fx.hod, "pending_principal"),
        (&fx.principal, "approved"),
    ] {
        let app = setup_test_app(pool.clone()).await;
        let token = get_auth_token(app, &reviewer.email, &reviewer.password).await;
        let app = setup_test_app(pool.clone()).await;
        let (status, body) =
            review_submission(app, &token, &submission_id, "approve", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], expected);
    }

    // Every audit slot is populated after full traversal.
    let (tutor_by, hod_by, principal_by) = sqlx::query_as::<_, (Option<Uuid>, Option<Uuid>, Option<Uuid>)>(
        "SELECT tutor_reviewed_by, hod_reviewed_by, principal_reviewed_by
         FROM form_submissions WHERE id = $1",
    )
    .bind(Uuid::parse_str(&submission_id).unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(tutor_by, Some(fx.tutor.id));
    assert_eq!(hod_by, Some(fx.hod.id));
    assert_eq!(principal_by, Some(fx.principal.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_hod_rejection_is_terminal(pool: PgPool) {
    let fx = setup_workflow(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &fx.student.email, &fx.student.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (_, body) = submit_form(app, &student_token, fx.form_id, json!({"Reason": "leave"})).await;
    let submission_id = body["submission_id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let tutor_token = get_auth_token(app, &fx.tutor.email, &fx.tutor.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (status, _) = review_submission(app, &tutor_token, &submission_id, "approve", None).await;
    assert_eq!(status, StatusCode::OK);

    let app = setup_test_app(pool.clone()).await;
    let hod_token = get_auth_token(app, &fx.hod.email, &fx.hod.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (status, body) = review_submission(
        app,
        &hod_token,
        &submission_id,
        "reject",
        Some("insufficient"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let comments = sqlx::query_scalar::<_, String>(
        "SELECT hod_comments FROM form_submissions WHERE id = $1",
    )
    .bind(Uuid::parse_str(&submission_id).unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(comments, "insufficient");

    // Any further review fails with a conflict, for any actor.
    for reviewer in [&fx.tutor, &fx.hod, &fx.principal] {
        let app = setup_test_app(pool.clone()).await;
        let token = get_auth_token(app, &reviewer.email, &reviewer.password).await;
        let app = setup_test_app(pool.clone()).await;
        let (status, _) = review_submission(app, &token, &submission_id, "approve", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_wrong_course_tutor_denied(pool: PgPool) {
    let fx = setup_workflow(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let other_dept = create_test_department(&mut tx, "Mathematics").await;
    let other_course = create_test_course(&mut tx, "BSc Maths", other_dept.id).await;
    let other_tutor = create_test_teacher(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        "tutor",
        Some(other_dept.id),
        Some(other_course.id),
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &fx.student.email, &fx.student.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (_, body) = submit_form(app, &student_token, fx.form_id, json!({"Reason": "leave"})).await;
    let submission_id = body["submission_id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &other_tutor.email, &other_tutor.password).await;
    let app = setup_test_app(pool).await;
    let (status, _) = review_submission(app, &token, &submission_id, "approve", None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_action_rejected(pool: PgPool) {
    let fx = setup_workflow(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &fx.student.email, &fx.student.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (_, body) = submit_form(app, &student_token, fx.form_id, json!({"Reason": "leave"})).await;
    let submission_id = body["submission_id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &fx.tutor.email, &fx.tutor.password).await;
    let app = setup_test_app(pool).await;
    let (status, _) = review_submission(app, &token, &submission_id, "escalate", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_of_missing_submission_is_not_found(pool: PgPool) {
    let fx = setup_workflow(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &fx.tutor.email, &fx.tutor.password).await;

    // The submission lookup comes first, so an unknown id reports 404
    // even when the action would not parse either.
    let missing_id = Uuid::new_v4().to_string();
    let app = setup_test_app(pool.clone()).await;
    let (status, _) = review_submission(app, &token, &missing_id, "escalate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let app = setup_test_app(pool).await;
    let (status, _) = review_submission(app, &token, &missing_id, "approve", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_resubmission_creates_independent_attempts(pool: PgPool) {
    let fx = setup_workflow(&pool).await;

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &fx.student.email, &fx.student.password).await;

    for _ in 0..2 {
        let app = setup_test_app(pool.clone()).await;
        let (status, _) = submit_form(app, &token, fx.form_id, json!({"Reason": "leave"})).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM form_submissions WHERE student_id = $1",
    )
    .bind(fx.student.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_submission_data_round_trip(pool: PgPool) {
    let fx = setup_workflow(&pool).await;

    let data = json!({"Reason": "medical leave", "Extra": 42});

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &fx.student.email, &fx.student.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (status, _) = submit_form(app, &token, fx.form_id, data.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let app = setup_test_app(pool).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/submissions/my")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["submissions"][0]["data"], data);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_without_assigned_tutor_fails(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let dept = create_test_department(&mut tx, "History").await;
    let course = create_test_course(&mut tx, "BA History", dept.id).await;
    let form_id = create_test_form(&mut tx, "Transcript Request", None).await;
    let student = create_test_student(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        dept.id,
        course.id,
        "approved",
    )
    .await;
    // HOD exists but no tutor is assigned to the course.
    let hod = create_test_teacher(
        &mut tx,
        &generate_unique_email(),
        "testpass123",
        "hod",
        Some(dept.id),
        None,
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student.email, &student.password).await;
    let app = setup_test_app(pool.clone()).await;
    let (status, body) = submit_form(app, &student_token, form_id, json!({"Reason": "copy"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let submission_id = body["submission_id"].as_str().unwrap().to_string();

    // Stuck at the tutor stage: even the HOD cannot skip ahead.
    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &hod.email, &hod.password).await;
    let app = setup_test_app(pool).await;
    let (status, body) = review_submission(app, &token, &submission_id, "approve", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("tutor"));
}
