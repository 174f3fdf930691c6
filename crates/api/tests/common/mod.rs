//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sgp_api::auth::jwt::{generate_access_token, JwtConfig};
use sgp_api::auth::password::hash_password;
use sgp_api::config::ServerConfig;
use sgp_api::router::build_app_router;
use sgp_api::state::AppState;
use sgp_core::roles::AccountKind;
use sgp_core::types::DbId;
use sgp_db::models::professor::{CreateProfessor, Professor};
use sgp_db::models::student::{CreateStudent, Student};
use sgp_db::repositories::{ProfessorRepo, StudentRepo};
use sgp_events::MailQueue;
use sqlx::PgPool;
use tower::ServiceExt;

/// Password of every account seeded by these helpers.
pub const PASSWORD: &str = "senha123";

/// Build a test `ServerConfig` with safe defaults and a page size of 2 so
/// pagination is easy to exercise.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        page_size: 2,
        password_min_length: 6,
        mail_queue_capacity: 16,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router, middleware included, on `pool`.
///
/// The mail worker runs without SMTP, so queued welcome emails are dropped.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let (mail, worker) = MailQueue::new(config.mail_queue_capacity);
    tokio::spawn(worker.run(None));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mail,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, None, Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body as JSON; an empty body becomes `Value::Null`.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse the `codigo` field of a JSON object.
pub fn id_of(json: &Value) -> DbId {
    json["codigo"].as_str().unwrap().parse().unwrap()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_professor(pool: &PgPool, email: &str) -> Professor {
    ProfessorRepo::create(
        pool,
        &CreateProfessor {
            name: format!("Prof {email}"),
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_student(pool: &PgPool, email: &str, registration_number: &str) -> Student {
    StudentRepo::create(
        pool,
        &CreateStudent {
            name: format!("Aluno {email}"),
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
            registration_number: registration_number.to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn token_for(id: DbId, kind: AccountKind) -> String {
    generate_access_token(id, kind.as_str(), &test_config().jwt).unwrap()
}

pub fn professor_token(professor: &Professor) -> String {
    token_for(professor.id, AccountKind::Professor)
}

pub fn student_token(student: &Student) -> String {
    token_for(student.id, AccountKind::Student)
}

// ---------------------------------------------------------------------------
// Fixtures built through the API
// ---------------------------------------------------------------------------

/// `POST /disciplinas/` with the given group capacity; returns its id.
pub async fn create_discipline(pool: &PgPool, token: &str, capacity: i32) -> DbId {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/disciplinas/",
        token,
        serde_json::json!({ "nome": "Engenharia de Software", "quantidade_grupos": capacity }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    id_of(&body_json(response).await)
}

/// `POST /turmas/` under `discipline_id`; returns the class id.
pub async fn create_class(pool: &PgPool, token: &str, discipline_id: DbId) -> DbId {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/turmas/",
        token,
        serde_json::json!({ "disciplina": discipline_id, "nome": "Turma A", "periodo": "2026.1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    id_of(&body_json(response).await)
}

/// The student enrolls themselves into `class_id`.
pub async fn enroll(pool: &PgPool, student: &Student, class_id: DbId) {
    let app = build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/turmas/{class_id}/participar/"),
        &student_token(student),
        serde_json::json!({ "alunos": [student.id] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Seed a student numbered `n` and enroll them into `class_id`.
pub async fn enrolled_student(pool: &PgPool, n: u32, class_id: DbId) -> Student {
    let student = seed_student(pool, &format!("aluno{n}@uni.br"), &format!("{n:012}")).await;
    enroll(pool, &student, class_id).await;
    student
}

/// `POST /grupos/` as `leader`, then activate it as the professor.
pub async fn active_group(
    pool: &PgPool,
    leader: &Student,
    professor_token: &str,
    discipline_id: DbId,
) -> DbId {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/grupos/",
        &student_token(leader),
        serde_json::json!({ "disciplina": discipline_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let group_id = id_of(&body_json(response).await);

    let app = build_test_app(pool.clone());
    let response = send(
        app,
        Method::PATCH,
        &format!("/grupos/{group_id}/ativar/"),
        Some(professor_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    group_id
}

/// `POST /projetos/` under `discipline_id`; returns the project id.
pub async fn create_project(pool: &PgPool, token: &str, discipline_id: DbId) -> DbId {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/projetos/",
        token,
        serde_json::json!({
            "disciplina": discipline_id,
            "nome": "Sistema de Biblioteca",
            "tipo": "Web",
            "area": "Educação",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    id_of(&body_json(response).await)
}

/// `PATCH /projetos/{id}/gerenciar-grupos/`.
pub async fn manage_groups(
    pool: &PgPool,
    token: &str,
    project_id: DbId,
    body: Value,
) -> Response<Body> {
    let app = build_test_app(pool.clone());
    patch_json_auth(
        app,
        &format!("/projetos/{project_id}/gerenciar-grupos/"),
        token,
        body,
    )
    .await
}
