//! HTTP-level tests for task fan-out, visibility and list pagination.

mod common;

use axum::http::StatusCode;
use common::{
    active_group, body_json, create_class, create_discipline, create_project, delete_auth,
    enrolled_student, get_auth, id_of, manage_groups, post_json_auth, professor_token,
    seed_professor, student_token,
};
use serde_json::{json, Value};
use sgp_core::task::{MSG_INVALID_DATETIME, MSG_PROJECT_INVALID, MSG_PROJECT_NOT_OWNED};
use sgp_core::types::DbId;
use sgp_db::models::student::Student;
use sqlx::PgPool;

fn task_body(project_id: DbId, name: &str) -> Value {
    json!({
        "projeto": project_id,
        "nome": name,
        "descricao": "Diagrama de classes",
        "data": "01/12/2026",
        "hora": "18:00:00",
    })
}

async fn post_task(pool: &PgPool, token: &str, body: Value) -> (StatusCode, Value) {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/tarefas/", token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

/// A professor whose project, under a discipline of `capacity`, is selected
/// by `groups` groups. Returns the professor token, the project and the
/// leader of each group in selection order.
async fn project_with_groups(
    pool: &PgPool,
    capacity: i32,
    groups: u32,
) -> (String, DbId, Vec<Student>) {
    let professor = seed_professor(pool, "carlos@uni.br").await;
    let token = professor_token(&professor);
    let discipline_id = create_discipline(pool, &token, capacity).await;
    let class_id = create_class(pool, &token, discipline_id).await;
    let project = create_project(pool, &token, discipline_id).await;

    let mut leaders = Vec::new();
    for n in 1..=groups {
        let leader = enrolled_student(pool, n, class_id).await;
        let group_id = active_group(pool, &leader, &token, discipline_id).await;
        let response = manage_groups(pool, &token, project, json!({ "grupo": group_id })).await;
        assert_eq!(response.status(), StatusCode::OK);
        leaders.push(leader);
    }
    (token, project, leaders)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_is_copied_once_per_selecting_group(pool: PgPool) {
    let (token, project, _) = project_with_groups(&pool, 3, 3).await;

    let (status, json) = post_task(&pool, &token, task_body(project, "Entrega 1")).await;
    assert_eq!(status, StatusCode::CREATED);

    let copies = json.as_array().unwrap();
    assert_eq!(copies.len(), 3);
    let mut groups: Vec<&str> = copies.iter().map(|c| c["grupo"].as_str().unwrap()).collect();
    groups.sort_unstable();
    groups.dedup();
    assert_eq!(groups.len(), 3);

    for copy in copies {
        assert_eq!(copy["situacao"], "pendente");
        assert_eq!(copy["prazo"], "01/12/2026 18:00:00");
        assert_eq!(copy["ativo"], true);
        assert_eq!(copy["projeto"]["codigo"], project.to_string());
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_without_selections_is_a_single_unlinked_copy(pool: PgPool) {
    let (token, project, _) = project_with_groups(&pool, 1, 0).await;

    let (status, json) = post_task(&pool, &token, task_body(project, "Entrega 1")).await;
    assert_eq!(status, StatusCode::CREATED);
    let copies = json.as_array().unwrap();
    assert_eq!(copies.len(), 1);
    assert!(copies[0]["grupo"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_requires_an_active_owned_project(pool: PgPool) {
    let (token, project, _) = project_with_groups(&pool, 1, 0).await;

    let outsider = seed_professor(&pool, "outro@uni.br").await;
    let (status, json) = post_task(
        &pool,
        &professor_token(&outsider),
        task_body(project, "Entrega 1"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["campos"]["projeto"][0], MSG_PROJECT_NOT_OWNED);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/projetos/{project}/"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, json) = post_task(&pool, &token, task_body(project, "Entrega 1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["campos"]["projeto"][0], MSG_PROJECT_INVALID);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_deadline_is_rejected(pool: PgPool) {
    let (token, project, _) = project_with_groups(&pool, 1, 0).await;

    let mut body = task_body(project, "Entrega 1");
    body["data"] = json!("2026-12-01");
    let (status, json) = post_task(&pool, &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["campos"]["non_field_errors"][0], MSG_INVALID_DATETIME);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn students_cannot_post_tasks(pool: PgPool) {
    let (_, project, leaders) = project_with_groups(&pool, 1, 1).await;

    let (status, _) = post_task(
        &pool,
        &student_token(&leaders[0]),
        task_body(project, "Entrega 1"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_a_task_cancels_it(pool: PgPool) {
    let (token, project, _) = project_with_groups(&pool, 1, 0).await;
    let (_, json) = post_task(&pool, &token, task_body(project, "Entrega 1")).await;
    let task_id = id_of(&json[0]);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/tarefas/{task_id}/"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/tarefas/{task_id}/"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ativo"], false);
    assert_eq!(json["situacao"], "cancelada");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn students_only_reach_their_own_groups_copy(pool: PgPool) {
    let (token, project, leaders) = project_with_groups(&pool, 2, 2).await;
    let (_, json) = post_task(&pool, &token, task_body(project, "Entrega 1")).await;
    let ana = &leaders[0];

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/tarefas/", &student_token(ana)).await;
    let listing = body_json(response).await;
    assert_eq!(listing["quantidade"], 1);
    let own_copy = id_of(&listing["resultados"][0]);

    let other_copy = json
        .as_array()
        .unwrap()
        .iter()
        .map(id_of)
        .find(|id| *id != own_copy)
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/tarefas/{other_copy}/visualizar/"),
        &student_token(ana),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/tarefas/{own_copy}/visualizar/"),
        &student_token(ana),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(id_of(&body_json(response).await), own_copy);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_list_is_paginated(pool: PgPool) {
    let (token, project, _) = project_with_groups(&pool, 1, 0).await;
    for name in ["Entrega 1", "Entrega 2", "Entrega 3"] {
        let (status, _) = post_task(&pool, &token, task_body(project, name)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/tarefas/", &token).await).await;
    assert_eq!(json["quantidade"], 3);
    assert_eq!(json["pagina_atual"], 1);
    assert_eq!(json["resultados"].as_array().unwrap().len(), 2);
    assert_eq!(json["links"]["proximo"], "/tarefas/?pagina=2");
    assert!(json["links"]["anterior"].is_null());

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/tarefas/?pagina=2", &token).await).await;
    assert_eq!(json["resultados"].as_array().unwrap().len(), 1);
    assert_eq!(json["links"]["anterior"], "/tarefas/?pagina=1");
    assert!(json["links"]["proximo"].is_null());

    for page in ["3", "abc"] {
        let app = common::build_test_app(pool.clone());
        let response = get_auth(app, &format!("/tarefas/?pagina={page}"), &token).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "pagina={page}");
        assert_eq!(body_json(response).await["code"], "INVALID_PAGE");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_list_filters_by_name(pool: PgPool) {
    let (token, project, _) = project_with_groups(&pool, 1, 0).await;
    for name in ["Entrega parcial", "Relatório final"] {
        post_task(&pool, &token, task_body(project, name)).await;
    }

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/tarefas/?nome=entrega", &token).await).await;
    assert_eq!(json["quantidade"], 1);
    assert_eq!(json["resultados"][0]["nome"], "Entrega parcial");
}
