//! Seed helpers shared by the repository integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use sgp_core::types::DbId;
use sgp_db::models::class::CreateClass;
use sgp_db::models::discipline::CreateDiscipline;
use sgp_db::models::group::Group;
use sgp_db::models::professor::{CreateProfessor, Professor};
use sgp_db::models::project::{CreateProject, Project};
use sgp_db::models::student::{CreateStudent, Student};
use sgp_db::models::task::CreateTask;
use sgp_db::repositories::{
    ClassRepo, DisciplineRepo, GroupRepo, ProfessorRepo, ProjectRepo, StudentRepo,
};
use sqlx::PgPool;

pub async fn professor(pool: &PgPool, email: &str) -> Professor {
    ProfessorRepo::create(
        pool,
        &CreateProfessor {
            name: "Professora Teste".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn student(pool: &PgPool, email: &str, registration_number: &str) -> Student {
    StudentRepo::create(
        pool,
        &CreateStudent {
            name: format!("Aluno {registration_number}"),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            registration_number: registration_number.to_string(),
        },
    )
    .await
    .unwrap()
}

/// A discipline owned by `professor_id`, plus one class under it.
pub async fn discipline_with_class(
    pool: &PgPool,
    professor_id: DbId,
    group_capacity: i32,
) -> (DbId, DbId) {
    let discipline = DisciplineRepo::create(
        pool,
        &CreateDiscipline {
            professor_id,
            name: "Engenharia de Software".to_string(),
            cutoff_score: 6.0,
            group_capacity,
        },
    )
    .await
    .unwrap();
    let class = ClassRepo::create(
        pool,
        &CreateClass {
            discipline_id: discipline.id,
            professor_id,
            name: "Turma A".to_string(),
            period: "2026.1".to_string(),
        },
    )
    .await
    .unwrap();
    (discipline.id, class.id)
}

/// An active group led by a freshly enrolled student.
pub async fn active_group(pool: &PgPool, class_id: DbId, discipline_id: DbId, n: u32) -> Group {
    let leader = student(pool, &format!("lider{n}@uni.br"), &format!("{n:012}")).await;
    ClassRepo::enroll(pool, class_id, &[leader.id]).await.unwrap();
    let group = GroupRepo::create(pool, discipline_id, leader.id).await.unwrap();
    GroupRepo::activate(pool, group.id).await.unwrap().unwrap()
}

pub async fn project(pool: &PgPool, professor_id: DbId, discipline_id: DbId) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            professor_id,
            discipline_id,
            name: "Sistema de Biblioteca".to_string(),
            description: "Controle de empréstimos".to_string(),
            kind: "extensao".to_string(),
            area: "computacao".to_string(),
            is_available: true,
        },
    )
    .await
    .unwrap()
}

pub fn new_task(project_id: DbId, name: &str) -> CreateTask {
    CreateTask {
        project_id,
        responsible_id: None,
        name: name.to_string(),
        description: "Entregar o diagrama de classes".to_string(),
        deadline: NaiveDate::from_ymd_opt(2026, 12, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap(),
    }
}

/// Link `group_id` to `project_id` directly, bypassing the selection rules.
pub async fn select(pool: &PgPool, project_id: DbId, group_id: DbId) {
    sqlx::query("INSERT INTO project_groups (project_id, group_id) VALUES ($1, $2)")
        .bind(project_id)
        .bind(group_id)
        .execute(pool)
        .await
        .unwrap();
}
