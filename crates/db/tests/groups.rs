//! Integration tests for group membership, enrollment and deactivation.

mod common;

use assert_matches::assert_matches;
use sgp_core::error::CoreError;
use sgp_core::group::check_deactivate;
use sgp_core::roles::Role;
use sgp_db::models::group::GroupFilter;
use sgp_db::repositories::{ClassRepo, GroupRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_participants_list_leader_first(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 1).await;
    let group = common::active_group(&pool, class_id, discipline_id, 1).await;

    for n in [7u32, 8] {
        let member = common::student(&pool, &format!("m{n}@uni.br"), &format!("{n:012}")).await;
        GroupRepo::add_member(&pool, group.id, member.id).await.unwrap();
    }

    let participants = GroupRepo::participants_of(&pool, &[group.id]).await.unwrap();
    assert_eq!(participants.len(), 3);
    assert!(participants[0].is_leader);
    assert_eq!(participants[0].student_id, group.leader_id);
    assert!(participants[1..].iter().all(|p| !p.is_leader));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_leader_is_unique_per_student(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 1).await;
    let group = common::active_group(&pool, class_id, discipline_id, 1).await;

    assert!(GroupRepo::leads_any(&pool, group.leader_id).await.unwrap());
    let err = GroupRepo::create(&pool, discipline_id, group.leader_id)
        .await
        .unwrap_err();
    let constraint = err
        .as_database_error()
        .and_then(|e| e.constraint())
        .map(str::to_string);
    assert_eq!(constraint.as_deref(), Some("uq_groups_leader"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_group_listing_is_scoped_by_role(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let other = common::professor(&pool, "outra@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 1).await;
    let mine = common::active_group(&pool, class_id, discipline_id, 1).await;
    common::active_group(&pool, class_id, discipline_id, 2).await;

    let filter = GroupFilter::default();
    assert_eq!(GroupRepo::count(&pool, Role::Professor(prof.id), &filter).await.unwrap(), 2);
    assert_eq!(GroupRepo::count(&pool, Role::Professor(other.id), &filter).await.unwrap(), 0);

    let listed = GroupRepo::list(&pool, Role::Student(mine.leader_id), &filter, 10, 0)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enroll_is_idempotent(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 1).await;
    let student = common::student(&pool, "a@uni.br", "202600000001").await;

    assert_eq!(ClassRepo::enroll(&pool, class_id, &[student.id]).await.unwrap(), 1);
    assert_eq!(ClassRepo::enroll(&pool, class_id, &[student.id]).await.unwrap(), 0);
    assert_eq!(ClassRepo::enrolled_students(&pool, class_id).await.unwrap().len(), 1);
    assert_eq!(
        ClassRepo::enrolled_discipline_ids(&pool, student.id).await.unwrap(),
        vec![discipline_id]
    );

    assert_eq!(ClassRepo::unenroll(&pool, class_id, &[student.id]).await.unwrap(), 1);
    assert!(ClassRepo::enrolled_students(&pool, class_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivate_group_drops_selections(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 1).await;
    let project = common::project(&pool, prof.id, discipline_id).await;
    let group = common::active_group(&pool, class_id, discipline_id, 1).await;

    sqlx::query("INSERT INTO project_groups (project_id, group_id) VALUES ($1, $2)")
        .bind(project.id)
        .bind(group.id)
        .execute(&pool)
        .await
        .unwrap();

    let deactivated = GroupRepo::deactivate(&pool, group.id, |consolidated| {
        assert!(!consolidated);
        Ok::<_, sqlx::Error>(())
    })
    .await
    .unwrap();
    assert!(deactivated);

    let stored = GroupRepo::find_by_id(&pool, group.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert!(!stored.is_available);
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project_groups WHERE group_id = $1")
        .bind(group.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

/// Error type for `deactivate` when the core rule is plugged in.
#[derive(Debug)]
enum Failure {
    Db(sqlx::Error),
    Rule(CoreError),
}

impl From<sqlx::Error> for Failure {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err)
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_group_in_consolidated_project_stays_active(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 1).await;
    let project = common::project(&pool, prof.id, discipline_id).await;
    let group = common::active_group(&pool, class_id, discipline_id, 1).await;
    common::select(&pool, project.id, group.id).await;
    sqlx::query("UPDATE projects SET is_consolidated = TRUE WHERE id = $1")
        .bind(project.id)
        .execute(&pool)
        .await
        .unwrap();

    let result = GroupRepo::deactivate(&pool, group.id, |consolidated| {
        check_deactivate(consolidated).map_err(Failure::Rule)
    })
    .await;
    assert_matches!(result, Err(Failure::Rule(CoreError::Validation(_))));

    let stored = GroupRepo::find_by_id(&pool, group.id).await.unwrap().unwrap();
    assert!(stored.is_active);
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project_groups WHERE group_id = $1")
        .bind(group.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}
