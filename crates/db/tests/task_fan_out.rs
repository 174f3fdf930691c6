//! Integration tests for task fan-out, visibility and soft deletion.

mod common;

use std::collections::HashSet;

use sgp_core::roles::Role;
use sgp_core::task::{STATUS_CANCELLED, STATUS_DONE, STATUS_PENDING};
use sgp_core::types::DbId;
use sgp_db::models::task::{Task, TaskFilter, UpdateTask};
use sgp_db::repositories::{GroupRepo, TaskRepo};
use sqlx::PgPool;

fn tasks_of(copies: Vec<(Task, Option<DbId>)>) -> Vec<Task> {
    copies.into_iter().map(|(task, _)| task).collect()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_task_without_selection_creates_single_row(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, _) = common::discipline_with_class(&pool, prof.id, 3).await;
    let project = common::project(&pool, prof.id, discipline_id).await;

    let copies = TaskRepo::create_fan_out(&pool, &common::new_task(project.id, "Relatório"))
        .await
        .unwrap();

    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].1, None);
    let tasks = tasks_of(copies);
    assert_eq!(tasks[0].status, STATUS_PENDING);
    assert!(TaskRepo::linked_groups(&pool, tasks[0].id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_task_fans_out_to_each_selecting_group(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 3).await;
    let project = common::project(&pool, prof.id, discipline_id).await;

    let mut group_ids = Vec::new();
    for n in 1..=3 {
        let group = common::active_group(&pool, class_id, discipline_id, n).await;
        common::select(&pool, project.id, group.id).await;
        group_ids.push(group.id);
    }

    let copies = TaskRepo::create_fan_out(&pool, &common::new_task(project.id, "Diagrama"))
        .await
        .unwrap();

    assert_eq!(copies.len(), 3);
    assert!(copies
        .iter()
        .all(|(t, _)| t.name == "Diagrama" && t.status == STATUS_PENDING));

    let mut linked = HashSet::new();
    for (task, group_id) in &copies {
        let groups = TaskRepo::linked_groups(&pool, task.id).await.unwrap();
        assert_eq!(groups.len(), 1, "each copy links exactly one group");
        assert_eq!(Some(groups[0]), *group_id);
        linked.insert(groups[0]);
    }
    assert_eq!(linked, group_ids.into_iter().collect::<HashSet<_>>());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_sees_only_tasks_of_their_groups(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 2).await;
    let project = common::project(&pool, prof.id, discipline_id).await;
    let a = common::active_group(&pool, class_id, discipline_id, 1).await;
    let b = common::active_group(&pool, class_id, discipline_id, 2).await;

    let member = common::student(&pool, "membro@uni.br", "999999999999").await;
    GroupRepo::add_member(&pool, a.id, member.id).await.unwrap();

    common::select(&pool, project.id, a.id).await;
    common::select(&pool, project.id, b.id).await;

    let tasks = tasks_of(
        TaskRepo::create_fan_out(&pool, &common::new_task(project.id, "Protótipo"))
            .await
            .unwrap(),
    );
    let (task_a, task_b) = (&tasks[0], &tasks[1]);

    assert!(TaskRepo::visible_to_student(&pool, task_a.id, a.leader_id).await.unwrap());
    assert!(TaskRepo::visible_to_student(&pool, task_a.id, member.id).await.unwrap());
    assert!(!TaskRepo::visible_to_student(&pool, task_b.id, member.id).await.unwrap());

    let role = Role::Student(member.id);
    let filter = TaskFilter::default();
    assert_eq!(TaskRepo::count(&pool, role, &filter).await.unwrap(), 1);
    let listed = TaskRepo::list(&pool, role, &filter, 10, 0).await.unwrap();
    assert_eq!(listed[0].task.id, task_a.id);
    assert_eq!(listed[0].group_id, Some(a.id));
    assert_eq!(listed[0].professor_name, prof.name);

    assert!(TaskRepo::find_detail(&pool, role, task_b.id).await.unwrap().is_none());
    let owner_view = TaskRepo::find_detail(&pool, Role::Professor(prof.id), task_b.id)
        .await
        .unwrap();
    assert!(owner_view.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_move_carries_every_active_copy(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, class_id) = common::discipline_with_class(&pool, prof.id, 2).await;
    let source = common::project(&pool, prof.id, discipline_id).await;
    let target = common::project(&pool, prof.id, discipline_id).await;
    let a = common::active_group(&pool, class_id, discipline_id, 1).await;
    let b = common::active_group(&pool, class_id, discipline_id, 2).await;

    common::select(&pool, source.id, a.id).await;
    common::select(&pool, source.id, b.id).await;

    let tasks = tasks_of(
        TaskRepo::create_fan_out(&pool, &common::new_task(source.id, "Entrega 1"))
            .await
            .unwrap(),
    );

    let updated = TaskRepo::apply_update(
        &pool,
        tasks[0].id,
        Some(target.id),
        &UpdateTask {
            status: Some(STATUS_DONE.to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.project_id, target.id);
    assert_eq!(updated.status, STATUS_DONE);

    let sibling = TaskRepo::find_by_id(&pool, tasks[1].id).await.unwrap().unwrap();
    assert_eq!(sibling.project_id, target.id);
    assert_eq!(sibling.status, STATUS_PENDING, "field changes apply to one copy");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_task_keeps_row_as_cancelled(pool: PgPool) {
    let prof = common::professor(&pool, "prof@uni.br").await;
    let (discipline_id, _) = common::discipline_with_class(&pool, prof.id, 1).await;
    let project = common::project(&pool, prof.id, discipline_id).await;
    let tasks = tasks_of(
        TaskRepo::create_fan_out(&pool, &common::new_task(project.id, "Ata"))
            .await
            .unwrap(),
    );

    assert!(TaskRepo::deactivate(&pool, tasks[0].id).await.unwrap());

    let stored = TaskRepo::find_by_id(&pool, tasks[0].id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert_eq!(stored.status, STATUS_CANCELLED);
}
