//! Service flows persisted through the `PostgreSQL` store.

use super::helpers::{register, setup, unique_name};
use canopy::todo::{
    domain::{CredentialHash, EmailAddress, User, Username},
    ports::{TodoStore, TodoStoreError},
    services::{CreateListRequest, CreateTaskRequest, ErrorKind, UpdateTaskRequest},
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;

#[rstest]
fn nested_tasks_round_trip(shared_test_cluster: &'static TestCluster) -> eyre::Result<()> {
    let pg = setup(shared_test_cluster, "nested_tasks_round_trip")?;
    pg.runtime.block_on(async {
        let list = pg
            .service
            .create_list(&pg.caller, CreateListRequest::new("Errands").with_description("Saturday"))
            .await?;
        let parent = pg
            .service
            .create_task(
                &pg.caller,
                CreateTaskRequest::new(list.id, "Shop").with_urgency("high"),
            )
            .await?;
        let child = pg
            .service
            .create_task(&pg.caller, CreateTaskRequest::subtask_of(parent.id, "Bread"))
            .await?;

        let tree = pg.service.task_tree(&pg.caller, parent.id).await?;

        eyre::ensure!(tree.total_descendants == 1, "expected one descendant");
        let children = tree.tree.children.unwrap_or_default();
        let stored_child = children
            .first()
            .ok_or_else(|| eyre::eyre!("child missing from tree"))?;
        eyre::ensure!(stored_child.id == child.id, "wrong child loaded");
        eyre::ensure!(stored_child.depth == 1, "child depth {}", stored_child.depth);
        eyre::ensure!(
            tree.tree.urgency.as_str() == "high",
            "urgency not persisted"
        );
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn cascaded_completion_is_persisted(shared_test_cluster: &'static TestCluster) -> eyre::Result<()> {
    let pg = setup(shared_test_cluster, "cascaded_completion_is_persisted")?;
    pg.runtime.block_on(async {
        let list = pg
            .service
            .create_list(&pg.caller, CreateListRequest::new("Garden"))
            .await?;
        let root = pg
            .service
            .create_task(&pg.caller, CreateTaskRequest::new(list.id, "Weed"))
            .await?;
        pg.service
            .create_task(&pg.caller, CreateTaskRequest::subtask_of(root.id, "Beds"))
            .await?;

        pg.service
            .update_task(&pg.caller, root.id, UpdateTaskRequest::new().with_completed(true))
            .await?;

        let stored = pg
            .store
            .tasks_in_list(pg.caller.user_id(), list.id)
            .await?;
        eyre::ensure!(stored.len() == 2, "expected two stored tasks");
        eyre::ensure!(
            stored
                .iter()
                .all(|task| task.is_completed() && task.completed_at().is_some()),
            "completion was not persisted for every task"
        );
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn cycle_is_rejected_without_changes(shared_test_cluster: &'static TestCluster) -> eyre::Result<()> {
    let pg = setup(shared_test_cluster, "cycle_is_rejected_without_changes")?;
    pg.runtime.block_on(async {
        let list = pg
            .service
            .create_list(&pg.caller, CreateListRequest::new("Work"))
            .await?;
        let root = pg
            .service
            .create_task(&pg.caller, CreateTaskRequest::new(list.id, "Release"))
            .await?;
        let child = pg
            .service
            .create_task(&pg.caller, CreateTaskRequest::subtask_of(root.id, "Tag"))
            .await?;

        let result = pg
            .service
            .move_task(&pg.caller, root.id, Some(child.id))
            .await;

        eyre::ensure!(
            result.is_err_and(|err| err.kind() == ErrorKind::Conflict),
            "cycle was accepted"
        );
        let reloaded = pg
            .store
            .find_task(pg.caller.user_id(), root.id)
            .await?
            .ok_or_else(|| eyre::eyre!("root task vanished"))?;
        eyre::ensure!(reloaded.parent_id().is_none(), "root was re-parented");
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn deleting_a_list_cascades_to_tasks(shared_test_cluster: &'static TestCluster) -> eyre::Result<()> {
    let pg = setup(shared_test_cluster, "deleting_a_list_cascades_to_tasks")?;
    pg.runtime.block_on(async {
        let list = pg
            .service
            .create_list(&pg.caller, CreateListRequest::new("Temporary"))
            .await?;
        let root = pg
            .service
            .create_task(&pg.caller, CreateTaskRequest::new(list.id, "Root"))
            .await?;
        pg.service
            .create_task(&pg.caller, CreateTaskRequest::subtask_of(root.id, "Leaf"))
            .await?;

        pg.service.delete_list(&pg.caller, list.id).await?;

        let remaining = pg
            .store
            .tasks_in_list(pg.caller.user_id(), list.id)
            .await?;
        eyre::ensure!(remaining.is_empty(), "tasks outlived their list");
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn duplicate_usernames_are_reported(shared_test_cluster: &'static TestCluster) -> eyre::Result<()> {
    let pg = setup(shared_test_cluster, "duplicate_usernames_are_reported")?;
    pg.runtime.block_on(async {
        let username = unique_name("dup");
        register(&pg.store, &username).await?;
        let clash = User::new(
            Username::new(username.as_str())?,
            EmailAddress::new(format!("other-{username}@example.com"))?,
            CredentialHash::new("$argon2id$placeholder"),
            &DefaultClock,
        );

        let result = pg.store.store_user(&clash).await;

        eyre::ensure!(
            matches!(result, Err(TodoStoreError::DuplicateUsername(ref name)) if *name == username),
            "unexpected result {result:?}"
        );
        Ok::<_, eyre::Report>(())
    })
}

#[rstest]
fn crossed_moves_leave_an_acyclic_tree(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let pg = setup(shared_test_cluster, "crossed_moves_leave_an_acyclic_tree")?;
    pg.runtime.block_on(async {
        let list = pg
            .service
            .create_list(&pg.caller, CreateListRequest::new("Chores"))
            .await?;
        let first = pg
            .service
            .create_task(&pg.caller, CreateTaskRequest::new(list.id, "Sweep"))
            .await?;
        let second = pg
            .service
            .create_task(&pg.caller, CreateTaskRequest::new(list.id, "Mop"))
            .await?;

        let (under_second, under_first) = tokio::join!(
            pg.service.move_task(&pg.caller, first.id, Some(second.id)),
            pg.service.move_task(&pg.caller, second.id, Some(first.id)),
        );

        let outcomes = [under_second, under_first];
        let accepted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        eyre::ensure!(accepted == 1, "{accepted} crossed moves were accepted");
        let rejected = outcomes
            .into_iter()
            .find_map(Result::err)
            .ok_or_else(|| eyre::eyre!("no move was rejected"))?;
        eyre::ensure!(
            rejected.kind() == ErrorKind::Conflict,
            "unexpected rejection {rejected:?}"
        );
        let roots = pg.service.list_tasks(&pg.caller, list.id).await?;
        eyre::ensure!(roots.len() == 1, "expected one root, found {}", roots.len());
        Ok::<_, eyre::Report>(())
    })
}
