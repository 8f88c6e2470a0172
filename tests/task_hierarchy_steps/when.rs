//! When steps for task hierarchy BDD scenarios.

use super::world::{HierarchyWorld, run_async};
use canopy::todo::services::{CreateTaskRequest, UpdateTaskRequest};
use rstest_bdd_macros::when;

#[when("a subtask is added under the deepest task")]
fn add_below_deepest(world: &mut HierarchyWorld) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let deepest = world
        .deepest
        .ok_or_else(|| eyre::eyre!("missing nested chain in scenario world"))?;
    let request = CreateTaskRequest::subtask_of(deepest, "Too deep");
    world.last_error = run_async(world.service.create_task(&caller, request)).err();
    Ok(())
}

#[when(r#""{title}" is moved under "{parent}""#)]
fn move_under(world: &mut HierarchyWorld, title: String, parent: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let task_id = world.task(&title)?;
    let parent_id = world.task(&parent)?;
    world.last_error = run_async(world.service.move_task(&caller, task_id, Some(parent_id))).err();
    Ok(())
}

#[when(r#""{title}" is marked complete"#)]
fn mark_complete(world: &mut HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let request = UpdateTaskRequest::new().with_completed(true);
    run_async(world.service.update_task(&caller, world.task(&title)?, request))?;
    Ok(())
}

#[when(r#""{title}" is re-opened"#)]
fn reopen(world: &mut HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let request = UpdateTaskRequest::new().with_completed(false);
    run_async(world.service.update_task(&caller, world.task(&title)?, request))?;
    Ok(())
}

#[when("every task in the list is completed")]
fn complete_all(world: &mut HierarchyWorld) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let changed = run_async(world.service.complete_all(&caller, world.list_id()?))?;
    world.last_changed = Some(changed);
    Ok(())
}

#[when("every task in the list is unchecked")]
fn uncheck_all(world: &mut HierarchyWorld) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let changed = run_async(world.service.uncheck_all(&caller, world.list_id()?))?;
    world.last_changed = Some(changed);
    Ok(())
}
