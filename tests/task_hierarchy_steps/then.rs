//! Then steps for task hierarchy BDD scenarios.

use super::world::{HierarchyWorld, run_async};
use canopy::todo::services::ErrorKind;
use rstest_bdd_macros::then;

#[then("the request is rejected as a conflict")]
fn rejected_as_conflict(world: &HierarchyWorld) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the request to fail"))?;
    if err.kind() != ErrorKind::Conflict {
        return Err(eyre::eyre!("expected a conflict, found {err}"));
    }
    Ok(())
}

#[then("the list holds {count:u64} tasks")]
fn list_holds(world: &HierarchyWorld, count: u64) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let list = run_async(world.service.get_list(&caller, world.list_id()?))?;
    if u64::try_from(list.task_count)? != count {
        return Err(eyre::eyre!(
            "expected {count} tasks, found {}",
            list.task_count
        ));
    }
    Ok(())
}

#[then(r#""{title}" is a top-level task"#)]
fn is_top_level(world: &HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let task = run_async(world.service.get_task(&caller, world.task(&title)?))?;
    if task.parent_id.is_some() || task.depth != 0 {
        return Err(eyre::eyre!("expected '{title}' to stay at the top level"));
    }
    Ok(())
}

#[then(r#""{title}" is complete"#)]
fn is_complete(world: &HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let task = run_async(world.service.get_task(&caller, world.task(&title)?))?;
    if !task.completed || task.completed_at.is_none() {
        return Err(eyre::eyre!("expected '{title}' to be complete"));
    }
    Ok(())
}

#[then(r#""{title}" is open"#)]
fn is_open(world: &HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let task = run_async(world.service.get_task(&caller, world.task(&title)?))?;
    if task.completed || task.completed_at.is_some() {
        return Err(eyre::eyre!("expected '{title}' to be open"));
    }
    Ok(())
}

#[then("{count:u64} tasks changed")]
fn tasks_changed(world: &HierarchyWorld, count: u64) -> Result<(), eyre::Report> {
    let changed = world
        .last_changed
        .ok_or_else(|| eyre::eyre!("no bulk operation has run"))?;
    if u64::try_from(changed)? != count {
        return Err(eyre::eyre!("expected {count} changed tasks, found {changed}"));
    }
    Ok(())
}
