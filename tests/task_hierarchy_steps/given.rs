//! Given steps for task hierarchy BDD scenarios.

use super::world::{HierarchyWorld, run_async};
use canopy::todo::{
    domain::{CredentialHash, EmailAddress, User, Username},
    hierarchy::TaskForest,
    ports::{TaskChangeSet, TodoStore, UserIdentity},
    services::{CreateListRequest, CreateTaskRequest, UpdateTaskRequest},
};
use chrono::Utc;
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;

#[given(r#"a signed-in user with a list named "{name}""#)]
fn signed_in_user_with_list(world: &mut HierarchyWorld, name: String) -> Result<(), eyre::Report> {
    let user = User::new(
        Username::new("planner").wrap_err("build username")?,
        EmailAddress::new("planner@example.com").wrap_err("build email")?,
        CredentialHash::new("$argon2id$placeholder"),
        &DefaultClock,
    );
    run_async(world.store.store_user(&user)).wrap_err("store scenario user")?;
    let caller = UserIdentity::new(user.id(), user.username().as_str());

    let list = run_async(
        world
            .service
            .create_list(&caller, CreateListRequest::new(name)),
    )
    .wrap_err("create scenario list")?;

    world.list_id = Some(list.id);
    world.caller = Some(caller);
    Ok(())
}

#[given(r#"a task "{title}""#)]
fn top_level_task(world: &mut HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let request = CreateTaskRequest::new(world.list_id()?, title.as_str());
    let created = run_async(world.service.create_task(&caller, request))
        .wrap_err("create top-level task")?;
    world.tasks.insert(title, created.id);
    Ok(())
}

#[given(r#"a subtask "{title}" under "{parent}""#)]
fn subtask_under(
    world: &mut HierarchyWorld,
    title: String,
    parent: String,
) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let request = CreateTaskRequest::subtask_of(world.task(&parent)?, title.as_str());
    let created =
        run_async(world.service.create_task(&caller, request)).wrap_err("create subtask")?;
    world.tasks.insert(title, created.id);
    Ok(())
}

#[given("a chain of {length:u64} nested tasks")]
fn nested_chain(world: &mut HierarchyWorld, length: u64) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let list_id = world.list_id()?;
    let mut parent = None;
    for level in 0..length {
        let title = format!("Level {level}");
        let request = match parent {
            None => CreateTaskRequest::new(list_id, title.as_str()),
            Some(parent_id) => CreateTaskRequest::subtask_of(parent_id, title.as_str()),
        };
        let created = run_async(world.service.create_task(&caller, request))
            .wrap_err_with(|| format!("create {title}"))?;
        world.tasks.insert(title, created.id);
        parent = Some(created.id);
    }
    world.deepest = parent;
    Ok(())
}

#[given(r#""{title}" has been completed"#)]
fn task_completed(world: &mut HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let caller = world.caller()?;
    let request = UpdateTaskRequest::new().with_completed(true);
    run_async(
        world
            .service
            .update_task(&caller, world.task(&title)?, request),
    )
    .wrap_err("complete task")?;
    Ok(())
}

#[given(r#""{title}" has been completed without its subtasks"#)]
fn task_completed_alone(world: &mut HierarchyWorld, title: String) -> Result<(), eyre::Report> {
    let owner = world.caller()?.user_id();
    let stored = run_async(world.store.tasks_in_list(owner, world.list_id()?))
        .wrap_err("load scenario tasks")?;
    let mut forest = TaskForest::from_tasks(stored);
    forest
        .mark_completed(world.task(&title)?, false, Utc::now())
        .wrap_err("complete task without cascade")?;
    let changes = TaskChangeSet::new().update(forest.changed_tasks());
    run_async(world.store.apply(&changes)).wrap_err("persist completion")?;
    Ok(())
}
