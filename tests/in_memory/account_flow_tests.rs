//! Registration, sign-in, and sessions across the account and list services.

use super::helpers::{App, app};
use canopy::todo::{
    ports::{CallerResolver, Unauthenticated},
    services::{AccountError, ErrorKind, RegisterUserRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn signed_in_caller_works_with_own_lists(app: App) -> Result<(), eyre::Report> {
    let token = app.sign_up("alice").await?;
    let alice = app.caller(&token).await?;

    let list_id = app.list(&alice, "Groceries").await?;
    app.task(&alice, list_id, "Milk").await?;

    let lists = app.todos.lists(&alice).await?;
    eyre::ensure!(lists.len() == 1, "expected one list, found {}", lists.len());
    let list = lists
        .first()
        .ok_or_else(|| eyre::eyre!("missing list"))?;
    eyre::ensure!(list.name == "Groceries", "unexpected list name {}", list.name);
    eyre::ensure!(list.task_count == 1, "expected one task");
    eyre::ensure!(list.user_id == alice.user_id(), "list owned by someone else");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_accepts_email_in_any_case(app: App) -> Result<(), eyre::Report> {
    app.sign_up("carol").await?;

    let identity = app
        .accounts
        .authenticate("  Carol@Example.COM ", "carol-secret")
        .await?;

    eyre::ensure!(identity.username() == "carol", "wrong identity resolved");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_session_no_longer_resolves(app: App) -> Result<(), eyre::Report> {
    let token = app.sign_up("dave").await?;

    eyre::ensure!(app.sessions.close(token), "session should have been open");
    let resolved = app.sessions.resolve_caller(&token).await;

    eyre::ensure!(resolved == Err(Unauthenticated), "closed session still resolves");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_registration_is_a_conflict(app: App) -> Result<(), eyre::Report> {
    app.sign_up("erin").await?;

    let err = app
        .accounts
        .register(RegisterUserRequest::new(
            "erin",
            "other@example.com",
            "password",
        ))
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("duplicate username was accepted"))?;

    eyre::ensure!(
        matches!(err, AccountError::UsernameTaken(ref name) if name == "erin"),
        "unexpected error {err}"
    );
    eyre::ensure!(err.kind() == ErrorKind::Conflict, "wrong error kind");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_account_removes_its_lists(app: App) -> Result<(), eyre::Report> {
    let token = app.sign_up("frank").await?;
    let frank = app.caller(&token).await?;
    let list_id = app.list(&frank, "Chores").await?;
    let parent = app.task(&frank, list_id, "Tidy").await?;
    app.subtask(&frank, parent, "Dust shelves").await?;

    app.accounts.delete_account(&frank).await?;

    let lookup = app.todos.get_list(&frank, list_id).await;
    eyre::ensure!(
        lookup.is_err_and(|err| err.kind() == ErrorKind::NotFound),
        "list survived account deletion"
    );
    let login = app.accounts.authenticate("frank", "frank-secret").await;
    eyre::ensure!(
        matches!(login, Err(AccountError::InvalidCredentials)),
        "deleted account can still sign in"
    );
    Ok(())
}
