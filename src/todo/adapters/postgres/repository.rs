//! `PostgreSQL` implementation of the entity store.

use super::{
    models::{ListRow, TaskRow, UserRow},
    schema::{tasks, todo_lists, users},
};
use crate::todo::{
    domain::{
        CredentialHash, EmailAddress, ListId, ListName, PersistedListData, PersistedTaskData,
        PersistedUserData, Task, TaskId, TaskTitle, TodoDomainError, TodoList, Urgency, User,
        UserId, Username,
    },
    ports::{ListSnapshot, TaskChangeSet, TodoStore, TodoStoreError, TodoStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by the store.
pub type TodoPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url` holding at most `max_size`
/// connections.
///
/// # Errors
///
/// Returns [`TodoStoreError::Persistence`] when the pool cannot establish
/// its initial connections.
pub fn build_pool(database_url: &str, max_size: u32) -> TodoStoreResult<TodoPgPool> {
    Pool::builder()
        .max_size(max_size)
        .build(ConnectionManager::<PgConnection>::new(database_url))
        .map_err(TodoStoreError::persistence)
}

/// `PostgreSQL`-backed entity store.
#[derive(Debug, Clone)]
pub struct PostgresTodoStore {
    pool: TodoPgPool,
}

impl PostgresTodoStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TodoPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TodoStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TodoStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TodoStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TodoStoreError::persistence)?
    }
}

#[async_trait]
impl TodoStore for PostgresTodoStore {
    async fn store_user(&self, user: &User) -> TodoStoreResult<()> {
        let row = user_to_row(user);
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), "users_username_unique") =>
                    {
                        TodoStoreError::DuplicateUsername(row.username.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), "users_email_unique") =>
                    {
                        TodoStoreError::DuplicateEmail(row.email.clone())
                    }
                    _ => TodoStoreError::from(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, id: UserId) -> TodoStoreResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_user_by_login(&self, login: &str) -> TodoStoreResult<Option<User>> {
        let needle = login.to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::username.eq(&needle).or(users::email.eq(&needle)))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> TodoStoreResult<()> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(users::table.filter(users::id.eq(id.into_inner())))
                .execute(connection)?;
            if removed == 0 {
                return Err(TodoStoreError::UserNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn store_list(&self, list: &TodoList) -> TodoStoreResult<()> {
        let row = list_to_row(list);
        self.run_blocking(move |connection| {
            diesel::insert_into(todo_lists::table)
                .values(&row)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn update_list(&self, list: &TodoList) -> TodoStoreResult<()> {
        let row = list_to_row(list);
        let list_id = list.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                todo_lists::table
                    .filter(todo_lists::id.eq(row.id))
                    .filter(todo_lists::user_id.eq(row.user_id)),
            )
            .set(&row)
            .execute(connection)?;
            if updated == 0 {
                return Err(TodoStoreError::ListNotFound(list_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_list(&self, owner: UserId, id: ListId) -> TodoStoreResult<Option<TodoList>> {
        self.run_blocking(move |connection| {
            let row = todo_lists::table
                .filter(todo_lists::id.eq(id.into_inner()))
                .filter(todo_lists::user_id.eq(owner.into_inner()))
                .select(ListRow::as_select())
                .first::<ListRow>(connection)
                .optional()?;
            row.map(row_to_list).transpose()
        })
        .await
    }

    async fn lists_for_owner(&self, owner: UserId) -> TodoStoreResult<Vec<TodoList>> {
        self.run_blocking(move |connection| {
            let rows = todo_lists::table
                .filter(todo_lists::user_id.eq(owner.into_inner()))
                .order((todo_lists::created_at.asc(), todo_lists::id.asc()))
                .select(ListRow::as_select())
                .load::<ListRow>(connection)?;
            rows.into_iter().map(row_to_list).collect()
        })
        .await
    }

    async fn delete_list(&self, owner: UserId, id: ListId) -> TodoStoreResult<()> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                todo_lists::table
                    .filter(todo_lists::id.eq(id.into_inner()))
                    .filter(todo_lists::user_id.eq(owner.into_inner())),
            )
            .execute(connection)?;
            if removed == 0 {
                return Err(TodoStoreError::ListNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task(&self, owner: UserId, id: TaskId) -> TodoStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::user_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn tasks_in_list(&self, owner: UserId, list_id: ListId) -> TodoStoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::list_id.eq(list_id.into_inner()))
                .filter(tasks::user_id.eq(owner.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn apply(&self, changes: &TaskChangeSet) -> TodoStoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let inserted: Vec<TaskRow> = changes.inserted().iter().map(task_to_row).collect();
        let updated: Vec<TaskRow> = changes.updated().iter().map(task_to_row).collect();
        let deleted: Vec<Uuid> = changes
            .deleted()
            .iter()
            .map(|id| id.into_inner())
            .collect();
        let expected = changes.expected().cloned();

        self.run_blocking(move |connection| {
            connection.build_transaction().serializable().run(move |tx| {
                if let Some(snapshot) = expected.as_ref() {
                    ensure_unchanged(tx, snapshot)?;
                }
                apply_rows(tx, &inserted, &updated, deleted)
            })
        })
        .await
    }
}

/// Re-reads the snapshot's lists inside the transaction so the change only
/// commits against the rows it was computed from.
fn ensure_unchanged(connection: &mut PgConnection, snapshot: &ListSnapshot) -> TodoStoreResult<()> {
    let list_ids: Vec<Uuid> = snapshot
        .list_ids()
        .iter()
        .map(|id| id.into_inner())
        .collect();
    let rows = tasks::table
        .filter(tasks::list_id.eq_any(list_ids))
        .filter(tasks::user_id.eq(snapshot.owner().into_inner()))
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)?;
    let current = rows
        .into_iter()
        .map(row_to_task)
        .collect::<TodoStoreResult<Vec<_>>>()?;
    if snapshot.matches(&current) {
        Ok(())
    } else {
        Err(TodoStoreError::Stale)
    }
}

fn apply_rows(
    connection: &mut PgConnection,
    inserted: &[TaskRow],
    updated: &[TaskRow],
    deleted: Vec<Uuid>,
) -> TodoStoreResult<()> {
    // Parents precede their children in the change set, so row-by-row
    // insertion satisfies the self-referencing foreign key.
    for row in inserted {
        diesel::insert_into(tasks::table)
            .values(row)
            .execute(connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                    if violates(info.as_ref(), "tasks_pkey") =>
                {
                    TodoStoreError::DuplicateTask(TaskId::from_uuid(row.id))
                }
                _ => TodoStoreError::from(err),
            })?;
    }

    for row in updated {
        let count = diesel::update(tasks::table.filter(tasks::id.eq(row.id)))
            .set(row)
            .execute(connection)?;
        if count == 0 {
            return Err(TodoStoreError::TaskNotFound(TaskId::from_uuid(row.id)));
        }
    }

    if !deleted.is_empty() {
        diesel::delete(tasks::table.filter(tasks::id.eq_any(deleted))).execute(connection)?;
    }
    Ok(())
}

impl From<DieselError> for TodoStoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info) => {
                Self::ForeignKey(
                    info.constraint_name()
                        .map_or_else(|| info.message().to_owned(), str::to_owned),
                )
            }
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => Self::Stale,
            other => Self::persistence(other),
        }
    }
}

fn violates(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}

/// A stored row that no longer satisfies domain validation.
#[derive(Debug, Error)]
enum CorruptRow {
    #[error("stored field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("task {id} has completed = {completed} but completed_at = {completed_at:?}")]
    InconsistentCompletion {
        id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    },
}

fn invalid(field: &'static str) -> impl FnOnce(TodoDomainError) -> TodoStoreError {
    move |err| {
        TodoStoreError::persistence(CorruptRow::InvalidField {
            field,
            reason: err.to_string(),
        })
    }
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id().into_inner(),
        username: user.username().as_str().to_owned(),
        email: user.email().as_str().to_owned(),
        credential_hash: user.credential().as_str().to_owned(),
        created_at: user.created_at(),
    }
}

fn row_to_user(row: UserRow) -> TodoStoreResult<User> {
    let UserRow {
        id,
        username,
        email,
        credential_hash,
        created_at,
    } = row;
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(id),
        username: Username::new(username).map_err(invalid("username"))?,
        email: EmailAddress::new(email).map_err(invalid("email"))?,
        credential: CredentialHash::new(credential_hash),
        created_at,
    }))
}

fn list_to_row(list: &TodoList) -> ListRow {
    ListRow {
        id: list.id().into_inner(),
        user_id: list.owner().into_inner(),
        name: list.name().as_str().to_owned(),
        description: list.description().map(str::to_owned),
        created_at: list.created_at(),
    }
}

fn row_to_list(row: ListRow) -> TodoStoreResult<TodoList> {
    let ListRow {
        id,
        user_id,
        name,
        description,
        created_at,
    } = row;
    Ok(TodoList::from_persisted(PersistedListData {
        id: ListId::from_uuid(id),
        owner: UserId::from_uuid(user_id),
        name: ListName::new(name).map_err(invalid("name"))?,
        description,
        created_at,
    }))
}

fn task_to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        user_id: task.owner().into_inner(),
        list_id: task.list_id().into_inner(),
        parent_id: task.parent_id().map(TaskId::into_inner),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        urgency: task.urgency().as_str().to_owned(),
        completed: task.is_completed(),
        completed_at: task.completed_at(),
        created_at: task.created_at(),
    }
}

fn row_to_task(row: TaskRow) -> TodoStoreResult<Task> {
    let TaskRow {
        id,
        user_id,
        list_id,
        parent_id,
        title,
        description,
        urgency,
        completed,
        completed_at,
        created_at,
    } = row;

    if completed != completed_at.is_some() {
        return Err(TodoStoreError::persistence(
            CorruptRow::InconsistentCompletion {
                id,
                completed,
                completed_at,
            },
        ));
    }

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: UserId::from_uuid(user_id),
        list_id: ListId::from_uuid(list_id),
        parent_id: parent_id.map(TaskId::from_uuid),
        title: TaskTitle::new(title).map_err(invalid("title"))?,
        description,
        urgency: Urgency::try_from(urgency.as_str()).map_err(invalid("urgency"))?,
        created_at,
        completed_at,
    }))
}
