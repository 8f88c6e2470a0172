//! Builders shared by the unit tests.

use crate::todo::{
    domain::{
        CredentialHash, EmailAddress, ListId, PersistedTaskData, Task, TaskId, TaskTitle, Urgency,
        User, UserId, Username,
    },
    hierarchy::TaskForest,
    ports::UserIdentity,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::DefaultClock;

/// Returns a fixed instant offset by `minutes`.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(minutes)
}

/// Creates a user record with a placeholder credential.
pub fn user(name: &str) -> User {
    User::new(
        Username::new(name).expect("valid username"),
        EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
        CredentialHash::new("$argon2id$placeholder"),
        &DefaultClock,
    )
}

/// Returns the identity of `user`.
pub fn identity_of(user: &User) -> UserIdentity {
    UserIdentity::new(user.id(), user.username().as_str())
}

/// Builds task sets with strictly increasing creation times.
pub struct TreeBuilder {
    owner: UserId,
    list_id: ListId,
    tasks: Vec<Task>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            owner: UserId::new(),
            list_id: ListId::new(),
            tasks: Vec::new(),
        }
    }

    pub const fn list_id(&self) -> ListId {
        self.list_id
    }

    pub fn add(&mut self, title: &str, parent_id: Option<TaskId>) -> TaskId {
        let list_id = self.list_id;
        self.add_to(list_id, title, parent_id, None)
    }

    pub fn add_completed(&mut self, title: &str, parent_id: Option<TaskId>) -> TaskId {
        let list_id = self.list_id;
        let minute = self.next_minute();
        self.add_to(list_id, title, parent_id, Some(at(minute)))
    }

    pub fn add_to(
        &mut self,
        list_id: ListId,
        title: &str,
        parent_id: Option<TaskId>,
        completed_at: Option<DateTime<Utc>>,
    ) -> TaskId {
        let id = TaskId::new();
        let created_at = at(self.next_minute());
        self.tasks.push(Task::from_persisted(PersistedTaskData {
            id,
            owner: self.owner,
            list_id,
            parent_id,
            title: TaskTitle::new(title).expect("valid title"),
            description: None,
            urgency: Urgency::default(),
            created_at,
            completed_at,
        }));
        id
    }

    /// Adds a chain of `length` tasks, each nested under the previous one,
    /// and returns them from the top down.
    pub fn chain(&mut self, length: usize) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = Vec::with_capacity(length);
        for level in 0..length {
            let parent = ids.last().copied();
            ids.push(self.add(&format!("L{level}"), parent));
        }
        ids
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn forest(&self) -> TaskForest {
        TaskForest::from_tasks(self.tasks.clone())
    }

    fn next_minute(&self) -> i64 {
        i64::try_from(self.tasks.len()).expect("small task count")
    }
}
