//! Diesel schema for the entity store.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Unique login name.
        #[max_length = 80]
        username -> Varchar,
        /// Unique, lower-cased email address.
        #[max_length = 120]
        email -> Varchar,
        /// Opaque credential verifier.
        credential_hash -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// To-do lists owned by users.
    todo_lists (id) {
        /// List identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// List name.
        #[max_length = 100]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks, nested through `parent_id`.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// List the task belongs to.
        list_id -> Uuid,
        /// Parent task, if any.
        parent_id -> Nullable<Uuid>,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Urgency level.
        #[max_length = 20]
        urgency -> Varchar,
        /// Completion flag, kept equal to `completed_at IS NOT NULL`.
        completed -> Bool,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
