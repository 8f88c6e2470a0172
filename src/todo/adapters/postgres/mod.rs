//! `PostgreSQL` adapters for the entity store.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTodoStore, TodoPgPool, build_pool};

/// SQL creating the tables, constraints, and indexes the store relies on.
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-19-000000_create_todo_tables/up.sql");
