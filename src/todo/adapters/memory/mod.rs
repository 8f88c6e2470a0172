//! In-memory adapters for tests and embedded use.

mod sessions;
mod store;

pub use sessions::InMemorySessionRegistry;
pub use store::InMemoryTodoStore;
