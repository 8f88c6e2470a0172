//! Unit tests for the todo context.

mod support;
