//! Insightctl library - exposes the CLI modules for integration tests

pub mod logging;
pub mod memory_store;
pub mod output;
pub mod repl;
