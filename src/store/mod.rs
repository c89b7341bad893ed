//! Storage adapters for the congress collaborator traits.

pub mod sqlite;

pub use sqlite::SqliteStore;
