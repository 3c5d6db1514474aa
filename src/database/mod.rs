pub mod document;
pub mod models;
pub mod manager;
pub mod schema;

pub use document::DocumentStore;
pub use manager::{DatabaseError, DatabaseManager};
