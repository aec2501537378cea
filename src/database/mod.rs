pub mod documents;
pub mod manager;
pub mod models;
pub mod repository;

pub use documents::{Document, DocumentStore, MemoryDocumentStore, PgDocumentStore, StoreError};
pub use manager::{ConnectionStatus, Database, DatabaseError};
pub use repository::{Repository, Resource};
