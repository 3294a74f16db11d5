pub mod backend;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use backend::{BlobBackend, FileBackend, MemoryBackend, UnavailableBackend};
pub use sqlite::SqliteBackend;
pub use store::Persistence;
