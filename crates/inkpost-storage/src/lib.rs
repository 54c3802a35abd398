// Storage layer for Inkpost
//
// Two interchangeable backends behind the StorageBackend enum:
// - Database: Postgres via sqlx (production)
// - InMemoryDatabase: HashMap-based (dev mode and tests)
//
// Password hashing lives here too so the hash never crosses the crate
// boundary in either direction except as an opaque string on UserRow.

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use password::{hash_password, verify_password};
pub use repositories::Database;
