pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProfileStore;
pub use models::profile::{Profile, ProfileEdit, ProfileUpdate};
pub use repository::PgProfileStore;
pub use store::{ProfileStore, StoreError};
