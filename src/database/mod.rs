pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod store;
pub mod value;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryStore, MemoryTables};
pub use postgres::PgStore;
pub use query::{Range, SortDirection};
pub use store::{
    CatalogStore, ContentStore, ProfileStore, QuestionStore, StudyStore, SubscriptionStore, UsageStore,
};
