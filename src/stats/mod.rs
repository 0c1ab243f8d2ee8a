//! Usage statistics: event recording, the key-value backends and the admin views

pub mod aggregate;
pub mod dashboard;
pub mod event;
pub mod keys;
pub mod memory_store;
pub mod recorder;
pub mod routes;
pub mod seed;
pub mod sqlite_store;
pub mod store;

pub use aggregate::{build_report, StatsReport};
pub use event::{mask_access_key, StatsEvent};
pub use memory_store::MemoryStore;
pub use recorder::{record_event, record_quietly, RecordError};
pub use routes::stats_router;
pub use sqlite_store::SqliteStore;
pub use store::{KeyValueStore, StoreError};
