// External client boundary - naming service and collection store seams
//
// The workflow controller only ever sees these traits; concrete backends
// (HTTP naming endpoint, in-memory store, sqlite store) live behind them.

pub mod errors;
pub mod memory;
pub mod naming;
#[cfg(feature = "database")]
pub mod sqlite;
pub mod store;

pub use errors::ClientError;
pub use memory::InMemoryCollectionStore;
pub use naming::{HttpNamingService, NamingService};
#[cfg(feature = "database")]
pub use sqlite::SqliteCollectionStore;
pub use store::{CollectionId, CollectionRecord, CollectionStore, CreateOutcome, OwnerId};
