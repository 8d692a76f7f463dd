// Cardstash Library - Named Collection Persistence
// This exposes the save workflow and client seams for testing and integration

pub mod clients;
pub mod config;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use clients::{
    ClientError, CollectionId, CollectionRecord, CollectionStore, CreateOutcome,
    HttpNamingService, InMemoryCollectionStore, NamingService, OwnerId,
};
#[cfg(feature = "database")]
pub use clients::SqliteCollectionStore;
pub use config::CardstashConfig;
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
pub use workflow::{Failure, FailureReason, NormalizedName, Phase, SaveWorkflow, Snapshot};
