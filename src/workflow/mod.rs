// Named-Collection Save Workflow
//
// The controller sequences the three external calls (suggest, exists,
// create) behind a generation-marked state machine; name.rs owns the
// normalization rule that defines the uniqueness key.

pub mod controller;
pub mod name;
pub mod state;

#[cfg(test)]
pub mod mocks;


pub use controller::SaveWorkflow;
pub use name::NormalizedName;
pub use state::{Failure, FailureReason, Phase, Snapshot};
