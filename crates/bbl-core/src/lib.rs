//! bbl core
//!
//! Shared building blocks for the bbl pipeline: the persisted environment
//! state, the state store that owns `bbl-state.json`, and the narrow
//! capabilities (process runner, filesystem, step logger) every other crate
//! receives through its constructor.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                     bbl CLI                      │
//! │         (up / destroy / create-lbs / ...)        │
//! └───────┬──────────────┬──────────────┬───────────┘
//!         │              │              │
//! ┌───────▼──────┐ ┌─────▼──────┐ ┌─────▼──────────┐
//! │ bbl-terraform│ │  bbl-bosh  │ │ bbl-cloudconfig│
//! └───────┬──────┘ └─────┬──────┘ └─────┬──────────┘
//!         │              │              │
//! ┌───────▼──────────────▼──────────────▼───────────┐
//! │                    bbl-core                      │
//! │   State · Store · CommandRunner · FileIo · Log   │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod error;
pub mod fs;
pub mod iaas;
pub mod logger;
pub mod state;
pub mod store;

// Re-exports
pub use command::{CommandOutput, CommandRunner, Invocation, ProcessRunner};
pub use error::{Result, StateError};
pub use fs::{FileIo, LocalFs};
pub use iaas::Iaas;
pub use logger::{ConsoleLogger, StepLogger};
pub use state::{Aws, Azure, Bosh, Gcp, Jumpbox, Lb, State};
pub use store::{
    IdGenerator, OLDEST_SUPPORTED_VERSION, STATE_FILE, STATE_VERSION, StateStore, Store,
    UuidGenerator,
};
