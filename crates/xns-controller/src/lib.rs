//! Session and transaction orchestration for the EXE name service client.
//!
//! The [`Controller`] owns the wallet session, the registry snapshot, the
//! edit form and the busy flag. Everything else in this crate is the
//! machinery it drives: session probing, the network guard, the
//! register-then-annotate state machine and the registry fan-out fetch.

pub mod config;
mod controller;
pub mod edit;
pub mod error;
pub mod events;
pub mod guard;
pub mod orchestrator;
pub mod pricing;
pub mod registry_view;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use controller::Controller;
pub use edit::{EditMode, FormState};
pub use error::{ControllerError, TxStage, ValidationError};
pub use events::{ControllerEvent, Notice};
pub use orchestrator::TxPhase;
pub use registry_view::RegistrySnapshot;
pub use session::{ActiveNetwork, Session};
