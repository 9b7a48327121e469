//! Column Explorer
//!
//! Client-side session: the browsable state, the reducer that changes it, and
//! the orchestrator that turns user actions into requests against an
//! [`ExplainApi`].

mod api;
mod orchestrator;
mod state;

pub use api::ExplainApi;
pub use orchestrator::{DeepDiveOutcome, ExplainOutcome, Orchestrator};
pub use state::{Column, Event, ExplorerState, FailureKind, FileDetailView, ItemView, reduce};
