//! Analysis pipeline and call control for callsim.
//!
//! [`AnalysisOrchestrator`] decides when the text-completion capability is
//! invoked and folds results back into the session; [`CallController`] is
//! the single owner of the active call, wiring the transport's turn feed,
//! the orchestrator, and the store together.

pub mod cli;
pub mod controller;
pub mod orchestrator;
pub mod prompts;

pub use controller::{CallController, SessionHandle};
pub use orchestrator::AnalysisOrchestrator;
