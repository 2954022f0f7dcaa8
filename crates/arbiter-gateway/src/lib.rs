//! Request orchestration.
//!
//! Ties model naming, routing, conversation memory, file handling, and
//! provider dispatch together for one request at a time. The
//! orchestrator owns none of its collaborators; it is a coordinator
//! constructed from shared components at startup.

pub mod files;
pub mod naming;
pub mod orchestrator;
pub mod prompts;

pub use naming::ResolvedModel;
pub use orchestrator::RequestOrchestrator;
