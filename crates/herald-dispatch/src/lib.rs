//! Tool dispatch for the Herald gateway.
//!
//! Resolves a closed set of AI CLI tools to concrete commands, runs the
//! selected tool as a foreground subprocess with a spawn-level timeout and a
//! capped output capture, and guarantees a result artifact for reporting.

pub mod artifact;
pub mod invocation;
pub mod tool_id;

pub use artifact::{ensure_result_artifact, synthesize_result_artifact};
pub use invocation::{
    invoke, resolve_invocation, Conclusion, DispatchError, DispatchSettings, InstallStep,
    InvocationOutcome, ToolInvocationConfig,
};
pub use tool_id::ToolId;
