//! Shared models for the Herald GitHub Actions gateway.
//!
//! Provides the resolved configuration inputs, the immutable event context
//! built once per invocation, and small parsing helpers consumed by the
//! trigger, access, and runtime crates.

pub mod event_context;
pub mod inputs;

pub use event_context::{parse_github_event, EventContext, EventParseError, GithubEvent, RepoRef};
pub use inputs::{split_list_input, strip_leading_at, InputError, TriggerInputs};
