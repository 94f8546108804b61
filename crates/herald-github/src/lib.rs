//! GitHub REST transport and comment rendering for Herald.
//!
//! Wraps the handful of REST calls the gateway consumes (user lookup,
//! collaborator permission, issue comments, compare-commits, ref deletion)
//! behind one retrying client, plus the markdown bodies posted back to the
//! triggering issue or pull request.

pub mod api_types;
pub mod client;
pub mod render;
pub mod transport;

pub use api_types::{CommentResponse, CompareCommitsResponse, GithubUserAccount, PermissionLevel};
pub use client::GithubApiClient;
pub use transport::{
    is_retryable_github_status, is_retryable_transport_error, parse_retry_after, retry_delay,
    truncate_for_error,
};
