use crate::transport::truncate_for_error;

pub const GITHUB_COMMENT_MAX_CHARS: usize = 65_000;
const ERROR_MESSAGE_MAX_CHARS: usize = 600;
const TRUNCATION_NOTICE: &str = "\n\n_(truncated)_";

/// Clamp a comment body to the GitHub comment size limit.
pub fn clamp_comment_body(body: &str) -> String {
    if body.chars().count() <= GITHUB_COMMENT_MAX_CHARS {
        return body.to_string();
    }
    let keep = GITHUB_COMMENT_MAX_CHARS.saturating_sub(TRUNCATION_NOTICE.chars().count());
    let clamped: String = body.chars().take(keep).collect();
    format!("{clamped}{TRUNCATION_NOTICE}")
}

/// Tracking comment posted when a run is accepted.
pub fn render_run_started_comment(actor: &str, tool_identifier: &str) -> String {
    clamp_comment_body(&format!(
        "Herald is working on this request from @{actor}.\n\n_Herald | tool `{tool_identifier}` | status `running`_"
    ))
}

/// Final comment body for a run that exited successfully.
pub fn render_run_success_comment(tool_identifier: &str, output_tail: &str) -> String {
    let body = if output_tail.trim().is_empty() {
        format!(
            "Herald run completed.\n\n_Herald | tool `{tool_identifier}` | status `success` | exit `0`_"
        )
    } else {
        format!(
            "Herald run completed.\n\n```\n{}\n```\n\n_Herald | tool `{tool_identifier}` | status `success` | exit `0`_",
            output_tail.trim_end()
        )
    };
    clamp_comment_body(&body)
}

/// Final comment body for a run that failed, with the error truncated.
pub fn render_run_failure_comment(
    tool_identifier: &str,
    exit_status: &str,
    error_message: &str,
) -> String {
    clamp_comment_body(&format!(
        "Herald run failed.\n\nError: `{}`\n\n_Herald | tool `{tool_identifier}` | status `failed` | exit `{exit_status}`_",
        truncate_for_error(error_message, ERROR_MESSAGE_MAX_CHARS)
    ))
}
