use std::time::Duration;

const RETRY_DELAY_MAX_MS: u64 = 30_000;

/// Return true for GitHub statuses worth a bounded retry.
pub fn is_retryable_github_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Return true for transport-level errors worth a bounded retry.
pub fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Parse a `Retry-After` header into a delay, seconds form only.
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let value = headers.get(reqwest::header::RETRY_AFTER)?;
    let seconds = value.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Delay before retry `attempt` (1-based): exponential from the base, capped,
/// with any server-provided `Retry-After` taking precedence when larger.
pub fn retry_delay(base_delay_ms: u64, attempt: usize, retry_after: Option<Duration>) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10) as u32;
    let backoff_ms = base_delay_ms
        .max(1)
        .saturating_mul(1_u64 << exponent)
        .min(RETRY_DELAY_MAX_MS);
    let backoff = Duration::from_millis(backoff_ms);
    match retry_after {
        Some(server_delay) if server_delay > backoff => server_delay,
        _ => backoff,
    }
}

/// Truncate text destined for error messages, marking elision with `...`.
pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::{
        is_retryable_github_status, parse_retry_after, retry_delay, truncate_for_error,
    };
    use std::time::Duration;

    #[test]
    fn unit_is_retryable_github_status_covers_rate_limit_and_server_errors() {
        assert!(is_retryable_github_status(429));
        assert!(is_retryable_github_status(500));
        assert!(is_retryable_github_status(503));
        assert!(!is_retryable_github_status(403));
        assert!(!is_retryable_github_status(404));
        assert!(!is_retryable_github_status(200));
    }

    #[test]
    fn unit_retry_delay_grows_exponentially_and_caps() {
        assert_eq!(retry_delay(100, 1, None), Duration::from_millis(100));
        assert_eq!(retry_delay(100, 2, None), Duration::from_millis(200));
        assert_eq!(retry_delay(100, 3, None), Duration::from_millis(400));
        assert_eq!(retry_delay(10_000, 4, None), Duration::from_millis(30_000));
    }

    #[test]
    fn functional_retry_delay_honors_larger_retry_after() {
        let delay = retry_delay(100, 1, Some(Duration::from_secs(5)));
        assert_eq!(delay, Duration::from_secs(5));
        let delay = retry_delay(10_000, 3, Some(Duration::from_secs(1)));
        assert_eq!(delay, Duration::from_millis(30_000));
    }

    #[test]
    fn functional_parse_retry_after_reads_second_values() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "7".parse().expect("header"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(
            reqwest::header::RETRY_AFTER,
            "Wed, 21 Oct 2026 07:28:00 GMT".parse().expect("header"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn regression_truncate_for_error_marks_elision() {
        assert_eq!(truncate_for_error("short", 600), "short");
        let long = "x".repeat(700);
        let truncated = truncate_for_error(&long, 600);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 603);
    }
}
