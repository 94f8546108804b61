use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::json;

use herald_core::RepoRef;

use crate::api_types::{
    CommentResponse, CompareCommitsResponse, GithubUserAccount, PermissionLevel,
};
use crate::transport::{
    is_retryable_github_status, is_retryable_transport_error, parse_retry_after, retry_delay,
    truncate_for_error,
};

const ERROR_BODY_MAX_CHARS: usize = 300;

#[derive(Clone)]
/// Thin retrying client for the REST calls Herald consumes.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    repo: RepoRef,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl GithubApiClient {
    pub fn new(
        api_base: String,
        token: String,
        repo: RepoRef,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("herald-github-gateway"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http: client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo,
            retry_max_attempts: retry_max_attempts.max(1),
            retry_base_delay_ms: retry_base_delay_ms.max(1),
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// `GET /users/{login}` — account record used by actor gating.
    pub async fn get_user(&self, login: &str) -> Result<GithubUserAccount> {
        self.request_json("get user", || {
            self.http
                .get(format!("{}/users/{login}", self.api_base))
        })
        .await
    }

    /// `GET /repos/{owner}/{repo}/collaborators/{login}/permission`.
    pub async fn get_collaborator_permission(&self, login: &str) -> Result<PermissionLevel> {
        self.request_json("get collaborator permission", || {
            self.http.get(format!(
                "{}/repos/{}/{}/collaborators/{login}/permission",
                self.api_base, self.repo.owner, self.repo.name
            ))
        })
        .await
    }

    pub async fn create_issue_comment(
        &self,
        issue_number: u64,
        body: &str,
    ) -> Result<CommentResponse> {
        let payload = json!({ "body": body });
        self.request_json("create issue comment", || {
            self.http
                .post(format!(
                    "{}/repos/{}/{}/issues/{}/comments",
                    self.api_base, self.repo.owner, self.repo.name, issue_number
                ))
                .json(&payload)
        })
        .await
    }

    pub async fn update_issue_comment(
        &self,
        comment_id: u64,
        body: &str,
    ) -> Result<CommentResponse> {
        let payload = json!({ "body": body });
        self.request_json("update issue comment", || {
            self.http
                .patch(format!(
                    "{}/repos/{}/{}/issues/comments/{}",
                    self.api_base, self.repo.owner, self.repo.name, comment_id
                ))
                .json(&payload)
        })
        .await
    }

    /// `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
    pub async fn compare_commits(
        &self,
        base: &str,
        head: &str,
    ) -> Result<CompareCommitsResponse> {
        self.request_json("compare commits", || {
            self.http.get(format!(
                "{}/repos/{}/{}/compare/{base}...{head}",
                self.api_base, self.repo.owner, self.repo.name
            ))
        })
        .await
    }

    /// `DELETE /repos/{owner}/{repo}/git/refs/heads/{branch}`.
    pub async fn delete_branch_ref(&self, branch: &str) -> Result<()> {
        self.request_empty("delete branch ref", || {
            self.http.delete(format!(
                "{}/repos/{}/{}/git/refs/heads/{branch}",
                self.api_base, self.repo.owner, self.repo.name
            ))
        })
        .await
    }

    async fn request_json<T, F>(&self, operation: &str, request_builder: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let response = self.send_with_retry(operation, request_builder).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode github {operation} response"))
    }

    async fn request_empty<F>(&self, operation: &str, request_builder: F) -> Result<()>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        self.send_with_retry(operation, request_builder).await?;
        Ok(())
    }

    async fn send_with_retry<F>(
        &self,
        operation: &str,
        mut request_builder: F,
    ) -> Result<reqwest::Response>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            match request_builder().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if attempt < self.retry_max_attempts
                        && is_retryable_github_status(status.as_u16())
                    {
                        tokio::time::sleep(retry_delay(
                            self.retry_base_delay_ms,
                            attempt,
                            retry_after,
                        ))
                        .await;
                        continue;
                    }
                    bail!(
                        "github {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_for_error(&body, ERROR_BODY_MAX_CHARS)
                    );
                }
                Err(error) => {
                    if attempt < self.retry_max_attempts && is_retryable_transport_error(&error) {
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(anyhow::Error::new(error)
                        .context(format!("github {operation} request failed")));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GithubApiClient;
    use herald_core::RepoRef;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client(base_url: &str) -> GithubApiClient {
        GithubApiClient::new(
            base_url.to_string(),
            "test-token".to_string(),
            RepoRef::parse("acme/widgets").expect("repo"),
            2_000,
            3,
            1,
        )
        .expect("github client")
    }

    #[tokio::test]
    async fn functional_get_user_sends_auth_and_parses_account_type() {
        let server = MockServer::start();
        let lookup = server.mock(|when, then| {
            when.method(GET)
                .path("/users/dependabot[bot]")
                .header("authorization", "Bearer test-token")
                .header("accept", "application/vnd.github+json");
            then.status(200)
                .json_body(json!({ "login": "dependabot[bot]", "type": "Bot" }));
        });

        let client = test_client(&server.base_url());
        let account = client.get_user("dependabot[bot]").await.expect("account");
        assert_eq!(account.login, "dependabot[bot]");
        assert!(account.is_bot());
        lookup.assert_calls(1);
    }

    #[tokio::test]
    async fn functional_get_collaborator_permission_parses_level() {
        let server = MockServer::start();
        let _permission = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/acme/widgets/collaborators/alice/permission");
            then.status(200).json_body(json!({ "permission": "write" }));
        });

        let client = test_client(&server.base_url());
        let level = client
            .get_collaborator_permission("alice")
            .await
            .expect("permission");
        assert!(level.grants_write());
    }

    #[tokio::test]
    async fn functional_create_issue_comment_posts_body() {
        let server = MockServer::start();
        let created = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/acme/widgets/issues/7/comments")
                .body_includes("Herald is working");
            then.status(201).json_body(json!({
                "id": 991,
                "html_url": "https://example.test/comment/991"
            }));
        });

        let client = test_client(&server.base_url());
        let response = client
            .create_issue_comment(7, "Herald is working on this.")
            .await
            .expect("comment");
        assert_eq!(response.id, 991);
        created.assert_calls(1);
    }

    #[tokio::test]
    async fn functional_delete_branch_ref_accepts_empty_body() {
        let server = MockServer::start();
        let deleted = server.mock(|when, then| {
            when.method(DELETE)
                .path("/repos/acme/widgets/git/refs/heads/herald/issue-7");
            then.status(204);
        });

        let client = test_client(&server.base_url());
        client
            .delete_branch_ref("herald/issue-7")
            .await
            .expect("delete ref");
        deleted.assert_calls(1);
    }

    #[tokio::test]
    async fn integration_request_retries_retryable_statuses() {
        let server = MockServer::start();
        let flaky = server.mock(|when, then| {
            when.method(GET).path("/users/alice");
            then.status(502).body("bad gateway");
        });

        let client = test_client(&server.base_url());
        let error = client.get_user("alice").await.expect_err("should exhaust");
        assert!(error.to_string().contains("status 502"));
        flaky.assert_calls(3);
    }

    #[tokio::test]
    async fn regression_request_does_not_retry_client_errors() {
        let server = MockServer::start();
        let missing = server.mock(|when, then| {
            when.method(GET).path("/users/ghost");
            then.status(404).body("{\"message\":\"Not Found\"}");
        });

        let client = test_client(&server.base_url());
        let error = client.get_user("ghost").await.expect_err("not found");
        assert!(error.to_string().contains("status 404"));
        missing.assert_calls(1);
    }
}
