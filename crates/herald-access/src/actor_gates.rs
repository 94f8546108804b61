use herald_github::GithubApiClient;
use thiserror::Error;

fn allowed_bots_suffix(allowed_bots: &[String]) -> String {
    if allowed_bots.is_empty() {
        String::new()
    } else {
        format!(" (allowed bots: {})", allowed_bots.join(", "))
    }
}

#[derive(Debug, Error)]
/// Enumerates authorization failures for triggering actors.
pub enum AccessError {
    #[error(
        "actor '{actor}' with account type '{account_type}' is not authorized to trigger runs{}",
        allowed_bots_suffix(.allowed_bots)
    )]
    UnauthorizedActor {
        actor: String,
        account_type: String,
        allowed_bots: Vec<String>,
    },
    #[error("permission lookup for actor '{actor}' failed")]
    PermissionCheckFailed {
        actor: String,
        #[source]
        source: anyhow::Error,
    },
}

fn lookup_failed(actor: &str, source: anyhow::Error) -> AccessError {
    AccessError::PermissionCheckFailed {
        actor: actor.to_string(),
        source,
    }
}

/// Gate 1: the actor must be a human account, or a bot on the allow list.
///
/// Account type `User` always passes. Type `Bot` passes only on an exact,
/// case-sensitive login match against `allowed_bot_names`. Every other type
/// is refused, `Organization` included, whitelisted or not.
pub async fn check_allowed_actor(
    client: &GithubApiClient,
    actor: &str,
    allowed_bot_names: &[String],
) -> Result<(), AccessError> {
    let account = client
        .get_user(actor)
        .await
        .map_err(|source| lookup_failed(actor, source))?;
    if account.is_user() {
        return Ok(());
    }
    if account.is_bot() && allowed_bot_names.iter().any(|name| name == actor) {
        return Ok(());
    }
    Err(AccessError::UnauthorizedActor {
        actor: actor.to_string(),
        account_type: account.account_type,
        allowed_bots: allowed_bot_names.to_vec(),
    })
}

/// Gate 2: the actor must hold write access on the repository.
///
/// Allow-listed bots short-circuit to `true` without touching the API.
/// Otherwise the collaborator-permission endpoint decides: only `admin` and
/// `write` pass. Lookup failures propagate instead of collapsing to `false`.
pub async fn check_write_permissions(
    client: &GithubApiClient,
    actor: &str,
    allowed_bot_names: &[String],
) -> Result<bool, AccessError> {
    if allowed_bot_names.iter().any(|name| name == actor) {
        return Ok(true);
    }
    let level = client
        .get_collaborator_permission(actor)
        .await
        .map_err(|source| lookup_failed(actor, source))?;
    Ok(level.grants_write())
}

#[cfg(test)]
mod tests {
    use super::{check_allowed_actor, check_write_permissions, AccessError};
    use herald_core::RepoRef;
    use herald_github::GithubApiClient;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client(base_url: &str) -> GithubApiClient {
        GithubApiClient::new(
            base_url.to_string(),
            "test-token".to_string(),
            RepoRef::parse("acme/widgets").expect("repo"),
            2_000,
            1,
            1,
        )
        .expect("github client")
    }

    fn mock_user(server: &MockServer, login: &str, account_type: &str) {
        let login = login.to_string();
        let account_type = account_type.to_string();
        server.mock(move |when, then| {
            when.method(GET).path(format!("/users/{login}"));
            then.status(200)
                .json_body(json!({ "login": login, "type": account_type }));
        });
    }

    #[tokio::test]
    async fn functional_check_allowed_actor_accepts_human_users() {
        let server = MockServer::start();
        mock_user(&server, "alice", "User");
        let client = test_client(&server.base_url());
        check_allowed_actor(&client, "alice", &[]).await.expect("human passes");
    }

    #[tokio::test]
    async fn functional_check_allowed_actor_accepts_whitelisted_bots() {
        let server = MockServer::start();
        mock_user(&server, "dependabot[bot]", "Bot");
        let client = test_client(&server.base_url());
        let allowed = vec!["dependabot[bot]".to_string()];
        check_allowed_actor(&client, "dependabot[bot]", &allowed)
            .await
            .expect("whitelisted bot passes");
    }

    #[tokio::test]
    async fn functional_check_allowed_actor_refuses_unlisted_bots_with_diagnostics() {
        let server = MockServer::start();
        mock_user(&server, "malicious-bot", "Bot");
        let client = test_client(&server.base_url());
        let allowed = vec!["dependabot[bot]".to_string()];
        let error = check_allowed_actor(&client, "malicious-bot", &allowed)
            .await
            .expect_err("unlisted bot refused");
        let message = error.to_string();
        assert!(message.contains("malicious-bot"));
        assert!(message.contains("'Bot'"));
        assert!(message.contains("dependabot[bot]"));
    }

    #[tokio::test]
    async fn regression_check_allowed_actor_refuses_organizations_even_when_listed() {
        let server = MockServer::start();
        mock_user(&server, "acme-org", "Organization");
        let client = test_client(&server.base_url());
        let allowed = vec!["acme-org".to_string()];
        let error = check_allowed_actor(&client, "acme-org", &allowed)
            .await
            .expect_err("organizations never pass");
        assert!(matches!(error, AccessError::UnauthorizedActor { .. }));
        assert!(error.to_string().contains("'Organization'"));
    }

    #[tokio::test]
    async fn regression_check_allowed_actor_omits_empty_allow_list_from_message() {
        let server = MockServer::start();
        mock_user(&server, "some-bot", "Bot");
        let client = test_client(&server.base_url());
        let error = check_allowed_actor(&client, "some-bot", &[])
            .await
            .expect_err("unlisted bot refused");
        assert!(!error.to_string().contains("allowed bots"));
    }

    #[tokio::test]
    async fn functional_check_write_permissions_skips_api_for_whitelisted_bots() {
        let server = MockServer::start();
        let permission = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/acme/widgets/collaborators/dependabot[bot]/permission");
            then.status(200).json_body(json!({ "permission": "none" }));
        });

        let client = test_client(&server.base_url());
        let allowed = vec!["dependabot[bot]".to_string()];
        let granted = check_write_permissions(&client, "dependabot[bot]", &allowed)
            .await
            .expect("whitelist short-circuits");
        assert!(granted);
        permission.assert_calls(0);
    }

    #[tokio::test]
    async fn functional_check_write_permissions_maps_permission_levels() {
        for (permission, expected) in [("admin", true), ("write", true), ("read", false)] {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(GET)
                    .path("/repos/acme/widgets/collaborators/alice/permission");
                then.status(200).json_body(json!({ "permission": permission }));
            });
            let client = test_client(&server.base_url());
            let granted = check_write_permissions(&client, "alice", &[])
                .await
                .expect("lookup succeeds");
            assert_eq!(granted, expected, "permission {permission}");
        }
    }

    #[tokio::test]
    async fn regression_check_write_permissions_propagates_lookup_failures() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/acme/widgets/collaborators/alice/permission");
            then.status(500).body("server error");
        });

        let client = test_client(&server.base_url());
        let error = check_write_permissions(&client, "alice", &[])
            .await
            .expect_err("failure must propagate, never false");
        assert!(matches!(error, AccessError::PermissionCheckFailed { .. }));
        assert!(error.to_string().contains("alice"));
    }
}
