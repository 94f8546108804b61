use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
/// Account record from `GET /users/{login}`.
pub struct GithubUserAccount {
    pub login: String,
    #[serde(rename = "type")]
    pub account_type: String,
}

impl GithubUserAccount {
    pub fn is_user(&self) -> bool {
        self.account_type == "User"
    }

    pub fn is_bot(&self) -> bool {
        self.account_type == "Bot"
    }
}

#[derive(Debug, Clone, Deserialize)]
/// Collaborator permission record from the permission-level endpoint.
pub struct PermissionLevel {
    pub permission: String,
}

impl PermissionLevel {
    /// True for permissions that allow pushing to the repository.
    pub fn grants_write(&self) -> bool {
        matches!(self.permission.as_str(), "admin" | "write")
    }
}

#[derive(Debug, Clone, Deserialize)]
/// Response from creating or updating an issue comment.
pub struct CommentResponse {
    pub id: u64,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// Subset of `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
pub struct CompareCommitsResponse {
    pub total_commits: u64,
}

impl CompareCommitsResponse {
    pub fn has_commits(&self) -> bool {
        self.total_commits > 0
    }
}

#[cfg(test)]
mod tests {
    use super::{CompareCommitsResponse, GithubUserAccount, PermissionLevel};

    #[test]
    fn unit_permission_level_grants_write_for_admin_and_write_only() {
        for (permission, expected) in [
            ("admin", true),
            ("write", true),
            ("read", false),
            ("none", false),
            ("maintain", false),
        ] {
            let level = PermissionLevel {
                permission: permission.to_string(),
            };
            assert_eq!(level.grants_write(), expected, "permission {permission}");
        }
    }

    #[test]
    fn unit_github_user_account_type_deserializes_from_reserved_key() {
        let account: GithubUserAccount =
            serde_json::from_str(r#"{"login":"dependabot[bot]","type":"Bot"}"#).expect("account");
        assert!(account.is_bot());
        assert!(!account.is_user());
    }

    #[test]
    fn unit_compare_commits_reports_empty_ranges() {
        let empty = CompareCommitsResponse { total_commits: 0 };
        assert!(!empty.has_commits());
        let ahead = CompareCommitsResponse { total_commits: 3 };
        assert!(ahead.has_commits());
    }
}
