use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::inputs::TriggerInputs;

#[derive(Debug, Error)]
/// Enumerates payload parsing errors for inbound GitHub events.
pub enum EventParseError {
    #[error("invalid repository '{raw}', expected owner/repo")]
    InvalidRepository { raw: String },
    #[error("malformed '{event}' payload: {source}")]
    MalformedPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{event}' payload is missing an assignee login")]
    MissingAssignee { event: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Repository coordinates parsed from `owner/repo`.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self, EventParseError> {
        let trimmed = raw.trim();
        let Some((owner, name)) = trimmed.split_once('/') else {
            return Err(EventParseError::InvalidRepository {
                raw: raw.to_string(),
            });
        };
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(EventParseError::InvalidRepository {
                raw: raw.to_string(),
            });
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct WebhookUser {
    login: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WebhookIssue {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    assignee: Option<WebhookUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct WebhookComment {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WebhookPullRequest {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WebhookReview {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct IssuesEnvelope {
    #[serde(default)]
    action: Option<String>,
    issue: WebhookIssue,
    #[serde(default)]
    assignee: Option<WebhookUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct IssueCommentEnvelope {
    issue: WebhookIssue,
    comment: WebhookComment,
}

#[derive(Debug, Clone, Deserialize)]
struct PullRequestEnvelope {
    #[serde(default)]
    action: Option<String>,
    pull_request: WebhookPullRequest,
}

#[derive(Debug, Clone, Deserialize)]
struct PullRequestReviewEnvelope {
    #[serde(default)]
    action: Option<String>,
    pull_request: WebhookPullRequest,
    review: WebhookReview,
}

#[derive(Debug, Clone, Deserialize)]
struct ReviewCommentEnvelope {
    pull_request: WebhookPullRequest,
    comment: WebhookComment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One supported triggering event shape, with the text fields the trigger
/// detector inspects and the issue/PR number used for comment reporting.
pub enum GithubEvent {
    IssueOpened {
        number: u64,
        title: String,
        body: String,
    },
    IssueAssigned {
        number: u64,
        assignee: String,
    },
    IssueComment {
        number: u64,
        body: String,
    },
    PullRequest {
        number: u64,
        action: String,
        title: String,
        body: String,
    },
    PullRequestReview {
        number: u64,
        action: String,
        body: String,
    },
    PullRequestReviewComment {
        number: u64,
        body: String,
    },
    Unsupported {
        event_name: String,
    },
}

impl GithubEvent {
    /// Issue or pull-request number targeted by comment reporting.
    pub fn issue_number(&self) -> Option<u64> {
        match self {
            Self::IssueOpened { number, .. }
            | Self::IssueAssigned { number, .. }
            | Self::IssueComment { number, .. }
            | Self::PullRequest { number, .. }
            | Self::PullRequestReview { number, .. }
            | Self::PullRequestReviewComment { number, .. } => Some(*number),
            Self::Unsupported { .. } => None,
        }
    }

    /// Short label used in logs and prompt headers.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::IssueOpened { .. } => "issue-opened",
            Self::IssueAssigned { .. } => "issue-assigned",
            Self::IssueComment { .. } => "issue-comment",
            Self::PullRequest { .. } => "pull-request",
            Self::PullRequestReview { .. } => "pull-request-review",
            Self::PullRequestReviewComment { .. } => "pull-request-review-comment",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

fn malformed(event: &str, source: serde_json::Error) -> EventParseError {
    EventParseError::MalformedPayload {
        event: event.to_string(),
        source,
    }
}

/// Parse the webhook payload for `event_name` into a [`GithubEvent`].
///
/// Event names outside the supported set map to `Unsupported` rather than an
/// error so the runtime can log and exit cleanly.
pub fn parse_github_event(event_name: &str, payload: &Value) -> Result<GithubEvent, EventParseError> {
    match event_name {
        "issues" => {
            let envelope: IssuesEnvelope =
                serde_json::from_value(payload.clone()).map_err(|err| malformed(event_name, err))?;
            match envelope.action.as_deref() {
                Some("assigned") => {
                    let assignee = envelope
                        .assignee
                        .or(envelope.issue.assignee)
                        .map(|user| user.login)
                        .ok_or_else(|| EventParseError::MissingAssignee {
                            event: event_name.to_string(),
                        })?;
                    Ok(GithubEvent::IssueAssigned {
                        number: envelope.issue.number,
                        assignee,
                    })
                }
                Some("opened") => Ok(GithubEvent::IssueOpened {
                    number: envelope.issue.number,
                    title: envelope.issue.title.unwrap_or_default(),
                    body: envelope.issue.body.unwrap_or_default(),
                }),
                _ => Ok(GithubEvent::Unsupported {
                    event_name: event_name.to_string(),
                }),
            }
        }
        "issue_comment" => {
            let envelope: IssueCommentEnvelope =
                serde_json::from_value(payload.clone()).map_err(|err| malformed(event_name, err))?;
            Ok(GithubEvent::IssueComment {
                number: envelope.issue.number,
                body: envelope.comment.body.unwrap_or_default(),
            })
        }
        "pull_request" => {
            let envelope: PullRequestEnvelope =
                serde_json::from_value(payload.clone()).map_err(|err| malformed(event_name, err))?;
            Ok(GithubEvent::PullRequest {
                number: envelope.pull_request.number,
                action: envelope.action.unwrap_or_default(),
                title: envelope.pull_request.title.unwrap_or_default(),
                body: envelope.pull_request.body.unwrap_or_default(),
            })
        }
        "pull_request_review" => {
            let envelope: PullRequestReviewEnvelope =
                serde_json::from_value(payload.clone()).map_err(|err| malformed(event_name, err))?;
            Ok(GithubEvent::PullRequestReview {
                number: envelope.pull_request.number,
                action: envelope.action.unwrap_or_default(),
                body: envelope.review.body.unwrap_or_default(),
            })
        }
        "pull_request_review_comment" => {
            let envelope: ReviewCommentEnvelope =
                serde_json::from_value(payload.clone()).map_err(|err| malformed(event_name, err))?;
            Ok(GithubEvent::PullRequestReviewComment {
                number: envelope.pull_request.number,
                body: envelope.comment.body.unwrap_or_default(),
            })
        }
        other => Ok(GithubEvent::Unsupported {
            event_name: other.to_string(),
        }),
    }
}

#[derive(Debug, Clone)]
/// Immutable snapshot of one triggering invocation.
pub struct EventContext {
    pub repo: RepoRef,
    pub actor: String,
    pub event: GithubEvent,
    pub inputs: TriggerInputs,
}

#[cfg(test)]
mod tests {
    use super::{parse_github_event, GithubEvent, RepoRef};
    use serde_json::json;

    #[test]
    fn unit_repo_ref_parse_accepts_owner_repo_shape() {
        let repo = RepoRef::parse("acme/widgets").expect("parse repo");
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
        assert_eq!(repo.as_slug(), "acme/widgets");

        let error = RepoRef::parse("missing").expect_err("invalid repo should fail");
        assert!(error.to_string().contains("expected owner/repo"));
        assert!(RepoRef::parse("a/b/c").is_err());
        assert!(RepoRef::parse("/repo").is_err());
    }

    #[test]
    fn functional_parse_github_event_maps_issue_opened_fields() {
        let payload = json!({
            "action": "opened",
            "issue": { "number": 7, "title": "Crash on load", "body": "@claude help" }
        });
        let event = parse_github_event("issues", &payload).expect("parse event");
        assert_eq!(
            event,
            GithubEvent::IssueOpened {
                number: 7,
                title: "Crash on load".to_string(),
                body: "@claude help".to_string(),
            }
        );
    }

    #[test]
    fn functional_parse_github_event_prefers_top_level_assignee() {
        let payload = json!({
            "action": "assigned",
            "issue": { "number": 9, "assignee": { "login": "fallback" } },
            "assignee": { "login": "primary" }
        });
        let event = parse_github_event("issues", &payload).expect("parse event");
        assert_eq!(
            event,
            GithubEvent::IssueAssigned {
                number: 9,
                assignee: "primary".to_string(),
            }
        );
    }

    #[test]
    fn functional_parse_github_event_reads_review_action_and_body() {
        let payload = json!({
            "action": "submitted",
            "pull_request": { "number": 12 },
            "review": { "body": "@claude please take a look" }
        });
        let event = parse_github_event("pull_request_review", &payload).expect("parse event");
        assert_eq!(
            event,
            GithubEvent::PullRequestReview {
                number: 12,
                action: "submitted".to_string(),
                body: "@claude please take a look".to_string(),
            }
        );
    }

    #[test]
    fn integration_parse_github_event_treats_unknown_names_as_unsupported() {
        let event = parse_github_event("workflow_dispatch", &json!({})).expect("parse event");
        assert_eq!(
            event,
            GithubEvent::Unsupported {
                event_name: "workflow_dispatch".to_string(),
            }
        );
        assert_eq!(event.issue_number(), None);
    }

    #[test]
    fn regression_parse_github_event_ignores_unhandled_issue_actions() {
        let payload = json!({
            "action": "closed",
            "issue": { "number": 7, "title": "Done", "body": "@claude thanks" }
        });
        let event = parse_github_event("issues", &payload).expect("parse event");
        assert_eq!(
            event,
            GithubEvent::Unsupported {
                event_name: "issues".to_string(),
            }
        );
    }

    #[test]
    fn regression_parse_github_event_tolerates_null_bodies() {
        let payload = json!({
            "issue": { "number": 3, "body": null },
            "comment": { "body": null }
        });
        let event = parse_github_event("issue_comment", &payload).expect("parse event");
        assert_eq!(
            event,
            GithubEvent::IssueComment {
                number: 3,
                body: String::new(),
            }
        );
    }
}
