use herald_core::{strip_leading_at, EventContext, GithubEvent, TriggerInputs};

use crate::provider_mention::{detect_ai_provider, trigger_phrase_regex, AiProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of trigger detection for one event.
pub struct TriggerResult {
    pub contains_trigger: bool,
    pub provider: Option<AiProvider>,
}

impl TriggerResult {
    pub fn triggered(provider: AiProvider) -> Self {
        Self {
            contains_trigger: true,
            provider: Some(provider),
        }
    }

    pub fn none() -> Self {
        Self {
            contains_trigger: false,
            provider: None,
        }
    }
}

// Fields are scanned in priority order (body before title). A provider
// mention anywhere beats the fallback trigger phrase in any field.
fn scan_fields(fields: &[&str], inputs: &TriggerInputs) -> TriggerResult {
    for text in fields {
        if let Some(provider) = detect_ai_provider(text) {
            return TriggerResult::triggered(provider);
        }
    }
    let phrase = inputs.trigger_phrase.trim();
    if !phrase.is_empty() {
        let matcher = trigger_phrase_regex(phrase);
        for text in fields {
            if matcher.is_match(text) {
                return TriggerResult::triggered(AiProvider::Claude);
            }
        }
    }
    TriggerResult::none()
}

/// Decide whether `context` should start a run and for which provider.
///
/// A non-empty direct prompt short-circuits every other rule. Issue
/// assignment triggers when the assignee matches the configured login.
/// Everything else is text scanning over the event's body/title fields.
pub fn detect_trigger(context: &EventContext) -> TriggerResult {
    let inputs = &context.inputs;
    if !inputs.direct_prompt.trim().is_empty() {
        return TriggerResult::triggered(AiProvider::Claude);
    }

    match &context.event {
        GithubEvent::IssueAssigned { assignee, .. } => {
            let expected = strip_leading_at(inputs.assignee_trigger.trim());
            if !expected.is_empty() && assignee == expected {
                TriggerResult::triggered(AiProvider::Claude)
            } else {
                TriggerResult::none()
            }
        }
        GithubEvent::IssueOpened { title, body, .. } => scan_fields(&[body, title], inputs),
        GithubEvent::PullRequest { title, body, .. } => scan_fields(&[body, title], inputs),
        GithubEvent::PullRequestReview { action, body, .. } => {
            if action == "submitted" || action == "edited" {
                scan_fields(&[body], inputs)
            } else {
                TriggerResult::none()
            }
        }
        GithubEvent::IssueComment { body, .. }
        | GithubEvent::PullRequestReviewComment { body, .. } => scan_fields(&[body], inputs),
        GithubEvent::Unsupported { .. } => TriggerResult::none(),
    }
}
