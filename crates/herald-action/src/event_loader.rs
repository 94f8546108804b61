use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use herald_core::{parse_github_event, EventContext, InputError, RepoRef, TriggerInputs};

/// Runner-provided coordinates of the triggering event.
#[derive(Debug, Clone)]
pub struct ActionEnvironment {
    pub event_name: String,
    pub event_path: PathBuf,
    pub repository: String,
    pub actor: String,
}

impl ActionEnvironment {
    /// Resolve from a variable lookup; missing or empty values fail with the
    /// variable's name.
    pub fn from_vars<F>(lookup: F) -> Result<Self, InputError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn required<F>(lookup: &F, name: &'static str) -> Result<String, InputError>
        where
            F: Fn(&str) -> Option<String>,
        {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(InputError::MissingConfiguration { name })
        }

        Ok(Self {
            event_name: required(&lookup, "GITHUB_EVENT_NAME")?,
            event_path: PathBuf::from(required(&lookup, "GITHUB_EVENT_PATH")?),
            repository: required(&lookup, "GITHUB_REPOSITORY")?,
            actor: required(&lookup, "GITHUB_ACTOR")?,
        })
    }

    pub fn from_env() -> Result<Self, InputError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }
}

/// Build the immutable event context for this invocation.
pub fn load_event_context(
    environment: &ActionEnvironment,
    inputs: TriggerInputs,
) -> Result<EventContext> {
    let raw = std::fs::read_to_string(&environment.event_path).with_context(|| {
        format!(
            "failed to read event payload at {}",
            environment.event_path.display()
        )
    })?;
    let payload: Value = serde_json::from_str(&raw).context("event payload is not valid json")?;
    let repo = RepoRef::parse(&environment.repository)?;
    let event = parse_github_event(&environment.event_name, &payload)?;
    Ok(EventContext {
        repo,
        actor: environment.actor.clone(),
        event,
        inputs,
    })
}
