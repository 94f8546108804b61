use thiserror::Error;

#[derive(Debug, Error)]
/// Enumerates configuration errors raised while resolving action inputs.
pub enum InputError {
    #[error("missing required configuration value '{name}'")]
    MissingConfiguration { name: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Trigger and authorization inputs resolved once at process start.
///
/// Components receive this struct by reference instead of reading the
/// process environment, so every check is testable with literal values.
pub struct TriggerInputs {
    pub trigger_phrase: String,
    pub assignee_trigger: String,
    pub direct_prompt: String,
    pub allowed_bot_names: Vec<String>,
    pub allowed_tools: String,
    pub disallowed_tools: String,
}

impl TriggerInputs {
    pub fn is_bot_allowed(&self, login: &str) -> bool {
        self.allowed_bot_names.iter().any(|name| name == login)
    }
}

/// Split a comma/newline separated option value into trimmed entries.
pub fn split_list_input(raw: &str) -> Vec<String> {
    raw.split(|ch| ch == ',' || ch == '\n')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Strip a single leading `@` from a login-like option value.
pub fn strip_leading_at(raw: &str) -> &str {
    raw.strip_prefix('@').unwrap_or(raw)
}
