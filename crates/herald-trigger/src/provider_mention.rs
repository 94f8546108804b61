use std::sync::OnceLock;

use regex::Regex;

/// AI providers Herald can hand a run to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Claude,
    Augment,
}

impl AiProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Augment => "augment",
        }
    }

    pub fn mention_token(self) -> &'static str {
        match self {
            Self::Claude => "@claude",
            Self::Augment => "@augment",
        }
    }
}

// A mention counts only as a whole token: preceded by start-of-text or
// whitespace, followed by end-of-text or whitespace/sentence punctuation.
// Matching is case-sensitive.
fn word_bounded_pattern(escaped_literal: &str) -> String {
    format!(r"(?:^|\s){escaped_literal}(?:[\s.,!?;:]|$)")
}

/// Compile a word-bounded matcher for a literal trigger phrase.
///
/// The phrase is escaped first, so regex metacharacters in configured
/// phrases match only themselves.
pub fn trigger_phrase_regex(phrase: &str) -> Regex {
    Regex::new(&word_bounded_pattern(&regex::escape(phrase)))
        .expect("escaped literal always compiles")
}

fn claude_mention() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| trigger_phrase_regex(AiProvider::Claude.mention_token()))
}

fn augment_mention() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| trigger_phrase_regex(AiProvider::Augment.mention_token()))
}

/// Scan text for a provider mention token.
///
/// `@augment` is tested first and wins whenever both tokens are present,
/// regardless of their positions in the text.
pub fn detect_ai_provider(text: &str) -> Option<AiProvider> {
    if augment_mention().is_match(text) {
        return Some(AiProvider::Augment);
    }
    if claude_mention().is_match(text) {
        return Some(AiProvider::Claude);
    }
    None
}
