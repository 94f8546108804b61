//! Trigger detection for the Herald gateway.
//!
//! Decides whether an inbound GitHub event should start a run, and which AI
//! provider was addressed. Detection is pure string/regex work over the
//! event context; no I/O happens here.

pub mod provider_mention;
pub mod trigger_detection;

pub use provider_mention::{detect_ai_provider, trigger_phrase_regex, AiProvider};
pub use trigger_detection::{detect_trigger, TriggerResult};
