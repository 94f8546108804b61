use crate::invocation::DispatchError;

/// Closed set of AI CLI tools Herald can dispatch.
///
/// The set is fixed so every variant's command table is checked exhaustively
/// at compile time; adding a tool means adding a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolId {
    ClaudeCli,
    GeminiCli,
    CodexCli,
    AugmentCli,
}

impl ToolId {
    pub const ALL: [ToolId; 4] = [
        ToolId::ClaudeCli,
        ToolId::GeminiCli,
        ToolId::CodexCli,
        ToolId::AugmentCli,
    ];

    /// Stable identifier used in configuration and diagnostics.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::ClaudeCli => "claude-cli",
            Self::GeminiCli => "gemini-cli",
            Self::CodexCli => "codex-cli",
            Self::AugmentCli => "augment-cli",
        }
    }

    /// External command the tool resolves to.
    pub fn command(self) -> &'static str {
        match self {
            Self::ClaudeCli => "claude",
            Self::GeminiCli => "gemini",
            Self::CodexCli => "codex",
            Self::AugmentCli => "auggie",
        }
    }

    /// Environment variable carrying the tool's API credential.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::ClaudeCli => "ANTHROPIC_API_KEY",
            Self::GeminiCli => "GEMINI_API_KEY",
            Self::CodexCli => "OPENAI_API_KEY",
            Self::AugmentCli => "AUGMENT_SESSION_AUTH",
        }
    }

    pub fn supported_identifiers() -> Vec<String> {
        Self::ALL
            .iter()
            .map(|tool| tool.identifier().to_string())
            .collect()
    }

    pub fn parse(raw: &str) -> Result<Self, DispatchError> {
        let trimmed = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|tool| tool.identifier() == trimmed)
            .ok_or_else(|| DispatchError::UnsupportedTool {
                requested: raw.to_string(),
                supported: Self::supported_identifiers(),
            })
    }
}
