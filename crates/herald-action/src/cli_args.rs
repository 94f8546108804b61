use clap::{ArgAction, Parser};

use herald_core::{split_list_input, TriggerInputs};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "herald-action",
    about = "GitHub Actions gateway that dispatches AI CLI tools on assistant mentions",
    version
)]
/// Resolved action inputs; every option is env-backed so the workflow can
/// map `with:` inputs straight onto environment variables.
pub struct Cli {
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "Token used for user lookup, permission checks, and comment updates."
    )]
    pub github_token: String,

    #[arg(
        long,
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com",
        help = "GitHub REST base URL; the runner provides this for GHES."
    )]
    pub github_api_url: String,

    #[arg(
        long,
        env = "TRIGGER_PHRASE",
        default_value = "@claude",
        help = "Literal phrase that triggers a run when mentioned as a standalone token."
    )]
    pub trigger_phrase: String,

    #[arg(
        long,
        env = "ASSIGNEE_TRIGGER",
        default_value = "",
        help = "Username whose issue assignment triggers a run; leading @ is ignored."
    )]
    pub assignee_trigger: String,

    #[arg(
        long,
        env = "DIRECT_PROMPT",
        default_value = "",
        help = "Prompt that bypasses trigger detection entirely when non-empty."
    )]
    pub direct_prompt: String,

    #[arg(
        long,
        env = "ALLOWED_BOT_NAMES",
        default_value = "",
        help = "Comma/newline separated bot logins allowed to trigger runs."
    )]
    pub allowed_bot_names: String,

    #[arg(long, env = "ALLOWED_TOOLS", default_value = "")]
    pub allowed_tools: String,

    #[arg(long, env = "DISALLOWED_TOOLS", default_value = "")]
    pub disallowed_tools: String,

    #[arg(
        long,
        env = "CLI_TOOL",
        default_value = "claude-cli",
        help = "AI CLI tool identifier: claude-cli, gemini-cli, codex-cli, or augment-cli."
    )]
    pub cli_tool: String,

    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "MAX_TURNS")]
    pub max_turns: Option<u32>,

    #[arg(
        long,
        env = "TIMEOUT_MINUTES",
        default_value_t = 30,
        value_parser = parse_positive_u64,
        help = "Spawn-level timeout applied to the tool subprocess."
    )]
    pub timeout_minutes: u64,

    #[arg(long, env = "MCP_CONFIG")]
    pub mcp_config: Option<String>,

    #[arg(long, env = "USE_BEDROCK", action = ArgAction::SetTrue)]
    pub use_bedrock: bool,

    #[arg(long, env = "USE_VERTEX", action = ArgAction::SetTrue)]
    pub use_vertex: bool,

    #[arg(
        long,
        env = "TOOL_ARGS",
        default_value = "",
        help = "Extra arguments appended to the tool command line, shell-quoted."
    )]
    pub tool_args: String,

    #[arg(
        long,
        env = "INSTALL_COMMAND",
        default_value = "",
        help = "Optional install command run before the tool, shell-quoted; non-zero exit aborts the run."
    )]
    pub install_command: String,

    #[arg(
        long,
        env = "WORKING_BRANCH",
        help = "Branch the run works on; deleted afterwards when it carries no commits."
    )]
    pub working_branch: Option<String>,

    #[arg(long, env = "BASE_BRANCH", default_value = "main")]
    pub base_branch: String,

    #[arg(long, env = "GITHUB_REQUEST_TIMEOUT_MS", default_value_t = 30_000, value_parser = parse_positive_u64)]
    pub github_request_timeout_ms: u64,

    #[arg(long, env = "GITHUB_RETRY_MAX_ATTEMPTS", default_value_t = 3)]
    pub github_retry_max_attempts: usize,

    #[arg(long, env = "GITHUB_RETRY_BASE_DELAY_MS", default_value_t = 500, value_parser = parse_positive_u64)]
    pub github_retry_base_delay_ms: u64,
}

impl Cli {
    pub fn trigger_inputs(&self) -> TriggerInputs {
        TriggerInputs {
            trigger_phrase: self.trigger_phrase.clone(),
            assignee_trigger: self.assignee_trigger.clone(),
            direct_prompt: self.direct_prompt.clone(),
            allowed_bot_names: split_list_input(&self.allowed_bot_names),
            allowed_tools: self.allowed_tools.clone(),
            disallowed_tools: self.disallowed_tools.clone(),
        }
    }
}
