use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use herald_access::{check_allowed_actor, check_write_permissions};
use herald_core::{EventContext, GithubEvent};
use herald_dispatch::{
    invoke, resolve_invocation, DispatchSettings, InstallStep, InvocationOutcome, ToolId,
};
use herald_github::render::{
    render_run_failure_comment, render_run_started_comment, render_run_success_comment,
};
use herald_github::GithubApiClient;
use herald_trigger::{detect_trigger, AiProvider};

use crate::cli_args::Cli;
use crate::event_loader::{load_event_context, ActionEnvironment};

const COMMENT_OUTPUT_TAIL_CHARS: usize = 2_000;

/// Run the full gateway pipeline for the current Actions invocation.
pub async fn run(cli: Cli) -> Result<()> {
    let environment = ActionEnvironment::from_env()?;
    run_with_environment(cli, environment).await
}

pub(crate) async fn run_with_environment(cli: Cli, environment: ActionEnvironment) -> Result<()> {
    let context = load_event_context(&environment, cli.trigger_inputs())?;

    let trigger = detect_trigger(&context);
    let Some(provider) = trigger.provider else {
        info!(
            event = context.event.kind_label(),
            "no trigger detected, nothing to do"
        );
        return Ok(());
    };
    info!(
        provider = provider.as_str(),
        event = context.event.kind_label(),
        actor = %context.actor,
        "trigger detected"
    );

    let client = GithubApiClient::new(
        cli.github_api_url.clone(),
        cli.github_token.clone(),
        context.repo.clone(),
        cli.github_request_timeout_ms,
        cli.github_retry_max_attempts,
        cli.github_retry_base_delay_ms,
    )?;

    let allowed_bots = &context.inputs.allowed_bot_names;
    check_allowed_actor(&client, &context.actor, allowed_bots).await?;
    if !check_write_permissions(&client, &context.actor, allowed_bots).await? {
        bail!(
            "actor '{}' does not have write access to {}",
            context.actor,
            context.repo.as_slug()
        );
    }

    let tool = effective_tool(provider, &cli.cli_tool)?;
    let tracking_comment = post_tracking_comment(&client, &context, tool).await;

    let result = dispatch_tool(&cli, &context, tool).await;
    report_outcome(&client, tracking_comment, tool, &result).await;
    cleanup_working_branch(&client, &cli).await;

    match result {
        Ok(outcome) if outcome.conclusion.is_success() => Ok(()),
        Ok(outcome) => bail!(
            "cli tool '{}' exited with status {}",
            tool.identifier(),
            exit_label(&outcome)
        ),
        Err(error) => Err(error),
    }
}

// An @augment mention forces the matching tool; otherwise the configured
// identifier decides, claude-cli by default.
fn effective_tool(provider: AiProvider, configured: &str) -> Result<ToolId> {
    let tool = match provider {
        AiProvider::Augment => ToolId::AugmentCli,
        AiProvider::Claude => ToolId::parse(configured)?,
    };
    Ok(tool)
}

fn build_prompt(context: &EventContext) -> String {
    let direct = context.inputs.direct_prompt.trim();
    if !direct.is_empty() {
        return direct.to_string();
    }
    match &context.event {
        GithubEvent::IssueOpened { title, body, .. }
        | GithubEvent::PullRequest { title, body, .. } => {
            if body.trim().is_empty() {
                title.clone()
            } else {
                format!("{title}\n\n{body}")
            }
        }
        GithubEvent::IssueAssigned { number, .. } => format!(
            "You were assigned issue #{number} in {}.",
            context.repo.as_slug()
        ),
        GithubEvent::IssueComment { body, .. }
        | GithubEvent::PullRequestReview { body, .. }
        | GithubEvent::PullRequestReviewComment { body, .. } => body.clone(),
        GithubEvent::Unsupported { .. } => String::new(),
    }
}

fn runner_temp_dir() -> PathBuf {
    std::env::var_os("RUNNER_TEMP")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

fn parse_install_step(raw: &str) -> Result<Option<InstallStep>> {
    let mut words =
        shell_words::split(raw).context("failed to parse install command")?;
    if words.is_empty() {
        return Ok(None);
    }
    let command = words.remove(0);
    Ok(Some(InstallStep {
        command,
        args: words,
    }))
}

async fn dispatch_tool(
    cli: &Cli,
    context: &EventContext,
    tool: ToolId,
) -> Result<InvocationOutcome> {
    let run_dir = runner_temp_dir().join(format!("herald-{}", std::process::id()));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create run dir {}", run_dir.display()))?;
    let prompt_file = run_dir.join("prompt.txt");
    std::fs::write(&prompt_file, build_prompt(context)).with_context(|| {
        format!("failed to write prompt file {}", prompt_file.display())
    })?;

    let settings = DispatchSettings {
        prompt_file,
        output_file: run_dir.join("herald-output.json"),
        allowed_tools: context.inputs.allowed_tools.clone(),
        disallowed_tools: context.inputs.disallowed_tools.clone(),
        max_turns: cli.max_turns,
        model: cli.model.clone(),
        mcp_config: cli.mcp_config.clone(),
        api_key: cli.api_key.clone(),
        use_bedrock: cli.use_bedrock,
        use_vertex: cli.use_vertex,
        timeout: Duration::from_secs(cli.timeout_minutes.saturating_mul(60)),
        extra_args: shell_words::split(&cli.tool_args).context("failed to parse tool args")?,
        extra_env: Vec::new(),
        install: parse_install_step(&cli.install_command)?,
    };
    let config = resolve_invocation(tool, &settings);
    info!(tool = tool.identifier(), command = %config.command, "dispatching tool");
    Ok(invoke(&config).await?)
}

async fn post_tracking_comment(
    client: &GithubApiClient,
    context: &EventContext,
    tool: ToolId,
) -> Option<u64> {
    let number = context.event.issue_number()?;
    let body = render_run_started_comment(&context.actor, tool.identifier());
    match client.create_issue_comment(number, &body).await {
        Ok(comment) => {
            info!(comment_id = comment.id, "posted tracking comment");
            Some(comment.id)
        }
        Err(error) => {
            warn!(
                error = %format!("{error:#}"),
                "failed to post tracking comment"
            );
            None
        }
    }
}

fn exit_label(outcome: &InvocationOutcome) -> String {
    outcome
        .exit_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

fn output_tail(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= COMMENT_OUTPUT_TAIL_CHARS {
        return text.to_string();
    }
    chars[chars.len() - COMMENT_OUTPUT_TAIL_CHARS..]
        .iter()
        .collect()
}

fn failure_detail(outcome: &InvocationOutcome) -> String {
    let stderr = outcome.stderr.trim();
    if !stderr.is_empty() {
        return output_tail(stderr);
    }
    let stdout = outcome.stdout.trim();
    if !stdout.is_empty() {
        return output_tail(stdout);
    }
    "no output captured".to_string()
}

// Reporting is best-effort: a comment-update failure is logged, never
// allowed to mask the run's own result.
async fn report_outcome(
    client: &GithubApiClient,
    tracking_comment: Option<u64>,
    tool: ToolId,
    result: &Result<InvocationOutcome>,
) {
    let Some(comment_id) = tracking_comment else {
        return;
    };
    let body = match result {
        Ok(outcome) if outcome.conclusion.is_success() => {
            render_run_success_comment(tool.identifier(), &output_tail(&outcome.stdout))
        }
        Ok(outcome) => render_run_failure_comment(
            tool.identifier(),
            &exit_label(outcome),
            &failure_detail(outcome),
        ),
        Err(error) => {
            render_run_failure_comment(tool.identifier(), "error", &format!("{error:#}"))
        }
    };
    if let Err(error) = client.update_issue_comment(comment_id, &body).await {
        warn!(
            error = %format!("{error:#}"),
            "failed to update tracking comment"
        );
    }
}

// Housekeeping: drop the working branch when the run left it empty.
// Best-effort on both calls.
async fn cleanup_working_branch(client: &GithubApiClient, cli: &Cli) {
    let Some(branch) = cli
        .working_branch
        .as_deref()
        .map(str::trim)
        .filter(|branch| !branch.is_empty())
    else {
        return;
    };
    match client.compare_commits(&cli.base_branch, branch).await {
        Ok(range) if !range.has_commits() => match client.delete_branch_ref(branch).await {
            Ok(()) => info!(branch, "deleted empty working branch"),
            Err(error) => warn!(
                branch,
                error = %format!("{error:#}"),
                "failed to delete working branch"
            ),
        },
        Ok(_) => {}
        Err(error) => warn!(
            branch,
            error = %format!("{error:#}"),
            "failed to compare working branch"
        ),
    }
}
