use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::artifact::ensure_result_artifact;
use crate::tool_id::ToolId;

const MAX_CAPTURED_OUTPUT_BYTES: usize = 1024 * 1024;
const READ_CHUNK_BYTES: usize = 8192;

#[derive(Debug, Error)]
/// Enumerates dispatch failures.
pub enum DispatchError {
    #[error("unsupported cli tool '{requested}', supported tools: {}", .supported.join(", "))]
    UnsupportedTool {
        requested: String,
        supported: Vec<String>,
    },
    #[error("install step '{command}' exited with status {status}")]
    InstallFailed { command: String, status: String },
    #[error("cli tool '{command}' failed: {message}")]
    SubprocessFailed { command: String, message: String },
    #[error("dispatch io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Optional synchronous install command run before the main invocation.
pub struct InstallStep {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// Runtime configuration interpolated into the per-tool argument template.
pub struct DispatchSettings {
    pub prompt_file: PathBuf,
    pub output_file: PathBuf,
    pub allowed_tools: String,
    pub disallowed_tools: String,
    pub max_turns: Option<u32>,
    pub model: Option<String>,
    pub mcp_config: Option<String>,
    pub api_key: Option<String>,
    pub use_bedrock: bool,
    pub use_vertex: bool,
    pub timeout: Duration,
    pub extra_args: Vec<String>,
    pub extra_env: Vec<(String, String)>,
    pub install: Option<InstallStep>,
}

#[derive(Debug, Clone)]
/// Fully resolved invocation: command, arguments, environment overlay.
///
/// Exists only for the duration of one subprocess call; the prompt is fed to
/// the tool on stdin from `prompt_file`.
pub struct ToolInvocationConfig {
    pub tool: ToolId,
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub prompt_file: PathBuf,
    pub output_file: PathBuf,
    pub timeout: Duration,
    pub install: Option<InstallStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Classification of a completed invocation.
pub enum Conclusion {
    Success,
    Failure,
}

impl Conclusion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Debug)]
/// Result of one completed subprocess run.
pub struct InvocationOutcome {
    pub output_file: PathBuf,
    pub conclusion: Conclusion,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub output_truncated: bool,
}

/// Resolve the fixed per-tool invocation table against runtime settings.
pub fn resolve_invocation(tool: ToolId, settings: &DispatchSettings) -> ToolInvocationConfig {
    let mut args: Vec<String> = Vec::new();
    let mut env: Vec<(String, String)> = Vec::new();

    match tool {
        ToolId::ClaudeCli => {
            args.extend(["-p", "--output-format", "json"].map(String::from));
            if !settings.allowed_tools.trim().is_empty() {
                args.push("--allowedTools".to_string());
                args.push(settings.allowed_tools.clone());
            }
            if !settings.disallowed_tools.trim().is_empty() {
                args.push("--disallowedTools".to_string());
                args.push(settings.disallowed_tools.clone());
            }
            if let Some(max_turns) = settings.max_turns {
                args.push("--max-turns".to_string());
                args.push(max_turns.to_string());
            }
            if let Some(model) = &settings.model {
                args.push("--model".to_string());
                args.push(model.clone());
            }
            if let Some(mcp_config) = &settings.mcp_config {
                args.push("--mcp-config".to_string());
                args.push(mcp_config.clone());
            }
            if settings.use_bedrock {
                env.push(("CLAUDE_CODE_USE_BEDROCK".to_string(), "1".to_string()));
            }
            if settings.use_vertex {
                env.push(("CLAUDE_CODE_USE_VERTEX".to_string(), "1".to_string()));
            }
        }
        ToolId::GeminiCli => {
            if let Some(model) = &settings.model {
                args.push("-m".to_string());
                args.push(model.clone());
            }
        }
        ToolId::CodexCli => {
            args.push("exec".to_string());
            if let Some(model) = &settings.model {
                args.push("-m".to_string());
                args.push(model.clone());
            }
        }
        ToolId::AugmentCli => {
            args.push("--print".to_string());
            if let Some(model) = &settings.model {
                args.push("--model".to_string());
                args.push(model.clone());
            }
        }
    }

    if let Some(api_key) = &settings.api_key {
        if !api_key.trim().is_empty() {
            env.push((tool.api_key_env().to_string(), api_key.clone()));
        }
    }
    args.extend(settings.extra_args.iter().cloned());
    env.extend(settings.extra_env.iter().cloned());

    ToolInvocationConfig {
        tool,
        command: tool.command().to_string(),
        args,
        env,
        prompt_file: settings.prompt_file.clone(),
        output_file: settings.output_file.clone(),
        timeout: settings.timeout,
        install: settings.install.clone(),
    }
}

fn exit_status_label(status: std::process::ExitStatus) -> String {
    status
        .code()
        .map(|code| code.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

async fn run_install_step(step: &InstallStep) -> Result<(), DispatchError> {
    let status = Command::new(&step.command)
        .args(&step.args)
        .kill_on_drop(true)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|error| DispatchError::InstallFailed {
            command: step.command.clone(),
            status: format!("spawn error: {error}"),
        })?;
    if !status.success() {
        return Err(DispatchError::InstallFailed {
            command: step.command.clone(),
            status: exit_status_label(status),
        });
    }
    Ok(())
}

// Reads at most `cap` bytes, then keeps draining so the child never blocks
// on a full pipe. Read errors end the capture.
async fn read_capped<R>(mut reader: R, cap: usize) -> (Vec<u8>, bool)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut captured = Vec::new();
    let mut truncated = false;
    let mut chunk = [0_u8; READ_CHUNK_BYTES];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => {
                if captured.len() < cap {
                    let take = (cap - captured.len()).min(read);
                    captured.extend_from_slice(&chunk[..take]);
                    if take < read {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
        }
    }
    (captured, truncated)
}

/// Run the resolved invocation to completion and classify the outcome.
///
/// The install step, when present, runs first and fails hard on non-zero
/// exit. The main command is bounded by the configured timeout and a hard
/// cap on captured output. Conclusion is Success iff the exit status is
/// exactly 0; a signal death is Failure. A missing output artifact is
/// synthesized afterwards so reporting always has a file to read.
pub async fn invoke(config: &ToolInvocationConfig) -> Result<InvocationOutcome, DispatchError> {
    if let Some(install) = &config.install {
        run_install_step(install).await?;
    }

    let prompt = std::fs::File::open(&config.prompt_file)?;
    let mut command = Command::new(&config.command);
    command.kill_on_drop(true);
    command.args(&config.args);
    for (name, value) in &config.env {
        command.env(name, value);
    }
    command.stdin(Stdio::from(prompt));
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .map_err(|error| DispatchError::SubprocessFailed {
            command: config.command.clone(),
            message: format!("failed to spawn: {error}"),
        })?;
    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DispatchError::SubprocessFailed {
            command: config.command.clone(),
            message: "stdout pipe unavailable".to_string(),
        })?;
    let stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DispatchError::SubprocessFailed {
            command: config.command.clone(),
            message: "stderr pipe unavailable".to_string(),
        })?;

    let stdout_capture = tokio::spawn(read_capped(stdout_pipe, MAX_CAPTURED_OUTPUT_BYTES));
    let stderr_capture = tokio::spawn(read_capped(stderr_pipe, MAX_CAPTURED_OUTPUT_BYTES));

    let status = match tokio::time::timeout(config.timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(error)) => {
            return Err(DispatchError::SubprocessFailed {
                command: config.command.clone(),
                message: format!("process wait failed: {error}"),
            });
        }
        Err(_) => {
            let _ = child.start_kill();
            return Err(DispatchError::SubprocessFailed {
                command: config.command.clone(),
                message: format!("timed out after {}s", config.timeout.as_secs()),
            });
        }
    };

    let (stdout_bytes, stdout_truncated) = stdout_capture.await.unwrap_or((Vec::new(), false));
    let (stderr_bytes, stderr_truncated) = stderr_capture.await.unwrap_or((Vec::new(), false));

    let conclusion = if status.code() == Some(0) {
        Conclusion::Success
    } else {
        Conclusion::Failure
    };
    let exit_code = status.code();

    ensure_result_artifact(
        &config.output_file,
        &config.command,
        exit_code,
        conclusion.as_str(),
    )?;

    Ok(InvocationOutcome {
        output_file: config.output_file.clone(),
        conclusion,
        exit_code,
        stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
        stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
        output_truncated: stdout_truncated || stderr_truncated,
    })
}
