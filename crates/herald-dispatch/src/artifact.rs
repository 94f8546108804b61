use std::io;
use std::path::Path;

use serde_json::json;

/// Write the minimal result artifact recording a completed invocation.
pub fn synthesize_result_artifact(
    path: &Path,
    command: &str,
    exit_code: Option<i32>,
    status: &str,
) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let artifact = json!({
        "type": "synthetic_completion",
        "status": status,
        "exit_code": exit_code,
        "command": command,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    std::fs::write(path, serde_json::to_vec_pretty(&artifact)?)
}

/// Synthesize the artifact only when the tool left none behind.
///
/// Returns true when a synthetic artifact was written.
pub fn ensure_result_artifact(
    path: &Path,
    command: &str,
    exit_code: Option<i32>,
    status: &str,
) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    synthesize_result_artifact(path, command, exit_code, status)?;
    Ok(true)
}
