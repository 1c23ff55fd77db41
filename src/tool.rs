//! Shared plumbing for invoking external command-line tools.
//!
//! Every hardware interaction in this crate goes through a child process
//! (`ddcutil`, `nmcli`, `bluetoothctl`), so the success/failure handling is
//! centralized here: [`run_capture`] for request/response invocations and
//! [`spawn_detached`] for fire-and-forget launchers.

use log::debug;
use std::process::{Command, ExitStatus, Stdio};

/// Errors from running an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The process could not be started at all (missing binary, permissions).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited non-zero; `stderr` carries its diagnostic
    /// output.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The process succeeded but printed something unexpected.
    #[error("unexpected output from {program}: {detail}")]
    Parse { program: String, detail: String },
}

/// Run `program` with `args` to completion and return its stdout.
///
/// A non-zero exit becomes [`ToolError::Failed`] with the trimmed stderr as
/// the diagnostic. Stdout is decoded lossily; the tools spoken to here emit
/// plain ASCII.
pub fn run_capture(program: &str, args: &[&str]) -> Result<String, ToolError> {
    debug!("running {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ToolError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Spawn a whitespace-split command line and do not wait for it.
///
/// Used for settings launchers (`cinnamon-settings network`,
/// `blueman-manager`): the child owns its own lifetime and its output is
/// discarded.
pub fn spawn_detached(command_line: &str) -> Result<(), ToolError> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or_else(|| ToolError::Parse {
        program: String::new(),
        detail: "empty command line".into(),
    })?;

    Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| ToolError::Spawn {
            program: program.to_string(),
            source: e,
        })
}
