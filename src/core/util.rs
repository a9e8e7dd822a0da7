//! Common utilities

use std::process::Command;

use crate::core::error::{Result, WorkflowError};

/// Check if a command is available in PATH
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run a program and return its stdout as lines, without the trailing empty line
pub fn run_lines(program: &str, args: &[&str]) -> Result<Vec<String>> {
    if !command_exists(program) {
        return Err(WorkflowError::CommandNotFound(program.to_string()));
    }

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| WorkflowError::io(program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            program,
            status = %output.status,
            stderr = %stderr.trim(),
            "command exited with an error"
        );
    }

    Ok(split_lines(&String::from_utf8_lossy(&output.stdout)))
}

/// Split command output into lines, dropping empty ones
pub fn split_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
