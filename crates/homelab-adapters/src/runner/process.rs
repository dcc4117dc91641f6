//! Subprocess execution via `std::process`.
//!
//! Commands run without a shell, with stdout and stderr captured. There is
//! no timeout: a command that hangs blocks the run until it exits. On unix
//! each child gets its own process group so terminal signals are left to
//! the CLI's cancellation handling.

use std::process::{Command, Stdio};
use std::time::Instant;

use homelab_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandRunner, CommandSpec},
    },
    error::HomelabResult,
};
use tracing::debug;

/// Production runner that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> HomelabResult<CommandOutput> {
        // Log command execution, but redact args for sensitive commands
        if spec.is_sensitive() {
            debug!(program = %spec.program(), args = "[REDACTED]", "Executing subprocess (sensitive)");
        } else {
            debug!(program = %spec.program(), args = ?spec.get_args(), "Executing subprocess");
        }

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in spec.get_env() {
            cmd.env(key, value);
        }
        // Own process group: a terminal Ctrl-C reaches only the CLI, and the
        // in-flight command runs to completion.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt as _;
            cmd.process_group(0);
        }

        let start = Instant::now();
        let output = cmd.output().map_err(|e| ApplicationError::CommandFailed {
            command: spec.to_string(),
            reason: format!("Failed to spawn {}: {}", spec.program(), e),
        })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            exit_code = ?result.exit_code,
            duration_ms = start.elapsed().as_millis(),
            "Subprocess completed"
        );
        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_exit_code() {
        let output = ProcessRunner::new()
            .run(&CommandSpec::new("sh").args(["-c", "echo hello; exit 3"]))
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "hello");
        assert!(!output.is_success());
    }

    #[test]
    fn captures_stderr() {
        let output = ProcessRunner::new()
            .run(&CommandSpec::new("sh").args(["-c", "echo oops >&2; exit 1"]))
            .unwrap();

        assert_eq!(output.failure_reason(), "oops");
    }

    #[test]
    fn passes_environment() {
        let output = ProcessRunner::new()
            .run(
                &CommandSpec::new("sh")
                    .args(["-c", "printf %s \"$HOMELAB_TEST\""])
                    .env("HOMELAB_TEST", "value"),
            )
            .unwrap();

        assert_eq!(output.stdout, "value");
    }

    #[test]
    fn missing_program_is_an_error() {
        let err = ProcessRunner::new()
            .run(&CommandSpec::new("definitely-not-a-real-binary-xyz"))
            .unwrap_err();

        assert!(err.to_string().contains("Failed to spawn"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn child_leads_its_own_process_group() {
        // Field 5 of /proc/<pid>/stat is the process group id.
        let output = ProcessRunner::new()
            .run(&CommandSpec::new("sh").args(["-c", "echo $$; cut -d' ' -f5 /proc/$$/stat"]))
            .unwrap();

        let ids: Vec<&str> = output.stdout.lines().collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
    }
}
