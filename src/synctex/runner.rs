//! Process launching for the correspondence tool

use std::io;
use std::process::{Command, Stdio};

/// Exit status and captured standard output of one tool invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
}

impl ToolOutput {
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
        }
    }

    #[must_use]
    pub fn failure(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a program with a discrete argument vector.
///
/// Implementations must never route arguments through a shell.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ToolOutput>;
}

/// Spawns real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ToolOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockCommandRunner;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::{CommandRunner, ToolOutput};
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    enum Scripted {
        Output(ToolOutput),
        LaunchError(io::ErrorKind),
    }

    /// Replays scripted outputs and records every invocation
    #[derive(Default)]
    pub struct MockCommandRunner {
        script: Mutex<VecDeque<Scripted>>,
        invocations: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl MockCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the output of the next invocation
        pub fn push_output(&self, output: ToolOutput) -> &Self {
            self.lock_script().push_back(Scripted::Output(output));
            self
        }

        /// Make the next invocation fail to launch
        pub fn push_launch_error(&self, kind: io::ErrorKind) -> &Self {
            self.lock_script().push_back(Scripted::LaunchError(kind));
            self
        }

        pub fn invocations(&self) -> Vec<(String, Vec<String>)> {
            self.invocations
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }

        fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Scripted>> {
            self.script
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    impl CommandRunner for MockCommandRunner {
        fn run(&self, program: &str, args: &[String]) -> io::Result<ToolOutput> {
            self.invocations
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push((program.to_string(), args.to_vec()));

            match self.lock_script().pop_front() {
                Some(Scripted::Output(output)) => Ok(output),
                Some(Scripted::LaunchError(kind)) => {
                    Err(io::Error::new(kind, "scripted launch failure"))
                }
                // Unscripted calls behave like a tool that found nothing
                None => Ok(ToolOutput::failure(1, "")),
            }
        }
    }
}
