//! Process Runner: runs the `git` executable and captures what it prints
//!
//! [`CommandRunner`] is the process boundary. It streams standard output into
//! a caller-supplied sink and reports the exit status; a non-zero status is
//! not an error at that level. [`Launcher`] sits on top, binds the executable,
//! working tree and environment, and turns failing statuses into
//! [`Error::CommandFailed`].

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::{Error, Result};

/// Everything needed to start one process.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub program: &'a Path,
    pub args: &'a [String],
    pub cwd: &'a Path,
    pub env: &'a BTreeMap<String, String>,
}

impl Invocation<'_> {
    /// Program and arguments joined by spaces, for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a finished process exited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a process to completion.
///
/// Implementations fail only when the process cannot be started or its
/// pipes break.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation<'_>, stdout: &mut dyn Write) -> io::Result<ProcessExit>;
}

/// Runs real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation<'_>, stdout: &mut dyn Write) -> io::Result<ProcessExit> {
        let mut child = Command::new(invocation.program)
            .args(invocation.args)
            .current_dir(invocation.cwd)
            .envs(invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain stderr on its own thread so a chatty process cannot fill the
        // pipe while stdout is being copied.
        let stderr_pipe = child.stderr.take();
        let stderr_reader = std::thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });

        let copied = match child.stdout.take() {
            Some(mut out) => io::copy(&mut out, stdout).map(drop),
            None => Ok(()),
        };
        if let Err(e) = copied {
            // Reap the child before giving up on it.
            let _ = child.kill();
            let _ = child.wait();
            let _ = stderr_reader.join();
            return Err(e);
        }
        let status = child.wait()?;
        let stderr = stderr_reader.join().unwrap_or_default();

        Ok(ProcessExit {
            code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// The `git` executable bound to a working tree and environment.
#[derive(Clone)]
pub struct Launcher {
    git_exe: PathBuf,
    workspace: PathBuf,
    env: BTreeMap<String, String>,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("git_exe", &self.git_exe)
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl Launcher {
    pub fn new(
        git_exe: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            git_exe: git_exe.into(),
            workspace: workspace.into(),
            env,
            runner: Arc::new(SystemRunner),
        }
    }

    /// Replace the process runner, e.g. with a scripted one in tests.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn git_exe(&self) -> &Path {
        &self.git_exe
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Run `git <args>` in the working tree and return its standard output.
    pub fn launch<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        self.launch_in(args, &self.workspace)
    }

    /// Run `git <args>` in `dir` and return its standard output.
    pub fn launch_in<S: AsRef<str>>(&self, args: &[S], dir: &Path) -> Result<String> {
        self.capture(args, dir, &[])
    }

    /// Run `git <args>` in the working tree with extra environment entries.
    pub fn launch_with_env<S: AsRef<str>>(
        &self,
        args: &[S],
        extra_env: &[(&str, String)],
    ) -> Result<String> {
        self.capture(args, &self.workspace, extra_env)
    }

    /// Run `git <args>` in the working tree, streaming stdout into `sink`.
    pub fn launch_to<S: AsRef<str>>(&self, args: &[S], sink: &mut dyn Write) -> Result<()> {
        let (command, exit) = self.execute(args, &self.workspace, &[], sink)?;
        if exit.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command,
                status: exit.code.unwrap_or(-1),
                output: exit.stderr,
            })
        }
    }

    fn capture<S: AsRef<str>>(
        &self,
        args: &[S],
        dir: &Path,
        extra_env: &[(&str, String)],
    ) -> Result<String> {
        let mut stdout = Vec::new();
        let (command, exit) = self.execute(args, dir, extra_env, &mut stdout)?;
        let output = String::from_utf8_lossy(&stdout).into_owned();

        if exit.success() {
            Ok(output)
        } else {
            Err(Error::CommandFailed {
                command,
                status: exit.code.unwrap_or(-1),
                output: format!("{}{}", output, exit.stderr),
            })
        }
    }

    fn execute<S: AsRef<str>>(
        &self,
        args: &[S],
        dir: &Path,
        extra_env: &[(&str, String)],
        sink: &mut dyn Write,
    ) -> Result<(String, ProcessExit)> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        let mut env = self.env.clone();
        for (key, value) in extra_env {
            env.insert((*key).to_string(), value.clone());
        }

        let invocation = Invocation {
            program: &self.git_exe,
            args: &args,
            cwd: dir,
            env: &env,
        };
        let command = invocation.command_line();
        tracing::debug!(command = %command, cwd = %dir.display(), "Launching git");

        let exit = self
            .runner
            .run(&invocation, sink)
            .map_err(|source| Error::Launch {
                command: command.clone(),
                source,
            })?;
        tracing::trace!(command = %command, code = ?exit.code, "git exited");

        Ok((command, exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_joins_program_and_args() {
        let args = vec!["fetch".to_string(), "-t".to_string()];
        let env = BTreeMap::new();
        let invocation = Invocation {
            program: Path::new("/usr/bin/git"),
            args: &args,
            cwd: Path::new("."),
            env: &env,
        };
        assert_eq!(invocation.command_line(), "/usr/bin/git fetch -t");
    }

    #[test]
    fn test_missing_executable_is_launch_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let launcher = Launcher::new(
            temp.path().join("no-such-git"),
            temp.path(),
            BTreeMap::new(),
        );
        let err = launcher.launch(&["status"]).unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failing_sink_returns_error_after_reaping() {
        let temp = tempfile::TempDir::new().unwrap();
        let args = vec!["--version".to_string()];
        let env = BTreeMap::new();
        let invocation = Invocation {
            program: Path::new("git"),
            args: &args,
            cwd: temp.path(),
            env: &env,
        };

        let err = SystemRunner.run(&invocation, &mut BrokenSink).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
