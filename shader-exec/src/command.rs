//! Child-process plumbing shared by the external preprocessor and compiler.

use crate::ExecError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

/// An external program and its leading arguments.
///
/// Arguments may contain `{name}` placeholders which are substituted from the
/// variables passed to [`ExternalCommand::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Captured result of one run.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Runs the program with `input` on stdin and returns its captured output.
    ///
    /// `extra_args` are appended after the configured arguments. A non-zero
    /// exit status is not an error here; callers decide what it means.
    pub fn run(
        &self,
        input: &str,
        extra_args: &[String],
        vars: &BTreeMap<&str, String>,
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, ExecError> {
        let program = self.program_name();
        let mut command = Command::new(&self.program);
        command
            .args(self.args.iter().map(|arg| substitute(arg, vars)))
            .args(extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd.filter(|dir| dir.is_dir()) {
            command.current_dir(dir);
        }

        log::trace!("Running {:?}", command);
        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

        // Feed stdin from a separate thread so a chatty child cannot block on
        // a full stdout pipe while we are still writing.
        let mut stdin = child.stdin.take().ok_or_else(|| ExecError::Io {
            program: program.clone(),
            source: std::io::Error::other("stdin was not captured"),
        })?;
        let input = input.to_owned();
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output().map_err(|source| ExecError::Io {
            program: program.clone(),
            source,
        })?;
        match writer.join() {
            Ok(Ok(())) => {}
            // The child may exit without draining stdin; its status says more.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(source)) => return Err(ExecError::Io { program, source }),
            Err(_) => {
                return Err(ExecError::Io {
                    program,
                    source: std::io::Error::other("stdin writer panicked"),
                })
            }
        }

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Replaces `{name}` placeholders in `arg`. Unknown placeholders are kept.
fn substitute(arg: &str, vars: &BTreeMap<&str, String>) -> String {
    vars.iter().fold(arg.to_owned(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_placeholders() {
        let mut vars = BTreeMap::new();
        vars.insert("basedir", "/project/shaders".to_owned());
        vars.insert("file", "/project/shaders/a.glsl".to_owned());
        assert_eq!(
            substitute("--basedir={basedir}", &vars),
            "--basedir=/project/shaders"
        );
        assert_eq!(substitute("{file}", &vars), "/project/shaders/a.glsl");
        assert_eq!(substitute("{unknown}", &vars), "{unknown}");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_pipes_stdin_to_stdout() {
        let output = ExternalCommand::new("cat")
            .run("hello shader", &[], &BTreeMap::new(), None)
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "hello shader");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_status_and_stderr() {
        let output = ExternalCommand::new("sh")
            .with_args(["-c", "echo broken >&2; exit 3"])
            .run("", &[], &BTreeMap::new(), None)
            .unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stderr.trim(), "broken");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = ExternalCommand::new("definitely-not-a-real-shader-tool")
            .run("", &[], &BTreeMap::new(), None)
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
