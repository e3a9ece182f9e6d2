//! Reformatting of rewritten files.

use crate::error::FormatError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Canonical formatter run over a file after its edits are applied.
pub trait Formatter: Sync {
    /// Returns the formatted form of `source`.
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Leaves the text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl Formatter for Verbatim {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        Ok(source.to_owned())
    }
}

/// Pipes the text through an external program such as `gofmt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Formatter running `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Formatter from a command line split into words, e.g. `["gofmt", "-s"]`.
    /// Returns `None` for an empty command.
    #[must_use]
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let spawn_error = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Feed stdin from a thread so a chatty formatter cannot deadlock on a full pipe.
        let input = source.to_owned();
        let stdin = child.stdin.take();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output().map_err(spawn_error)?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));

        // A program that exits early breaks the pipe; report its status instead.
        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        written.map_err(spawn_error)?;
        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidUtf8 {
            program: self.program.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim() {
        assert_eq!(Verbatim.format("x := y\n").unwrap(), "x := y\n");
    }

    #[test]
    fn test_from_command() {
        let words = vec!["gofmt".to_owned(), "-s".to_owned()];
        let fmt = CommandFormatter::from_command(&words).unwrap();
        assert_eq!(fmt, CommandFormatter::new("gofmt", vec!["-s".to_owned()]));
        assert!(CommandFormatter::from_command(&[]).is_none());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let fmt = CommandFormatter::new("unconvert-no-such-formatter", vec![]);
        assert!(matches!(fmt.format("x"), Err(FormatError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_pipes_through_program() {
        let fmt = CommandFormatter::new("cat", vec![]);
        assert_eq!(fmt.format("package p\n").unwrap(), "package p\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program() {
        let fmt = CommandFormatter::new("false", vec![]);
        assert!(matches!(fmt.format("x"), Err(FormatError::Failed { .. })));
    }
}
