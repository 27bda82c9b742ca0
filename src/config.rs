use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, ShellError};

pub const DEFAULT_PROMPT: &str = "pipesh> ";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShellConfig {
    pub prompt: String,
    pub trace: bool,
    /// `export NAME=value` lines, applied to the process environment by the binary.
    pub exports: Vec<(String, String)>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            trace: false,
            exports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CliOptions {
    pub trace: bool,
    pub rc_path: Option<PathBuf>,
    pub help: bool,
}

pub const USAGE: &str = "usage: pipesh [-x] [--rc PATH] [--help]";

/// Parse command-line flags. Unknown flags are reported to `err` and skipped.
pub fn parse_args<I>(args: I, err: &mut dyn Write) -> CliOptions
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-x" => options.trace = true,
            "-h" | "--help" => options.help = true,
            "--rc" => match iter.next() {
                Some(path) => options.rc_path = Some(PathBuf::from(path)),
                None => {
                    let _ = writeln!(err, "pipesh: --rc requires a path");
                }
            },
            _ => {
                if let Some(path) = arg.strip_prefix("--rc=") {
                    options.rc_path = Some(PathBuf::from(path));
                } else {
                    let _ = writeln!(err, "pipesh: unknown option '{arg}'");
                }
            }
        }
    }
    options
}

/// `$PIPESH_RC`, else `$HOME/.pipeshrc`.
pub fn default_rc_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("PIPESH_RC").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".pipeshrc"))
}

/// Load the rc file into `config`. A missing file is not an error; bad lines
/// are reported to `err` and skipped.
pub fn load_config(
    path: &Path,
    config: &mut ShellConfig,
    err: &mut dyn Write,
) -> io::Result<()> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for (idx, problem) in apply_config(&content, config) {
        let _ = writeln!(err, "config:{}: {}", idx, problem.display_simple());
    }
    Ok(())
}

/// Apply rc-file directives, returning `(line number, error)` for lines that
/// were rejected.
pub fn apply_config(content: &str, config: &mut ShellConfig) -> Vec<(usize, ShellError)> {
    let mut problems = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Err(e) = apply_line(line, config) {
            problems.push((idx + 1, e));
        }
    }
    problems
}

fn apply_line(line: &str, config: &mut ShellConfig) -> Result<(), ShellError> {
    if let Some(rest) = line.strip_prefix("export ") {
        let (name, value) = split_assignment(rest)?;
        if !is_valid_var_name(name) {
            return Err(config_error(format!("invalid variable name '{name}'")));
        }
        config.exports.push((name.to_string(), value.to_string()));
        return Ok(());
    }
    let (key, value) = split_assignment(line)?;
    match key.to_ascii_lowercase().as_str() {
        "prompt" => config.prompt = value.to_string(),
        "trace" => config.trace = parse_flag(value)?,
        _ => return Err(config_error(format!("unrecognized directive '{key}'"))),
    }
    Ok(())
}

fn split_assignment(input: &str) -> Result<(&str, &str), ShellError> {
    let (key, value) = input.split_once('=').ok_or_else(|| {
        config_error("missing '='").with_context("expected: key = value or export NAME=value")
    })?;
    Ok((key.trim(), strip_quotes(value.trim())))
}

fn parse_flag(value: &str) -> Result<bool, ShellError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(config_error(format!("invalid flag value '{value}'"))
            .with_context("valid values: on/off, yes/no, true/false, 1/0")),
    }
}

fn config_error(message: impl Into<String>) -> ShellError {
    ShellError::new(ErrorKind::Config, message)
}

pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch == '_' || ch.is_ascii_alphanumeric())
}

fn strip_quotes(input: &str) -> &str {
    let bytes = input.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &input[1..bytes.len() - 1];
        }
    }
    input
}
