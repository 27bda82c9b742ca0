use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::execution::{open_input, open_output, COMMAND_FAILURE_STATUS};
use crate::parse::CommandSpec;
use crate::session::Session;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BuiltinOutcome {
    /// Not a builtin; the caller runs it as an external command.
    NotBuiltin,
    /// Ran in the shell process with this status.
    Handled(i32),
    /// The shell should stop reading input and exit with this code.
    Exit(i32),
}

pub fn is_builtin(cmd: Option<&str>) -> bool {
    matches!(cmd, Some("exit" | "cd" | "pwd" | "echo"))
}

/// Run `args` in the shell process if it names a builtin.
///
/// Only called for single-command pipelines; inside a pipeline every command
/// is spawned, builtin names included.
pub fn try_run_in_parent(
    args: &[String],
    session: &mut Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> BuiltinOutcome {
    let name = args.first().map(String::as_str);
    let status = match name {
        Some("exit") => return exit_code(args, err),
        Some("cd") => change_dir(args, session, err),
        Some("pwd") => report_write("pwd", writeln!(out, "{}", session.cwd.display()), err),
        Some("echo") => {
            let line = echo_line(&args[1..], session);
            report_write("echo", writeln!(out, "{line}"), err)
        }
        _ => return BuiltinOutcome::NotBuiltin,
    };
    BuiltinOutcome::Handled(status)
}

/// Like [`try_run_in_parent`], honouring the command's redirections. Output
/// goes to the redirection target when one is given; an input target is
/// opened only to check that it exists.
pub fn run_with_redirections(
    cmd: &CommandSpec,
    session: &mut Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> BuiltinOutcome {
    match cmd.program() {
        // `exit` leaves before any target is opened or truncated.
        Some("exit") => return exit_code(&cmd.args, err),
        name if !is_builtin(name) => return BuiltinOutcome::NotBuiltin,
        _ => {}
    }
    let opened = cmd
        .stdin
        .as_deref()
        .map(|path| open_input(path, session))
        .transpose()
        .and_then(|_| {
            cmd.stdout
                .as_ref()
                .map(|output| open_output(output, session))
                .transpose()
        });
    match opened {
        Ok(Some(mut file)) => try_run_in_parent(&cmd.args, session, &mut file, err),
        Ok(None) => try_run_in_parent(&cmd.args, session, out, err),
        Err(e) => {
            let _ = writeln!(err, "pipesh: {}", e.message);
            BuiltinOutcome::Handled(COMMAND_FAILURE_STATUS)
        }
    }
}

fn exit_code(args: &[String], err: &mut dyn Write) -> BuiltinOutcome {
    match args.get(1) {
        None => BuiltinOutcome::Exit(0),
        Some(arg) => match arg.parse::<i32>() {
            Ok(code) => BuiltinOutcome::Exit(code),
            Err(_) => {
                let _ = writeln!(err, "exit: {arg}: numeric argument required");
                BuiltinOutcome::Exit(2)
            }
        },
    }
}

fn change_dir(args: &[String], session: &mut Session, err: &mut dyn Write) -> i32 {
    let target = match args.get(1) {
        Some(dir) => dir.clone(),
        None => match session.var("HOME").filter(|home| !home.is_empty()) {
            Some(home) => home,
            None => {
                let _ = writeln!(err, "cd: HOME not set");
                return 1;
            }
        },
    };
    match resolve_dir(session, &target) {
        Ok(path) => {
            session.cwd = path;
            0
        }
        Err(e) => {
            let _ = writeln!(err, "cd: {}", e.message);
            1
        }
    }
}

fn resolve_dir(session: &Session, target: &str) -> ShellResult<PathBuf> {
    let path = fs::canonicalize(session.resolve(target))
        .map_err(|e| ShellError::new(ErrorKind::Builtin, format!("{target}: {e}")))?;
    if !path.is_dir() {
        return Err(ShellError::new(
            ErrorKind::Builtin,
            format!("{target}: Not a directory"),
        ));
    }
    Ok(path)
}

/// Join arguments with spaces, replacing `$NAME` arguments by their value.
fn echo_line(args: &[String], session: &Session) -> String {
    args.iter()
        .map(|arg| match arg.strip_prefix('$') {
            Some(name) => session.var(name).unwrap_or_default(),
            None => arg.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn report_write(name: &str, result: io::Result<()>, err: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "{name}: write error: {e}");
            1
        }
    }
}
