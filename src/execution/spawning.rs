use std::fs::File;
use std::os::fd::OwnedFd;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::error::{ShellError, ShellResult};
use crate::parse::CommandSpec;
use crate::session::Session;

use super::redirection::apply_redirections;

/// Build the process for one stage: pipe ends first, then the command's own
/// redirections on top. The environment is inherited and the working
/// directory is the session's.
pub(crate) fn build_stage_command(
    cmd: &CommandSpec,
    session: &Session,
    pipe_stdin: Option<OwnedFd>,
    pipe_stdout: Option<OwnedFd>,
) -> ShellResult<Command> {
    let program = cmd.args[0].as_str();
    let mut command = Command::new(session.resolve_program(program));
    command.args(&cmd.args[1..]);
    command.current_dir(&session.cwd);

    if let Some(fd) = pipe_stdin {
        command.stdin(Stdio::from(File::from(fd)));
    }
    if let Some(fd) = pipe_stdout {
        command.stdout(Stdio::from(File::from(fd)));
    }
    apply_redirections(&mut command, cmd, session)?;

    Ok(command)
}

/// Spawn a built command. The `Command` is consumed so the parent's copies
/// of its pipe ends and redirection files close as soon as the child exists.
pub(crate) fn spawn_stage(mut command: Command, program: &str) -> ShellResult<Child> {
    let resolved = PathBuf::from(command.get_program());
    command
        .spawn()
        .map_err(|err| ShellError::from_spawn(program, &resolved, &err))
}
