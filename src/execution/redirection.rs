use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{ShellError, ShellResult};
use crate::parse::{CommandSpec, OutputRedirection};
use crate::session::Session;

const OUTPUT_MODE: u32 = 0o644;

pub fn open_input(path: &str, session: &Session) -> ShellResult<File> {
    OpenOptions::new()
        .read(true)
        .open(session.resolve(path))
        .map_err(|err| ShellError::redirection(path, &err))
}

pub fn open_output(output: &OutputRedirection, session: &Session) -> ShellResult<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).mode(OUTPUT_MODE);
    if output.append {
        opts.append(true);
    } else {
        opts.truncate(true);
    }
    opts.open(session.resolve(&output.path))
        .map_err(|err| ShellError::redirection(&output.path, &err))
}

/// Point the command's stdio at its redirection targets, overriding any pipe
/// ends already set. Input is opened first; if it fails the output file is
/// left untouched.
pub(crate) fn apply_redirections(
    command: &mut Command,
    cmd: &CommandSpec,
    session: &Session,
) -> ShellResult<()> {
    if let Some(ref path) = cmd.stdin {
        let file = open_input(path, session)?;
        debug!("pipeline event=redirect stdin path={path}");
        command.stdin(Stdio::from(file));
    }
    if let Some(ref output) = cmd.stdout {
        let file = open_output(output, session)?;
        debug!(
            "pipeline event=redirect stdout path={} append={}",
            output.path, output.append
        );
        command.stdout(Stdio::from(file));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn output(path: &str, append: bool) -> OutputRedirection {
        OutputRedirection {
            path: path.to_string(),
            append,
        }
    }

    #[test]
    fn output_truncates_or_appends() {
        let dir = tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf());
        fs::write(dir.path().join("out.txt"), "old contents\n").unwrap();

        let mut file = open_output(&output("out.txt", false), &session).unwrap();
        file.write_all(b"one\n").unwrap();
        drop(file);
        assert_eq!(
            fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "one\n"
        );

        let mut file = open_output(&output("out.txt", true), &session).unwrap();
        file.write_all(b"two\n").unwrap();
        drop(file);
        assert_eq!(
            fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "one\ntwo\n"
        );
    }

    #[test]
    fn output_created_with_default_mode() {
        let dir = tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf());
        drop(open_output(&output("new.txt", false), &session).unwrap());
        let mode = fs::metadata(dir.path().join("new.txt"))
            .unwrap()
            .permissions()
            .mode();
        // umask may only remove bits
        assert_eq!(mode & 0o777 & !OUTPUT_MODE, 0);
        assert_ne!(mode & 0o600, 0);
    }

    #[test]
    fn missing_input_is_redirection_error() {
        let dir = tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf());
        let err = open_input("missing.txt", &session).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Redirection);
        assert!(err.message.starts_with("missing.txt"));
    }

    #[test]
    fn failed_input_leaves_output_alone() {
        let dir = tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf());
        let mut spec = CommandSpec::new();
        spec.args = vec!["cat".to_string()];
        spec.stdin = Some("missing.txt".to_string());
        spec.stdout = Some(output("out.txt", false));
        let mut command = Command::new("cat");
        assert!(apply_redirections(&mut command, &spec, &session).is_err());
        assert!(!dir.path().join("out.txt").exists());
    }
}
