use std::io;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Read one line of input. Returns `None` at end of input.
///
/// Non-interactive input bypasses the editor and shows no prompt. An
/// interrupted read yields an empty line so the loop simply prompts again.
pub fn read_input_line(
    editor: &mut DefaultEditor,
    interactive: bool,
    prompt: &str,
) -> io::Result<Option<String>> {
    if interactive {
        match editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(io::Error::other(err)),
        }
    } else {
        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(line)))
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
