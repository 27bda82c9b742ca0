//! One iteration of the read-eval-print loop, minus the reading.
//!
//! `eval_line` takes a raw input line through tokenizer, pipeline builder,
//! redirection extraction and then either a builtin or the executor. Output
//! streams are parameters so the whole path can be exercised in tests.
use std::io::Write;

use crate::builtins::{run_with_redirections, BuiltinOutcome};
use crate::execution::{run_pipeline_with_diagnostics, FAILURE_STATUS};
use crate::parse::{resolve_pipeline, split_into_pipeline, tokenize, CommandSpec, Token};
use crate::session::Session;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LineOutcome {
    Continue,
    Exit(i32),
}

pub fn eval_line(
    session: &mut Session,
    line: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> LineOutcome {
    if line.trim().is_empty() {
        return LineOutcome::Continue;
    }

    let tokens = tokenize(line);
    if is_bare_exit(&tokens) {
        return LineOutcome::Exit(0);
    }
    trace_tokens(session, err, &tokens);

    let segments = split_into_pipeline(tokens);
    // Builtins run in the shell only for a single segment; any `|` sends the
    // line to the executor even if the other segments are empty.
    let single_segment = segments.len() == 1;
    let pipeline: Vec<CommandSpec> = resolve_pipeline(&segments)
        .into_iter()
        .filter(|cmd| !cmd.args.is_empty())
        .collect();
    if pipeline.is_empty() {
        return LineOutcome::Continue;
    }
    trace_command_specs(session, err, &pipeline);

    if let (true, [cmd]) = (single_segment, pipeline.as_slice()) {
        match run_with_redirections(cmd, session, out, err) {
            BuiltinOutcome::Exit(code) => return LineOutcome::Exit(code),
            BuiltinOutcome::Handled(status) => {
                session.last_status = status;
                return LineOutcome::Continue;
            }
            BuiltinOutcome::NotBuiltin => {}
        }
    }

    // Children write straight to the inherited stdout; flush what the shell
    // buffered so output stays in order.
    let _ = out.flush();
    session.last_status = match run_pipeline_with_diagnostics(&pipeline, session, err) {
        Ok(result) => result.status_code,
        Err(e) => {
            let _ = writeln!(err, "pipesh: {}", e.message);
            FAILURE_STATUS
        }
    };
    LineOutcome::Continue
}

// `exit` alone stops the loop before any parsing happens.
fn is_bare_exit(tokens: &[Token]) -> bool {
    matches!(tokens, [only] if only.is_word() && only.text == "exit")
}

fn trace_tokens(session: &Session, err: &mut dyn Write, tokens: &[Token]) {
    if session.trace {
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        let _ = writeln!(err, "trace: tokens: {texts:?}");
    }
}

fn trace_command_specs(session: &Session, err: &mut dyn Write, pipeline: &[CommandSpec]) {
    if !session.trace {
        return;
    }
    for (idx, cmd) in pipeline.iter().enumerate() {
        let _ = writeln!(err, "trace: argv[{idx}]: {:?}", cmd.args);
        if let Some(ref path) = cmd.stdin {
            let _ = writeln!(err, "trace: redirect stdin < {path}");
        }
        if let Some(ref output) = cmd.stdout {
            let mode = if output.append { ">>" } else { ">" };
            let _ = writeln!(err, "trace: redirect stdout {mode} {}", output.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::COMMAND_FAILURE_STATUS;
    use std::fs;
    use tempfile::tempdir;

    fn eval(session: &mut Session, line: &str) -> (LineOutcome, String, String) {
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let outcome = eval_line(session, line, &mut out, &mut err);
        (
            outcome,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn session_in(dir: &std::path::Path) -> Session {
        Session::new(dir.to_path_buf())
            .with_lookup(|name| (name == "USER").then(|| "tester".to_string()))
    }

    #[test]
    fn blank_and_pipe_only_lines_are_noops() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path());
        session.last_status = 5;
        for line in ["", "   ", "|", " | | ", ";", "&"] {
            let (outcome, out, err) = eval(&mut session, line);
            assert_eq!(outcome, LineOutcome::Continue);
            assert!(out.is_empty() && err.is_empty(), "line {line:?}");
        }
        assert_eq!(session.last_status, 5);
    }

    #[test]
    fn exit_forms() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path());
        assert_eq!(eval(&mut session, "exit").0, LineOutcome::Exit(0));
        assert_eq!(eval(&mut session, "  exit  ").0, LineOutcome::Exit(0));
        assert_eq!(eval(&mut session, "exit 4").0, LineOutcome::Exit(4));
        // inside a pipeline `exit` is just another program
        assert_eq!(eval(&mut session, "exit | cat").0, LineOutcome::Continue);
    }

    #[test]
    fn builtins_run_in_process() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path());
        let (outcome, out, _) = eval(&mut session, "echo hi $USER");
        assert_eq!(outcome, LineOutcome::Continue);
        assert_eq!(out, "hi tester\n");
        assert_eq!(session.last_status, 0);
    }

    #[test]
    fn echo_redirect_then_cat_round_trip() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path());
        let (_, out, err) = eval(&mut session, "echo hi > f.txt");
        assert!(out.is_empty() && err.is_empty());
        eval(&mut session, "cat < f.txt > copy.txt");
        assert_eq!(
            fs::read_to_string(dir.path().join("copy.txt")).unwrap(),
            "hi\n"
        );
    }

    #[test]
    fn cd_affects_later_commands() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("inner")).unwrap();
        let mut session = session_in(dir.path());
        eval(&mut session, "cd inner");
        eval(&mut session, "pwd > where.txt");
        eval(&mut session, "sh -c pwd > spawned.txt");
        let inner = dir.path().join("inner").canonicalize().unwrap();
        let expected = format!("{}\n", inner.display());
        assert_eq!(
            fs::read_to_string(inner.join("where.txt")).unwrap(),
            expected
        );
        assert_eq!(
            fs::read_to_string(inner.join("spawned.txt")).unwrap(),
            expected
        );
    }

    #[test]
    fn missing_command_then_next_line_works() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path());
        let (outcome, _, err) = eval(&mut session, "pipesh-no-such-program");
        assert_eq!(outcome, LineOutcome::Continue);
        assert_eq!(session.last_status, COMMAND_FAILURE_STATUS);
        assert!(err.contains("command not found"));

        eval(&mut session, "true");
        assert_eq!(session.last_status, 0);
    }

    #[test]
    fn pipe_with_empty_segment_still_spawns_builtin_names() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut session = session_in(dir.path());
        for line in ["| cd sub", "cd sub ||"] {
            let (outcome, _, _) = eval(&mut session, line);
            assert_eq!(outcome, LineOutcome::Continue);
            assert_eq!(session.cwd, dir.path(), "line {line:?}");
        }
        assert_eq!(eval(&mut session, "| exit 3").0, LineOutcome::Continue);

        // a trailing pipe adds no segment
        eval(&mut session, "cd sub |");
        assert_eq!(session.cwd, dir.path().join("sub").canonicalize().unwrap());
    }

    #[test]
    fn builtin_names_in_pipelines_are_spawned() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path());
        let (_, out, _) = eval(&mut session, "echo piped | cat > out.txt");
        assert!(out.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "piped\n"
        );
    }

    #[test]
    fn trace_reports_argv_and_redirects() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path());
        session.trace = true;
        let (_, _, err) = eval(&mut session, "echo a >> log.txt");
        assert!(err.contains("trace: tokens: [\"echo\", \"a\", \">>\", \"log.txt\"]"));
        assert!(err.contains("trace: argv[0]: [\"echo\", \"a\"]"));
        assert!(err.contains("trace: redirect stdout >> log.txt"));
    }
}
