use rustyline::{Config, DefaultEditor, EditMode};
use std::env;
use std::io::{self, Write};

mod io_helpers;

use io_helpers::read_input_line;
use log::{debug, warn};
use pipesh::config::{default_rc_path, load_config, parse_args, ShellConfig, USAGE};
use pipesh::{eval_line, LineOutcome, Session};

fn main() {
    init_logging();
    let options = parse_args(env::args().skip(1), &mut io::stderr());
    if options.help {
        println!("{USAGE}");
        return;
    }

    let mut config = ShellConfig::default();
    if let Some(path) = options.rc_path.clone().or_else(default_rc_path) {
        debug!("config event=load path={}", path.display());
        if let Err(err) = load_config(&path, &mut config, &mut io::stderr()) {
            warn!("config event=unreadable path={} error={err}", path.display());
            eprintln!("pipesh: {}: {err}", path.display());
        }
    }
    for (name, value) in &config.exports {
        env::set_var(name, value);
    }

    let interactive = unsafe { libc::isatty(libc::STDIN_FILENO) == 1 };
    let edit_mode = match env::var("PIPESH_EDITMODE").ok().as_deref() {
        Some("vi") | Some("VI") => EditMode::Vi,
        _ => EditMode::Emacs,
    };
    let editor_config = Config::builder()
        .auto_add_history(false)
        .edit_mode(edit_mode)
        .build();
    let mut editor = match DefaultEditor::with_config(editor_config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut session = Session::from_env();
    session.trace = options.trace || config.trace;
    debug!(
        "shell event=start interactive={interactive} cwd={}",
        session.cwd.display()
    );

    let code = run_loop(&mut session, &mut editor, interactive, &config.prompt);
    let _ = io::stdout().flush();
    std::process::exit(code);
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or("PIPESH_LOG", "info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Read and evaluate lines until `exit` or end of input, returning the exit code.
fn run_loop(
    session: &mut Session,
    editor: &mut DefaultEditor,
    interactive: bool,
    prompt: &str,
) -> i32 {
    let stdout = io::stdout();
    let stderr = io::stderr();
    loop {
        let line = match read_input_line(editor, interactive, prompt) {
            Ok(Some(line)) => line,
            Ok(None) => {
                if interactive {
                    println!();
                }
                return 0;
            }
            Err(err) => {
                eprintln!("error: {err}");
                return 1;
            }
        };

        let mut out = stdout.lock();
        let mut err = stderr.lock();
        let outcome = eval_line(session, &line, &mut out, &mut err);
        let _ = out.flush();
        if let LineOutcome::Exit(code) = outcome {
            debug!("shell event=exit code={code}");
            return code;
        }
    }
}
