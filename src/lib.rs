//! Line parsing, pipeline execution and builtins for the shell.
//!
//! The binary only adds line editing and startup on top of this crate, so
//! tests and the fuzz target can drive the whole evaluation path without
//! the interactive deps.

pub mod builtins;
pub mod config;
pub mod error;
pub mod execution;
pub mod parse;
pub mod repl;
pub mod session;

pub use error::{ErrorKind, ShellError, ShellResult};
pub use execution::{run_pipeline, PipelineResult, StageOutcome};
pub use parse::{
    extract_redirections, resolve_pipeline, split_into_pipeline, tokenize, CommandSpec,
    OutputRedirection, Segment, Token, TokenKind,
};
pub use repl::{eval_line, LineOutcome};
pub use session::Session;

/// Parse a full line the way the shell does before executing it.
pub fn parse_line(input: &str) -> Vec<CommandSpec> {
    resolve_pipeline(&split_into_pipeline(tokenize(input)))
}

/// Fuzz helper for parser-only targets.
pub fn fuzz_parse_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    let tokens = tokenize(&input);
    let word_count = tokens.iter().filter(|t| t.is_word()).count();
    let pipe_count = tokens.iter().filter(|t| t.is_operator("|")).count();
    let segments = split_into_pipeline(tokens);
    assert!(segments.len() <= pipe_count + 1);
    for cmd in resolve_pipeline(&segments) {
        assert!(cmd.args.len() <= word_count);
    }
}
