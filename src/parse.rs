//! Line parsing: tokens, pipeline segments and per-command redirections.
//!
//! The stages are pure and never fail; malformed input degrades to fewer
//! tokens or ignored operators rather than an error.

mod command_parser;
mod redirection_parser;
mod tokenizer;

pub use command_parser::split_into_pipeline;
pub use redirection_parser::{extract_redirections, resolve_pipeline};
pub use tokenizer::tokenize;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TokenKind {
    Word,
    Operator,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Word,
            text: text.into(),
        }
    }

    pub fn operator(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Operator,
            text: text.into(),
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Matches an operator token with the given text; words never match.
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }
}

/// Tokens of one command between pipe operators, redirection operators included.
pub type Segment = Vec<Token>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OutputRedirection {
    pub path: String,
    pub append: bool,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CommandSpec {
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub stdout: Option<OutputRedirection>,
}

impl CommandSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn has_redirections(&self) -> bool {
        self.stdin.is_some() || self.stdout.is_some()
    }
}
