//! Tokenizer for shell input.
//!
//! Uses Normal/Single/Double modes to apply quoting while scanning a word;
//! quote spans never end a word, only unquoted whitespace or an operator does.
use crate::parse::Token;

#[derive(Copy, Clone, Eq, PartialEq)]
enum ParseMode {
    Normal,
    Single,
    Double,
}

fn is_operator_start(ch: char) -> bool {
    matches!(ch, '|' | '>' | '<' | '&' | ';')
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(ch) if ch.is_whitespace()) {
            chars.next();
        }
        let Some(&ch) = chars.peek() else {
            break;
        };
        if is_operator_start(ch) {
            chars.next();
            if ch == '>' && matches!(chars.peek(), Some('>')) {
                chars.next();
                tokens.push(Token::operator(">>"));
            } else {
                tokens.push(Token::operator(ch.to_string()));
            }
        } else {
            tokens.push(Token::word(read_word(&mut chars)));
        }
    }

    tokens
}

fn read_word<I>(chars: &mut std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut buf = String::new();
    let mut mode = ParseMode::Normal;

    while let Some(&ch) = chars.peek() {
        match mode {
            ParseMode::Normal => {
                if ch.is_whitespace() || is_operator_start(ch) {
                    break;
                }
                chars.next();
                match ch {
                    '\'' => mode = ParseMode::Single,
                    '"' => mode = ParseMode::Double,
                    // A trailing backslash has nothing to escape and is dropped.
                    '\\' => {
                        if let Some(next) = chars.next() {
                            buf.push(next);
                        }
                    }
                    _ => buf.push(ch),
                }
            }
            ParseMode::Single => {
                chars.next();
                if ch == '\'' {
                    mode = ParseMode::Normal;
                } else {
                    buf.push(ch);
                }
            }
            ParseMode::Double => {
                chars.next();
                match ch {
                    '"' => mode = ParseMode::Normal,
                    '\\' => match chars.next() {
                        Some(next) => buf.push(next),
                        None => buf.push('\\'),
                    },
                    _ => buf.push(ch),
                }
            }
        }
    }

    buf
}
