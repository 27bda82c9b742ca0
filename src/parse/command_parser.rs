use log::debug;

use crate::parse::{Segment, Token, TokenKind};

fn is_redirection_operator(token: &Token) -> bool {
    matches!(token.text.as_str(), "<" | ">" | ">>")
}

/// Group tokens into pipeline segments split on `|`.
///
/// Redirection operators stay inside their segment so the redirection
/// extractor can see them. `&` and `;` are accepted by the lexer but have no
/// meaning here and are dropped. Empty segments between pipes are kept; a
/// trailing empty segment is not.
pub fn split_into_pipeline(tokens: Vec<Token>) -> Vec<Segment> {
    let mut pipeline = Vec::new();
    let mut current = Segment::new();

    for token in tokens {
        match token.kind {
            TokenKind::Operator if token.text == "|" => {
                pipeline.push(std::mem::take(&mut current));
            }
            TokenKind::Operator if is_redirection_operator(&token) => current.push(token),
            TokenKind::Operator => {
                debug!("parse event=drop-operator op={:?}", token.text);
            }
            TokenKind::Word => current.push(token),
        }
    }

    if !current.is_empty() {
        pipeline.push(current);
    }
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;

    fn texts(pipeline: &[Segment]) -> Vec<Vec<&str>> {
        pipeline
            .iter()
            .map(|seg| seg.iter().map(|t| t.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn splits_on_pipes() {
        let pipeline = split_into_pipeline(tokenize("a | b | c"));
        assert_eq!(texts(&pipeline), vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn trailing_pipe_dropped() {
        let pipeline = split_into_pipeline(tokenize("a |"));
        assert_eq!(texts(&pipeline), vec![vec!["a"]]);
    }

    #[test]
    fn inner_and_leading_empty_segments_kept() {
        let pipeline = split_into_pipeline(tokenize("| a || b"));
        assert_eq!(texts(&pipeline), vec![vec![], vec!["a"], vec![], vec!["b"]]);
    }

    #[test]
    fn only_pipes_yield_empty_segments() {
        let pipeline = split_into_pipeline(tokenize("| |"));
        assert!(pipeline.iter().all(Vec::is_empty));
    }

    #[test]
    fn redirection_operators_survive() {
        let pipeline = split_into_pipeline(tokenize("sort < in.txt | uniq >> out.txt"));
        assert_eq!(
            texts(&pipeline),
            vec![vec!["sort", "<", "in.txt"], vec!["uniq", ">>", "out.txt"]]
        );
        assert!(pipeline[0][1].is_operator("<"));
        assert!(pipeline[1][1].is_operator(">>"));
    }

    #[test]
    fn inert_operators_dropped() {
        let pipeline = split_into_pipeline(tokenize("a & b ; c"));
        assert_eq!(texts(&pipeline), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn quoted_pipe_is_not_a_split() {
        let pipeline = split_into_pipeline(tokenize("echo 'a|b'"));
        assert_eq!(texts(&pipeline), vec![vec!["echo", "a|b"]]);
    }

    proptest::proptest! {
        #[test]
        fn non_empty_segments_bounded_by_words(line in "[a-z |<>&;]{0,48}") {
            let tokens = tokenize(&line);
            let word_count = tokens.iter().filter(|t| t.is_word()).count();
            let pipeline = split_into_pipeline(tokens);
            let non_empty = pipeline
                .iter()
                .filter(|seg| seg.iter().any(Token::is_word))
                .count();
            proptest::prop_assert!(non_empty <= word_count);
        }
    }
}
