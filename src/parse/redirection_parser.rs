use crate::parse::{CommandSpec, OutputRedirection, Segment, Token};

/// Separate a segment into its argument list and redirection targets.
///
/// `<`, `>` and `>>` take the next word as their (trimmed) target. A repeated
/// direction overwrites the earlier one. An operator with no word after it is
/// consumed and ignored.
pub fn extract_redirections(segment: &[Token]) -> CommandSpec {
    let mut spec = CommandSpec::new();
    let mut iter = segment.iter().peekable();

    while let Some(token) = iter.next() {
        if token.is_word() {
            spec.args.push(token.text.clone());
            continue;
        }
        if !matches!(token.text.as_str(), "<" | ">" | ">>") {
            continue;
        }
        let Some(path) = iter
            .next_if(|next| next.is_word())
            .map(|next| next.text.trim().to_string())
        else {
            continue;
        };
        if token.text == "<" {
            spec.stdin = Some(path);
        } else {
            spec.stdout = Some(OutputRedirection {
                path,
                append: token.text == ">>",
            });
        }
    }

    spec
}

/// Resolve every segment of a pipeline, keeping empty commands in place.
pub fn resolve_pipeline(segments: &[Segment]) -> Vec<CommandSpec> {
    segments.iter().map(|seg| extract_redirections(seg)).collect()
}
