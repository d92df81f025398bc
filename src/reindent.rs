//! Rendering marked token streams back to indented text.
//!
//! The inverse of the marker transform for uniformly indented documents:
//! markers adjust a depth counter and each line start re-emits one
//! indentation unit per open level. Whitespace the transform left in
//! place (kept runs, whitespace-only lines) is treated as content.

use crate::tokens::Token;

/// Render a token stream as literally indented text, one `unit` per open
/// level at each line start.
pub fn reindent(tokens: &[Token], unit: &str) -> String {
    let mut result = String::new();
    let mut depth: usize = 0;

    for token in tokens {
        match token {
            Token::Indent => depth += 1,
            Token::Dedent => depth = depth.saturating_sub(1),
            Token::Newline => result.push('\n'),
            Token::Text(text) => {
                if result.ends_with('\n') || result.is_empty() {
                    for _ in 0..depth {
                        result.push_str(unit);
                    }
                }
                result.push_str(text);
            }
        }
    }

    result
}
