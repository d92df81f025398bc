//! Tokenizer for marked output.
//!
//! Operates on text produced with the default marker configuration: `>`
//! opens a level, `<` closes one, `\n` ends a line, everything else is
//! content. The tokenization itself is handled entirely by logos.

use logos::Logos;
use serde::Serialize;
use std::fmt;

/// All tokens of a marked character stream.
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Token {
    /// One level opened.
    #[token(">")]
    Indent,

    /// One level closed.
    #[token("<")]
    Dedent,

    /// Line boundary.
    #[token("\n")]
    Newline,

    /// A maximal run of content characters.
    #[regex(r"[^><\n]+", |lex| lex.slice().to_string())]
    Text(String),
}

impl Token {
    /// Whether this is one of the two structural markers.
    pub fn is_marker(&self) -> bool {
        matches!(self, Token::Indent | Token::Dedent)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Indent => write!(f, "INDENT"),
            Token::Dedent => write!(f, "DEDENT"),
            Token::Newline => write!(f, "NEWLINE"),
            Token::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Tokenize a marked string and collect all tokens.
pub fn tokenize(marked: &str) -> Vec<Token> {
    Token::lexer(marked)
        .filter_map(|result| result.ok())
        .collect()
}

/// Tokenize a marked string, keeping each token's byte span.
pub fn tokenize_with_spans(marked: &str) -> Vec<(Token, logos::Span)> {
    let mut lexer = Token::lexer(marked);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            tokens.push((token, lexer.span()));
        }
    }

    tokens
}

/// Drop whitespace-only lines from a token stream.
///
/// The transform passes such lines through verbatim since they carry no
/// level change; structural consumers usually want them gone before
/// parsing. A line containing a marker is never dropped.
pub fn strip_blank_lines(tokens: Vec<Token>) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut line: Vec<Token> = Vec::new();
    for token in tokens {
        let ends_line = token == Token::Newline;
        line.push(token);
        if ends_line {
            drain_line(&mut line, &mut result);
        }
    }
    drain_line(&mut line, &mut result);
    result
}

fn drain_line(line: &mut Vec<Token>, result: &mut Vec<Token>) {
    if line.iter().all(is_blank_piece) {
        line.clear();
    } else {
        result.append(line);
    }
}

fn is_blank_piece(token: &Token) -> bool {
    match token {
        Token::Newline => true,
        Token::Text(text) => text.chars().all(|c| c == ' ' || c == '\t'),
        Token::Indent | Token::Dedent => false,
    }
}
