//! Block-tree parser over marked token streams.
//!
//! The whole point of the marker transform is that nesting becomes
//! context-free. This module is the counterpart proof: a small grammar
//! turning a token stream into a tree, with no whitespace counting
//! anywhere. Blank lines carry no structure, so callers strip them first
//! (see [`parse_marked`]).
//!
//! Grammar: `block := text newline? (indent block+ dedent)?`, document is
//! `block*` to end of input.

use chumsky::prelude::*;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;

use crate::tokens::{strip_blank_lines, tokenize, Token};

type ParserError = Simple<Token>;

/// One node of the nesting tree: a line of text and the lines opened
/// under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub text: String,
    pub children: Vec<Block>,
}

/// The token stream does not form a well-nested block tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockError {
    messages: Vec<String>,
}

impl BlockError {
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unparseable block structure: {}", self.messages.join("; "))
    }
}

impl StdError for BlockError {}

fn block() -> impl Parser<Token, Block, Error = ParserError> {
    recursive(|block| {
        let text = filter_map(|span, token| match token {
            Token::Text(text) => Ok(text),
            other => Err(Simple::custom(
                span,
                format!("expected text, found {:?}", other),
            )),
        });
        let children = just(Token::Indent)
            .ignore_then(block.repeated().at_least(1))
            .then_ignore(just(Token::Dedent));
        text.then_ignore(just(Token::Newline).or_not())
            .then(children.or_not())
            .map(|(text, children)| Block {
                text,
                children: children.unwrap_or_default(),
            })
    })
}

/// Parse a token stream into the tree its markers encode.
pub fn parse_blocks(tokens: Vec<Token>) -> Result<Vec<Block>, BlockError> {
    block()
        .repeated()
        .then_ignore(end())
        .parse(tokens)
        .map_err(|errors| BlockError {
            messages: errors.iter().map(|err| err.to_string()).collect(),
        })
}

/// Tokenize marked text, drop blank lines, and parse the block tree.
pub fn parse_marked(marked: &str) -> Result<Vec<Block>, BlockError> {
    parse_blocks(strip_blank_lines(tokenize(marked)))
}

/// Render a tree as an indented outline, one `unit` per depth.
pub fn render_outline(blocks: &[Block], unit: &str) -> String {
    fn visit(out: &mut String, blocks: &[Block], unit: &str, depth: usize) {
        for block in blocks {
            for _ in 0..depth {
                out.push_str(unit);
            }
            out.push_str(&block.text);
            out.push('\n');
            visit(out, &block.children, unit, depth + 1);
        }
    }
    let mut out = String::new();
    visit(&mut out, blocks, unit, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> Block {
        Block {
            text: text.to_string(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_flat_lines_become_sibling_blocks() {
        let blocks = parse_marked("a\nb\n").unwrap();
        assert_eq!(blocks, vec![leaf("a"), leaf("b")]);
    }

    #[test]
    fn test_markers_nest_children() {
        let blocks = parse_marked("level 1\n>level 2\nstill level 2\n<").unwrap();
        assert_eq!(
            blocks,
            vec![Block {
                text: "level 1".to_string(),
                children: vec![leaf("level 2"), leaf("still level 2")],
            }]
        );
    }

    #[test]
    fn test_double_dedent_unwinds_two_levels() {
        let blocks = parse_marked("a\n>b\n>c\n<<d").unwrap();
        assert_eq!(
            blocks,
            vec![
                Block {
                    text: "a".to_string(),
                    children: vec![Block {
                        text: "b".to_string(),
                        children: vec![leaf("c")],
                    }],
                },
                leaf("d"),
            ]
        );
    }

    #[test]
    fn test_blank_lines_do_not_break_the_tree() {
        let blocks = parse_marked("a\n\n>b\n<").unwrap();
        assert_eq!(
            blocks,
            vec![Block {
                text: "a".to_string(),
                children: vec![leaf("b")],
            }]
        );
    }

    #[test]
    fn test_kept_whitespace_stays_in_the_text() {
        let blocks = parse_marked("a\n>  b\n<").unwrap();
        assert_eq!(blocks[0].children[0].text, "  b");
    }

    #[test]
    fn test_empty_stream_is_an_empty_tree() {
        assert_eq!(parse_marked("").unwrap(), Vec::<Block>::new());
    }

    #[test]
    fn test_unbalanced_markers_fail() {
        let err = parse_marked("a\n>b").unwrap_err();
        assert!(!err.messages().is_empty());
    }

    #[test]
    fn test_outline_round_trips_depth() {
        let blocks = parse_marked("a\n>b\n>c\n<<d").unwrap();
        assert_eq!(render_outline(&blocks, "  "), "a\n  b\n    c\nd\n");
    }
}
