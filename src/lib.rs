//! # offside
//!
//! A streaming transform for off-side-rule text: leading-whitespace
//! nesting goes in, single-character indent/dedent markers come out, and
//! downstream grammars stay context-free.
//!
//! The engine is [`OffsideStream`], pulling from any [`Source`] one
//! character at a time. [`transform`] covers the whole-string case:
//!
//! ```rust,ignore
//! let marked = offside::transform("a\n  b\n")?;
//! assert_eq!(marked, "a\n>b\n<");
//! ```
//!
//! On top of the engine sit the reference consumers: a logos tokenizer
//! over marked output ([`tokens`]), a chumsky block-tree parser
//! ([`blocks`]), and the inverse rendering back to literal indentation
//! ([`reindent`]). YAML configuration profiles live in [`profile`].

pub mod blocks;
pub mod escape;
pub mod level;
pub mod profile;
pub mod reindent;
pub mod source;
pub mod stream;
pub mod tokens;

pub use escape::EscapeRule;
pub use level::{IndentLevel, IndentationError, LevelChange, LevelStack};
pub use source::{IterSource, Source, SourceError, TextSource};
pub use stream::{OffsideStream, TransformError};

/// Transform a whole string with the default configuration.
pub fn transform(text: &str) -> Result<String, TransformError> {
    OffsideStream::new(TextSource::new(text)).read_to_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_marks_nesting() {
        assert_eq!(transform("a\n  b\n").unwrap(), "a\n>b\n<");
    }

    #[test]
    fn test_transform_reports_bad_dedents() {
        assert!(transform("a\n  c\n b").is_err());
    }
}
