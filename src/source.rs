//! Pull-based character supply feeding the transform.
//!
//! A [`Source`] produces a lazy, finite, non-restartable sequence of
//! characters, one per pull, and each pull may fail. The transform engine
//! wraps a source and is itself a source, so engines and other adapters
//! stack freely.

use std::error::Error;
use std::fmt;

/// Opaque failure raised by a [`Source`].
///
/// Carries whatever error the underlying supply produced. The transform
/// never inspects it; it travels through unchanged for the caller to
/// unwrap via [`SourceError::into_inner`] or `source()`.
#[derive(Debug)]
pub struct SourceError(Box<dyn Error + Send + Sync>);

impl SourceError {
    /// Wrap an underlying failure.
    pub fn new<E>(cause: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        SourceError(cause.into())
    }

    /// Recover the wrapped failure.
    pub fn into_inner(self) -> Box<dyn Error + Send + Sync> {
        self.0
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source failure: {}", self.0)
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref())
    }
}

/// A lazy, finite, non-restartable supply of characters.
///
/// Pulls are strictly sequential. `Ok(None)` signals end-of-input; a
/// well-behaved source keeps answering `Ok(None)` once it has said so.
pub trait Source {
    /// Pull the next character, or `None` at end-of-input.
    fn pull(&mut self) -> Result<Option<char>, SourceError>;

    /// Advisory count of characters retrievable without blocking.
    fn available_hint(&self) -> usize {
        0
    }

    /// Release whatever the source holds. Default: nothing to release.
    fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Characters of an owned string.
pub struct TextSource {
    chars: std::vec::IntoIter<char>,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        let chars: Vec<char> = text.into().chars().collect();
        TextSource {
            chars: chars.into_iter(),
        }
    }
}

impl Source for TextSource {
    fn pull(&mut self) -> Result<Option<char>, SourceError> {
        Ok(self.chars.next())
    }

    fn available_hint(&self) -> usize {
        self.chars.len()
    }
}

/// Adapter over any character iterator.
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = char>,
{
    pub fn new(iter: I) -> Self {
        IterSource { iter }
    }
}

impl<I> Source for IterSource<I>
where
    I: Iterator<Item = char>,
{
    fn pull(&mut self) -> Result<Option<char>, SourceError> {
        Ok(self.iter.next())
    }

    fn available_hint(&self) -> usize {
        self.iter.size_hint().0
    }
}
