//! The transform driver.
//!
//! [`OffsideStream`] wraps a [`Source`] and re-emits its characters one at
//! a time, replacing changes in leading whitespace with single marker
//! characters: one indent marker per opened level, one dedent marker per
//! closed level. Downstream consumers see nesting as ordinary characters
//! and never have to count spaces.
//!
//! ## How a read proceeds
//!
//! A read first drains the lookahead queue. Otherwise it pulls from the
//! source; at a line start it keeps pulling past the leading whitespace
//! run, queueing what it reads, until something decides the line: content
//! resolves the run against the open levels, while a newline, end-of-input
//! or an escape activation makes the line a non-event whose text flows out
//! verbatim. Escape regions (see [`EscapeRule`]) switch the line-start
//! logic off wholesale until their close character.
//!
//! End-of-input closes every remaining level, so the marker stream is
//! always balanced for inputs that transform without error.

use std::collections::{BTreeSet, VecDeque};
use std::error::Error;
use std::fmt;

use crate::escape::{EscapeRule, EscapeTracker};
use crate::level::{IndentLevel, IndentationError, LevelChange, LevelStack};
use crate::source::{Source, SourceError};

pub const DEFAULT_INDENT_MARKER: char = '>';
pub const DEFAULT_DEDENT_MARKER: char = '<';
pub const DEFAULT_NEWLINE: char = '\n';

/// Failure of a single read.
#[derive(Debug)]
pub enum TransformError {
    /// Leading whitespace did not line up with any open level.
    Indentation(IndentationError),
    /// The underlying source failed; carried through unchanged.
    Source(SourceError),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Indentation(err) => write!(f, "{}", err),
            TransformError::Source(err) => write!(f, "{}", err),
        }
    }
}

impl Error for TransformError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransformError::Indentation(err) => Some(err),
            TransformError::Source(err) => Some(err),
        }
    }
}

impl From<IndentationError> for TransformError {
    fn from(err: IndentationError) -> Self {
        TransformError::Indentation(err)
    }
}

impl From<SourceError> for TransformError {
    fn from(err: SourceError) -> Self {
        TransformError::Source(err)
    }
}

/// What ended a leading-whitespace run.
enum LineStop {
    /// A content character, possibly the newline itself.
    Content(char),
    /// A character that activated an escape rule.
    Escaped(char),
    /// The source ran out mid-run.
    End,
}

/// Streaming indentation-to-marker transform over a [`Source`].
///
/// One output character per [`read_one`](OffsideStream::read_one) call,
/// though a single call may pull several source characters: resolving a
/// line means reading past its leading whitespace, and the overshoot
/// waits in a FIFO queue for later calls.
///
/// Configuration is per-instance and applies to characters read after
/// the call; reconfiguring mid-line, between a run's start and its
/// resolution, is not defined. Single-line escapes keep the close
/// character they were registered with even if the newline character
/// changes later.
pub struct OffsideStream<S> {
    source: S,
    levels: LevelStack,
    escapes: EscapeTracker,
    lookahead: VecDeque<char>,
    whitespace: BTreeSet<char>,
    indent_marker: char,
    dedent_marker: char,
    newline: char,
    keep_whitespace: bool,
    at_line_start: bool,
    exhausted: bool,
}

impl<S: Source> OffsideStream<S> {
    /// Wrap a source with the default configuration: markers `>` and `<`,
    /// newline `\n`, whitespace `{' ', '\t'}`, whitespace discarded.
    pub fn new(source: S) -> Self {
        OffsideStream {
            source,
            levels: LevelStack::new(),
            escapes: EscapeTracker::new(),
            lookahead: VecDeque::new(),
            whitespace: [' ', '\t'].into_iter().collect(),
            indent_marker: DEFAULT_INDENT_MARKER,
            dedent_marker: DEFAULT_DEDENT_MARKER,
            newline: DEFAULT_NEWLINE,
            keep_whitespace: false,
            at_line_start: true,
            exhausted: false,
        }
    }

    /// Produce the next output character, or `None` once the input and
    /// every pending marker are spent.
    pub fn read_one(&mut self) -> Result<Option<char>, TransformError> {
        if let Some(queued) = self.lookahead.pop_front() {
            return Ok(Some(self.emit(queued)));
        }
        if self.exhausted {
            return Ok(self.flush_remaining());
        }
        let fresh = match self.source.pull()? {
            Some(c) => c,
            None => {
                self.exhausted = true;
                return Ok(self.flush_remaining());
            }
        };
        if self.escapes.observe(fresh) {
            return Ok(Some(self.emit(fresh)));
        }
        if !self.at_line_start {
            return Ok(Some(self.emit(fresh)));
        }
        let head = self.resolve_line_start(fresh)?;
        Ok(Some(self.emit(head)))
    }

    /// Drain the rest of the stream into a string.
    pub fn read_to_end(&mut self) -> Result<String, TransformError> {
        let mut out = String::new();
        while let Some(c) = self.read_one()? {
            out.push(c);
        }
        Ok(out)
    }

    /// Close the underlying source, consuming the stream.
    pub fn close(mut self) -> Result<(), SourceError> {
        self.source.close()
    }

    /// Queued lookahead length if anything is queued, else the source's
    /// own hint. Advisory only.
    pub fn available_hint(&self) -> usize {
        if self.lookahead.is_empty() {
            self.source.available_hint()
        } else {
            self.lookahead.len()
        }
    }

    /// Collect the leading whitespace run, then decide what the line does
    /// to the open levels. Returns the first character to deliver; the
    /// rest of what was read ahead stays queued.
    fn resolve_line_start(&mut self, first: char) -> Result<char, TransformError> {
        let mut run = String::new();
        let mut current = first;
        let stop = loop {
            if !self.whitespace.contains(&current) {
                break LineStop::Content(current);
            }
            run.push(current);
            self.lookahead.push_back(current);
            match self.source.pull()? {
                None => {
                    self.exhausted = true;
                    break LineStop::End;
                }
                Some(next) => {
                    if self.escapes.observe(next) {
                        break LineStop::Escaped(next);
                    }
                    current = next;
                }
            }
        };

        match stop {
            // The line never reached content: whitespace-only, or handed
            // over to an escape region. A non-event; the run flows out
            // verbatim and the levels stay put.
            LineStop::End => Ok(self.lookahead.pop_front().unwrap_or(first)),
            LineStop::Escaped(stopper) => {
                self.lookahead.push_back(stopper);
                Ok(self.lookahead.pop_front().unwrap_or(stopper))
            }
            LineStop::Content(stopper) if stopper == self.newline => {
                self.lookahead.push_back(stopper);
                Ok(self.lookahead.pop_front().unwrap_or(stopper))
            }
            LineStop::Content(stopper) => {
                let change = self.levels.resolve(&run)?;
                if !self.keep_whitespace {
                    self.lookahead.clear();
                }
                match change {
                    LevelChange::Unchanged => {}
                    LevelChange::Deeper => self.lookahead.push_front(self.indent_marker),
                    LevelChange::Shallower(closed) => {
                        for _ in 0..closed {
                            self.lookahead.push_front(self.dedent_marker);
                        }
                    }
                }
                self.lookahead.push_back(stopper);
                Ok(self.lookahead.pop_front().unwrap_or(stopper))
            }
        }
    }

    /// End-of-input: queue one dedent marker per still-open level, then
    /// hand out whatever remains queued.
    fn flush_remaining(&mut self) -> Option<char> {
        let open = self.levels.drain_all();
        for _ in 0..open {
            self.lookahead.push_back(self.dedent_marker);
        }
        self.lookahead.pop_front().map(|c| self.emit(c))
    }

    fn emit(&mut self, c: char) -> char {
        self.at_line_start = c == self.newline;
        c
    }

    // Configuration. Each setter applies to characters read after the call.

    pub fn set_indent_marker(&mut self, marker: char) {
        self.indent_marker = marker;
    }

    pub fn indent_marker(&self) -> char {
        self.indent_marker
    }

    pub fn set_dedent_marker(&mut self, marker: char) {
        self.dedent_marker = marker;
    }

    pub fn dedent_marker(&self) -> char {
        self.dedent_marker
    }

    pub fn set_newline(&mut self, newline: char) {
        self.newline = newline;
    }

    pub fn newline(&self) -> char {
        self.newline
    }

    pub fn set_keep_whitespace(&mut self, keep: bool) {
        self.keep_whitespace = keep;
    }

    pub fn keep_whitespace(&self) -> bool {
        self.keep_whitespace
    }

    pub fn add_whitespace_char(&mut self, c: char) {
        self.whitespace.insert(c);
    }

    pub fn remove_whitespace_char(&mut self, c: char) {
        self.whitespace.remove(&c);
    }

    /// Indentation-significant characters, sorted.
    pub fn whitespace_chars(&self) -> Vec<char> {
        self.whitespace.iter().copied().collect()
    }

    /// Register an escape rule.
    pub fn add_escape(&mut self, rule: EscapeRule) {
        self.escapes.register(rule);
    }

    /// Register a paired-delimiter escape.
    pub fn add_char_escape(&mut self, open: char, close: char) {
        self.escapes.register(EscapeRule::new(open, close));
    }

    /// Register an escape that runs to the end of the line. The close
    /// character is the newline character configured right now.
    pub fn add_single_line_escape(&mut self, open: char) {
        self.escapes.register(EscapeRule::new(open, self.newline));
    }

    pub fn escape_rules(&self) -> &[EscapeRule] {
        self.escapes.rules()
    }

    /// Read-only view of the open levels, shallowest first.
    pub fn levels(&self) -> &[IndentLevel] {
        self.levels.levels()
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.levels.depth()
    }
}

/// Streams stack: a transformed stream is itself a character source.
/// Indentation failures surface as source failures to the next layer up.
impl<S: Source> Source for OffsideStream<S> {
    fn pull(&mut self) -> Result<Option<char>, SourceError> {
        self.read_one().map_err(|err| match err {
            TransformError::Source(inner) => inner,
            TransformError::Indentation(inner) => SourceError::new(inner),
        })
    }

    fn available_hint(&self) -> usize {
        OffsideStream::available_hint(self)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.source.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TextSource;
    use std::cell::Cell;
    use std::rc::Rc;

    fn marked(input: &str) -> String {
        OffsideStream::new(TextSource::new(input))
            .read_to_end()
            .unwrap()
    }

    #[test]
    fn test_flat_text_passes_through() {
        assert_eq!(marked("a\nb\nc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_indent_and_dedent_markers() {
        assert_eq!(marked("Hello\n  World\n"), "Hello\n>World\n<");
    }

    #[test]
    fn test_flush_without_trailing_newline() {
        assert_eq!(marked("Hello\n  World"), "Hello\n>World<");
    }

    #[test]
    fn test_whitespace_only_tail_is_verbatim() {
        assert_eq!(marked("Hello\n  World\n   "), "Hello\n>World\n   <");
    }

    #[test]
    fn test_blank_line_keeps_the_level() {
        assert_eq!(marked("Hello\n  World\n\nBye"), "Hello\n>World\n\n<Bye");
    }

    #[test]
    fn test_misaligned_line_fails_before_content() {
        let mut stream = OffsideStream::new(TextSource::new("a\n  c\n b"));
        let mut out = String::new();
        let err = loop {
            match stream.read_one() {
                Ok(Some(c)) => out.push(c),
                Ok(None) => panic!("expected an indentation failure"),
                Err(err) => break err,
            }
        };
        assert_eq!(out, "a\n>c\n");
        assert!(matches!(err, TransformError::Indentation(_)));
    }

    #[test]
    fn test_markers_are_configurable() {
        let mut stream = OffsideStream::new(TextSource::new("a\n  b\nc"));
        stream.set_indent_marker('{');
        stream.set_dedent_marker('}');
        assert_eq!(stream.read_to_end().unwrap(), "a\n{b\n}c");
    }

    #[test]
    fn test_added_whitespace_char_counts_as_indentation() {
        let mut stream = OffsideStream::new(TextSource::new("a\n_b"));
        stream.add_whitespace_char('_');
        assert_eq!(stream.read_to_end().unwrap(), "a\n>b<");
    }

    #[test]
    fn test_removed_whitespace_char_becomes_content() {
        let mut stream = OffsideStream::new(TextSource::new("a\n\tb"));
        stream.remove_whitespace_char('\t');
        assert_eq!(stream.read_to_end().unwrap(), "a\n\tb");
    }

    #[test]
    fn test_single_line_escape_skips_the_line() {
        let mut stream = OffsideStream::new(TextSource::new("a\n#  x\n  b"));
        stream.add_single_line_escape('#');
        assert_eq!(stream.read_to_end().unwrap(), "a\n#  x\n>b<");
    }

    #[test]
    fn test_paired_escape_spans_lines() {
        let mut stream = OffsideStream::new(TextSource::new("a(\n  b)\nc"));
        stream.add_char_escape('(', ')');
        assert_eq!(stream.read_to_end().unwrap(), "a(\n  b)\nc");
    }

    #[test]
    fn test_keep_whitespace_replays_the_run_after_markers() {
        let mut stream = OffsideStream::new(TextSource::new("a\n  b\n"));
        stream.set_keep_whitespace(true);
        assert_eq!(stream.read_to_end().unwrap(), "a\n>  b\n<");
    }

    #[test]
    fn test_levels_view_tracks_open_prefixes() {
        let mut stream = OffsideStream::new(TextSource::new("a\n  b"));
        assert_eq!(stream.read_one().unwrap(), Some('a'));
        assert_eq!(stream.read_one().unwrap(), Some('\n'));
        assert_eq!(stream.read_one().unwrap(), Some('>'));
        assert_eq!(stream.depth(), 1);
        assert_eq!(stream.levels()[0].text(), "  ");
    }

    #[test]
    fn test_available_hint_prefers_lookahead() {
        let mut stream = OffsideStream::new(TextSource::new("a\n  b"));
        assert_eq!(stream.available_hint(), 5);
        stream.read_one().unwrap();
        stream.read_one().unwrap();
        // Resolving the indent leaves `b` queued behind the marker.
        assert_eq!(stream.read_one().unwrap(), Some('>'));
        assert_eq!(stream.available_hint(), 1);
    }

    struct ClosableProbe {
        closed: Rc<Cell<bool>>,
    }

    impl Source for ClosableProbe {
        fn pull(&mut self) -> Result<Option<char>, SourceError> {
            Ok(None)
        }

        fn close(&mut self) -> Result<(), SourceError> {
            self.closed.set(true);
            Ok(())
        }
    }

    #[test]
    fn test_close_reaches_the_source() {
        let closed = Rc::new(Cell::new(false));
        let stream = OffsideStream::new(ClosableProbe {
            closed: Rc::clone(&closed),
        });
        stream.close().unwrap();
        assert!(closed.get());
    }

    struct FailingSource {
        fired: bool,
    }

    impl Source for FailingSource {
        fn pull(&mut self) -> Result<Option<char>, SourceError> {
            if self.fired {
                Err(SourceError::new("connection dropped"))
            } else {
                self.fired = true;
                Ok(Some('a'))
            }
        }
    }

    #[test]
    fn test_source_failure_passes_through() {
        let mut stream = OffsideStream::new(FailingSource { fired: false });
        assert_eq!(stream.read_one().unwrap(), Some('a'));
        let err = stream.read_one().unwrap_err();
        match err {
            TransformError::Source(inner) => {
                assert!(inner.to_string().contains("connection dropped"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    fn drain_via_source<S: Source>(source: &mut S) -> Result<String, SourceError> {
        let mut out = String::new();
        while let Some(c) = source.pull()? {
            out.push(c);
        }
        Ok(out)
    }

    #[test]
    fn test_stream_is_itself_a_source() {
        let mut stream = OffsideStream::new(TextSource::new("a\n  b\n"));
        assert_eq!(drain_via_source(&mut stream).unwrap(), "a\n>b\n<");
    }

    #[test]
    fn test_indentation_failure_surfaces_to_the_next_layer() {
        let mut stream = OffsideStream::new(TextSource::new("a\n  c\n b"));
        let err = drain_via_source(&mut stream).unwrap_err();
        assert!(err.to_string().contains("indentation error"));
    }
}
