//! Indentation levels and the prefix-chain resolver.
//!
//! Nesting depth is a stack of literal whitespace prefixes, one entry per
//! open level, shallowest first. A freshly read run is matched against the
//! stack bottom-up: each entry's text is stripped off the front of the run
//! while it matches, and whatever is left decides between staying on the
//! level, opening a deeper one, or closing some. Comparison is by exact
//! character sequence; there is no tab-width arithmetic.

use std::error::Error;
use std::fmt;

/// One nesting level's whitespace prefix, exactly as it appeared on the
/// line that introduced it. Never empty, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentLevel(String);

impl IndentLevel {
    pub(crate) fn new(text: String) -> Self {
        debug_assert!(!text.is_empty());
        IndentLevel(text)
    }

    /// The literal prefix text.
    pub fn text(&self) -> &str {
        &self.0
    }
}

/// How a freshly read whitespace run relates to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChange {
    /// Same depth as the previous line.
    Unchanged,
    /// One level deeper; the extension was pushed.
    Deeper,
    /// This many levels were closed.
    Shallower(usize),
}

/// Malformed indentation: the run neither extends the deepest level nor
/// aligns exactly with an ancestor level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentationError {
    run: String,
    matched: usize,
    depth: usize,
}

impl IndentationError {
    /// The offending whitespace run.
    pub fn run(&self) -> &str {
        &self.run
    }

    /// How many open levels the run matched before diverging.
    pub fn matched_levels(&self) -> usize {
        self.matched
    }

    /// Stack depth when the run was resolved.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Display for IndentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "indentation error: whitespace run {:?} matches {} of {} open levels and does not open a deeper one",
            self.run, self.matched, self.depth
        )
    }
}

impl Error for IndentationError {}

/// Ordered set of open indentation levels, shallowest first.
#[derive(Debug, Clone, Default)]
pub struct LevelStack {
    levels: Vec<IndentLevel>,
}

impl LevelStack {
    pub fn new() -> Self {
        LevelStack { levels: Vec::new() }
    }

    /// Number of open levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Read-only view of the open levels, shallowest first.
    pub fn levels(&self) -> &[IndentLevel] {
        &self.levels
    }

    /// Close every open level, returning how many there were.
    pub fn drain_all(&mut self) -> usize {
        let open = self.levels.len();
        self.levels.clear();
        open
    }

    /// Match `run` against the stack and mutate it accordingly.
    ///
    /// - every level matched, nothing left: [`LevelChange::Unchanged`]
    /// - every level matched, tail left: push the tail, [`LevelChange::Deeper`]
    /// - some levels matched, nothing left: pop the rest, [`LevelChange::Shallower`]
    /// - some levels matched, tail left: [`IndentationError`]
    pub fn resolve(&mut self, run: &str) -> Result<LevelChange, IndentationError> {
        let (matched, remainder) = self.match_prefix_chain(run);
        let depth = self.levels.len();
        if matched == depth {
            if remainder.is_empty() {
                Ok(LevelChange::Unchanged)
            } else {
                self.levels.push(IndentLevel::new(remainder.to_string()));
                Ok(LevelChange::Deeper)
            }
        } else if remainder.is_empty() {
            let closed = depth - matched;
            self.levels.truncate(matched);
            Ok(LevelChange::Shallower(closed))
        } else {
            Err(IndentationError {
                run: run.to_string(),
                matched,
                depth,
            })
        }
    }

    /// Strip each level's text off the front of `run` while it matches,
    /// bottom-up. Returns the match count and the unmatched tail.
    fn match_prefix_chain<'a>(&self, run: &'a str) -> (usize, &'a str) {
        let mut rest = run;
        let mut matched = 0;
        for level in &self.levels {
            match rest.strip_prefix(level.text()) {
                Some(stripped) => {
                    rest = stripped;
                    matched += 1;
                }
                None => break,
            }
        }
        (matched, rest)
    }
}
