//! Engine configuration profiles loaded from YAML.
//!
//! A profile is the file form of the engine's setter surface: marker
//! characters, newline, whitespace set, keep-whitespace flag, escape
//! rules. Every field is optional; absent fields keep the engine default.
//!
//! ```yaml
//! indent_marker: "{"
//! dedent_marker: "}"
//! whitespace: " \t"
//! escapes:
//!   - open: "("
//!     close: ")"
//!   - open: "#"        # no close: escapes to end of line
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::source::Source;
use crate::stream::OffsideStream;

/// Failure to load a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// The file could not be read.
    Unreadable(String),
    /// The YAML did not describe a profile.
    Malformed(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::Unreadable(msg) => write!(f, "cannot read profile: {}", msg),
            ProfileError::Malformed(msg) => write!(f, "malformed profile: {}", msg),
        }
    }
}

impl Error for ProfileError {}

/// One escape rule as written in a profile. A missing close character
/// makes it a single-line escape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapeEntry {
    pub open: char,
    pub close: Option<char>,
}

/// A complete engine configuration in file form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub indent_marker: Option<char>,
    pub dedent_marker: Option<char>,
    pub newline: Option<char>,
    pub keep_whitespace: Option<bool>,
    /// Replacement whitespace set; each character of the string counts.
    pub whitespace: Option<String>,
    #[serde(default)]
    pub escapes: Vec<EscapeEntry>,
}

impl Profile {
    pub fn from_yaml(text: &str) -> Result<Self, ProfileError> {
        serde_yaml::from_str(text).map_err(|err| ProfileError::Malformed(err.to_string()))
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|err| ProfileError::Unreadable(err.to_string()))?;
        Self::from_yaml(&text)
    }

    /// Reconfigure a stream in place. The whitespace set is replaced
    /// wholesale when given; escapes are appended in order, single-line
    /// entries closing on the newline this same profile configures.
    pub fn apply<S: Source>(&self, stream: &mut OffsideStream<S>) {
        if let Some(marker) = self.indent_marker {
            stream.set_indent_marker(marker);
        }
        if let Some(marker) = self.dedent_marker {
            stream.set_dedent_marker(marker);
        }
        if let Some(newline) = self.newline {
            stream.set_newline(newline);
        }
        if let Some(keep) = self.keep_whitespace {
            stream.set_keep_whitespace(keep);
        }
        if let Some(ref replacement) = self.whitespace {
            for c in stream.whitespace_chars() {
                stream.remove_whitespace_char(c);
            }
            for c in replacement.chars() {
                stream.add_whitespace_char(c);
            }
        }
        for escape in &self.escapes {
            match escape.close {
                Some(close) => stream.add_char_escape(escape.open, close),
                None => stream.add_single_line_escape(escape.open),
            }
        }
    }
}
