//! Escape regions that suspend indentation analysis.
//!
//! An escape rule is an open/close character pair. Between the open
//! character and its close character the transform stops looking at line
//! starts entirely and passes text through verbatim, newlines included.
//! A rule whose close character is the newline escapes the rest of a line.

/// A registered open/close character pair delimiting an escape region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeRule {
    open: char,
    close: char,
}

impl EscapeRule {
    pub fn new(open: char, close: char) -> Self {
        EscapeRule { open, close }
    }

    pub fn open(&self) -> char {
        self.open
    }

    pub fn close(&self) -> char {
        self.close
    }
}

/// Tracks whether the cursor is inside an escape region.
///
/// At most one region is active at a time. Open characters observed while
/// a region is active never start another one, so regions do not nest; the
/// active region simply runs until its close character.
#[derive(Debug, Default)]
pub struct EscapeTracker {
    rules: Vec<EscapeRule>,
    active: Option<usize>,
}

impl EscapeTracker {
    pub fn new() -> Self {
        EscapeTracker::default()
    }

    /// Register a rule. Rules are checked in registration order.
    pub fn register(&mut self, rule: EscapeRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[EscapeRule] {
        &self.rules
    }

    /// Whether a region is active right now.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Feed one observed character and learn whether it lies inside an
    /// escape region. The closing character deactivates the region but is
    /// itself still inside it, and never re-opens one in the same call.
    pub fn observe(&mut self, c: char) -> bool {
        match self.active {
            Some(index) => {
                if c == self.rules[index].close {
                    self.active = None;
                }
                true
            }
            None => match self.rules.iter().position(|rule| rule.open == c) {
                Some(index) => {
                    self.active = Some(index);
                    true
                }
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_characters_pass_through() {
        let mut tracker = EscapeTracker::new();
        tracker.register(EscapeRule::new('(', ')'));
        assert!(!tracker.observe('a'));
        assert!(!tracker.observe(')'));
    }

    #[test]
    fn test_open_activates_until_close() {
        let mut tracker = EscapeTracker::new();
        tracker.register(EscapeRule::new('(', ')'));
        assert!(tracker.observe('('));
        assert!(tracker.observe('x'));
        assert!(tracker.observe('\n'));
        assert!(tracker.observe(')'));
        assert!(!tracker.observe('x'));
    }

    #[test]
    fn test_close_character_is_still_inside() {
        let mut tracker = EscapeTracker::new();
        tracker.register(EscapeRule::new('(', ')'));
        tracker.observe('(');
        assert!(tracker.observe(')'));
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_regions_do_not_nest() {
        let mut tracker = EscapeTracker::new();
        tracker.register(EscapeRule::new('(', ')'));
        tracker.register(EscapeRule::new('[', ']'));
        tracker.observe('(');
        assert!(tracker.observe('['));
        assert!(tracker.observe(')'));
        assert!(!tracker.is_active());
        assert!(!tracker.observe(']'));
    }

    #[test]
    fn test_same_open_and_close_toggles() {
        let mut tracker = EscapeTracker::new();
        tracker.register(EscapeRule::new('"', '"'));
        assert!(tracker.observe('"'));
        assert!(tracker.observe('a'));
        assert!(tracker.observe('"'));
        assert!(!tracker.observe('a'));
    }

    #[test]
    fn test_newline_close_escapes_rest_of_line() {
        let mut tracker = EscapeTracker::new();
        tracker.register(EscapeRule::new('#', '\n'));
        assert!(tracker.observe('#'));
        assert!(tracker.observe('z'));
        assert!(tracker.observe('\n'));
        assert!(!tracker.observe('z'));
    }

    #[test]
    fn test_earlier_registration_wins_on_shared_open() {
        let mut tracker = EscapeTracker::new();
        tracker.register(EscapeRule::new('#', '\n'));
        tracker.register(EscapeRule::new('#', '#'));
        tracker.observe('#');
        assert!(tracker.observe('#'));
        assert!(tracker.is_active());
        assert!(tracker.observe('\n'));
        assert!(!tracker.is_active());
    }
}
