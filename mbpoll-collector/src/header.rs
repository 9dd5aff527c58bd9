//! Column header discovery.
//!
//! The header is learned from the labels produced during the first poll
//! cycle, then frozen. Later cycles never change it, even when a composite
//! value starts exposing different keys.

use std::mem;

/// Two-state header: collecting labels, or fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderTracker {
    Learning(Vec<String>),
    Frozen(Vec<String>),
}

impl Default for HeaderTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderTracker {
    /// Start in the learning state with no labels.
    pub fn new() -> Self {
        HeaderTracker::Learning(Vec::new())
    }

    /// Append labels. Ignored once frozen.
    pub fn record<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let HeaderTracker::Learning(current) = self {
            current.extend(labels.into_iter().map(Into::into));
        }
    }

    /// Switch to the frozen state.
    ///
    /// Returns true only on the call that performed the transition, so the
    /// caller knows when to emit the header.
    pub fn freeze(&mut self) -> bool {
        match self {
            HeaderTracker::Learning(labels) => {
                let labels = mem::take(labels);
                *self = HeaderTracker::Frozen(labels);
                true
            }
            HeaderTracker::Frozen(_) => false,
        }
    }

    pub fn is_learning(&self) -> bool {
        matches!(self, HeaderTracker::Learning(_))
    }

    pub fn current_header(&self) -> &[String] {
        match self {
            HeaderTracker::Learning(labels) | HeaderTracker::Frozen(labels) => labels,
        }
    }

    /// Header rendered as a comma-joined line.
    pub fn header_line(&self) -> String {
        self.current_header().join(",")
    }
}
