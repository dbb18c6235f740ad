//! Syntax-directed highlighting engine.
//!
//! A language compiles a set of selectors ([`style_tags`]) into rules
//! attached to its node types; a theme defines a [`HighlightStyle`]
//! mapping abstract [`Tag`]s to classes; [`highlight_tree`] walks a
//! parsed [`comet_tree::Tree`] and emits ordered, coalesced
//! `(from, to, classes)` spans for a byte range.

use thiserror::Error;

pub mod highlight;
pub mod rule;
pub mod style;
pub mod tag;
pub mod tags;

pub use highlight::{highlight_code, highlight_tree};
pub use rule::{HIGHLIGHT_RULES, Highlighting, Mode, Rule, style_tags};
pub use style::{
    CLASS_HIGHLIGHT_STYLE, CombinedMatcher, HighlightStyle, StyleOptions,
    TagMatcher, TagStyle,
};
pub use tag::{Modifier, Tag};

/// Represents the ways defining tags and selectors can fail. Highlighting
/// itself is total and raises no errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HighlightError {
    #[error("cannot derive from a modified tag")]
    InvalidParent,
    #[error("invalid path: {0}")]
    InvalidPath(String),
}
