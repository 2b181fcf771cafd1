//! # Navigator Core
//!
//! Domain types, traits, and error definitions for the Navigator browser
//! agent. This crate has no framework dependencies: it defines the page
//! snapshot model, the highlighting boundary and the decoded history that
//! the context pipeline is built against.
//!
//! ## Boundaries
//!
//! - [`HighlightDomGenerator`] is the seam to the DOM highlighter. Its output,
//!   [`HighlightedDom`], is validated on construction so callers never see a
//!   listing whose identifiers disagree with the locator maps.
//! - [`decode_history`] is the seam to the orchestrator's loosely shaped
//!   history. Malformed entries become [`DecodedStep::Skipped`] instead of
//!   errors.

pub mod dom;
pub mod error;
pub mod highlight;
pub mod history;

// Re-export key types at crate root for ergonomics
pub use dom::{DEFAULT_ELEMENT_ATTRIBUTES, DomNode, DomState, ElementNode, OpenTab, TextNode};
pub use error::{Error, Result};
pub use highlight::{
    ElementId, HighlightDomGenerator, HighlightError, HighlightedDom, RecordedHighlight,
    SelectorMap, XPathMap,
};
pub use history::{
    ActionKind, ActionRecord, DecodedStep, HistoryStep, LegacySelector, SkipReason,
    SkippedAction, SkippedStep, decode_history,
};
