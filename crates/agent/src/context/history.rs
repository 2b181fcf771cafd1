//! Rendering of decoded history steps.
//!
//! Only ever sees [`HistoryStep`]s that passed decoding; skipped entries are
//! reported by the assembler, not rendered.

use navigator_core::history::{ActionRecord, HistoryStep};
use std::fmt::Write as _;

pub(crate) const HISTORY_HEADER: &str = "\nACTION HISTORY:\n";

/// Render one step: a `Step N: URL: ...` line, one bullet per action and a
/// trailing blank line.
pub fn render_step(step: &HistoryStep) -> String {
    let mut out = format!(
        "Step {}: URL: {}\n",
        step.number,
        step.url.as_deref().unwrap_or("unknown")
    );
    for action in &step.actions {
        out.push_str("  - ");
        out.push_str(&render_action(action));
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Render a single action, e.g. `INPUT element [E3] with text: 'hello'`.
///
/// Clauses are appended in a fixed order and only when their field is set.
pub fn render_action(action: &ActionRecord) -> String {
    let mut line = action.kind.as_str().to_uppercase();

    if let Some(id) = &action.element_id {
        let _ = write!(line, " element [{id}]");
    } else if let Some(legacy) = &action.legacy_selector {
        let _ = write!(line, " element with selector: {}", legacy.selector);
    }
    if let Some(text) = action.text.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(line, " with text: '{text}'");
    }
    if let Some(url) = action.url.as_deref().filter(|u| !u.is_empty()) {
        let _ = write!(line, " to URL: {url}");
    }
    if let Some(amount) = &action.amount {
        let _ = write!(line, " by {amount} pixels");
    }
    if let Some(tab) = &action.tab_id {
        let _ = write!(line, " to tab: {tab}");
    }

    line
}
