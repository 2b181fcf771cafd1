//! Per-step context assembly — the user message for one decision step.
//!
//! Assembles the message from labelled sections, always in this order:
//!
//! 1. **Task** — the end goal, if one was given
//! 2. **Current URL** — always
//! 3. **Interactive elements** — always; the highlighter's listing
//! 4. **Action history** — prior steps that survived decoding, if any
//! 5. **Last result** — feedback from the previous action, if any
//! 6. **Open tabs** — if the orchestrator supplied them
//! 7. **Reminders** — fixed trailer
//!
//! The two locator maps produced by the highlighter are handed back
//! untouched next to the message; they were validated against the listing
//! when the [`HighlightedDom`](navigator_core::HighlightedDom) was built.
//!
//! # Determinism
//!
//! Identical inputs and an identical highlighter output always produce a
//! byte-identical message. No random or time-dependent logic is used.

use crate::context::history::{HISTORY_HEADER, render_step};
use crate::context::token;
use navigator_config::ContextConfig;
use navigator_core::dom::{DEFAULT_ELEMENT_ATTRIBUTES, DomState, OpenTab};
use navigator_core::highlight::{HighlightDomGenerator, HighlightError, SelectorMap, XPathMap};
use navigator_core::history::{DecodedStep, HistoryStep, SkippedStep, decode_history};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

const ELEMENTS_HEADER: &str =
    "INTERACTIVE ELEMENTS:\n(Only elements with [E#] IDs can be interacted with)\n";

const REMINDERS: &str = concat!(
    "\nREMINDERS:\n",
    "- Use EXACT element IDs (E1, E2, etc.) as shown above\n",
    "- For input actions, include both element_id and text\n",
    "- Only set is_done:true when the entire task is complete\n",
);

// ── Types ─────────────────────────────────────────────────────────────────

/// Everything one decision step contributes to the user message.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    /// Snapshot of the current page.
    pub dom_state: &'a DomState,
    /// The user's end goal.
    pub task: Option<&'a str>,
    /// Raw history records from the orchestrator, oldest first.
    pub history: &'a [Value],
    /// Feedback from executing the previous step's actions.
    pub last_result: Option<&'a str>,
    /// Open browser tabs.
    pub open_tabs: &'a [OpenTab],
}

impl<'a> StepInput<'a> {
    /// Input with only the page snapshot; every optional section empty.
    pub fn new(dom_state: &'a DomState) -> Self {
        Self {
            dom_state,
            task: None,
            history: &[],
            last_result: None,
            open_tabs: &[],
        }
    }

    pub fn with_task(mut self, task: &'a str) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_history(mut self, history: &'a [Value]) -> Self {
        self.history = history;
        self
    }

    pub fn with_last_result(mut self, result: &'a str) -> Self {
        self.last_result = Some(result);
        self
    }

    pub fn with_open_tabs(mut self, tabs: &'a [OpenTab]) -> Self {
        self.open_tabs = tabs;
        self
    }
}

/// The assembled user message plus the locator maps for action resolution.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledContext {
    /// The user-turn text.
    pub message: String,
    /// Element identifier → xpath.
    pub xpath_map: XPathMap,
    /// Element identifier → CSS selector.
    pub selector_map: SelectorMap,
    /// Assembly metadata (section sizes, history diagnostics).
    pub metadata: AssemblyMetadata,
}

impl AssembledContext {
    /// `(message, xpath_map, selector_map)`.
    pub fn into_parts(self) -> (String, XPathMap, SelectorMap) {
        (self.message, self.xpath_map, self.selector_map)
    }
}

/// Detailed metadata about one assembly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssemblyMetadata {
    /// Estimated tokens in the whole message.
    pub estimated_tokens: usize,
    /// Per-section statistics, in message order.
    pub sections: Vec<SectionStats>,
    /// Interactive elements in the listing.
    pub element_count: usize,
    /// History steps rendered into the message.
    pub steps_rendered: usize,
    /// Valid history steps left out by the history window.
    pub steps_windowed_out: usize,
    /// History entries that failed decoding.
    pub skipped_steps: Vec<SkippedStep>,
}

/// Statistics for a single message section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    /// Section name.
    pub name: String,
    /// Estimated tokens for this section.
    pub tokens: usize,
}

/// Errors from context assembly. Fatal for the step; retrying with the same
/// snapshot gives the same result.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("Could not render interactive elements: {0}")]
    Highlight(#[from] HighlightError),
}

/// Outcome of rendering the history section.
struct HistorySection {
    text: Option<String>,
    rendered: usize,
    windowed_out: usize,
    skipped: Vec<SkippedStep>,
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The context assembler. Holds no per-step state; create one and reuse it.
pub struct ContextAssembler<G> {
    generator: G,
    attributes: Vec<String>,
    max_history_steps: Option<usize>,
}

impl<G: HighlightDomGenerator> ContextAssembler<G> {
    /// Create an assembler with the default attribute whitelist and no
    /// history window.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            attributes: DEFAULT_ELEMENT_ATTRIBUTES
                .iter()
                .map(|a| a.to_string())
                .collect(),
            max_history_steps: None,
        }
    }

    /// Create an assembler from the `[context]` configuration section.
    pub fn from_config(generator: G, config: &ContextConfig) -> Self {
        Self::new(generator)
            .with_attributes(config.attributes.clone())
            .with_max_history_steps(config.max_history_steps)
    }

    /// Replace the attribute whitelist passed to the highlighter.
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Render only the most recent `max` valid history steps.
    pub fn with_max_history_steps(mut self, max: Option<usize>) -> Self {
        self.max_history_steps = max;
        self
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Build the user message for one step.
    ///
    /// # Algorithm
    ///
    /// 1. Ask the highlighter for the element listing and locator maps
    ///    (failure → error, nothing else is attempted)
    /// 2. Decode history; skipped entries are logged and reported in metadata
    /// 3. Emit the sections in fixed order, omitting empty optional ones
    /// 4. Return the message with the maps from step 1
    pub fn build(&self, input: &StepInput<'_>) -> Result<AssembledContext, AssemblyError> {
        let highlighted = self.generator.generate(input.dom_state, &self.attributes)?;
        let element_count = highlighted.element_count();
        let (listing, xpath_map, selector_map) = highlighted.into_parts();

        let mut sections: Vec<(&str, String)> = Vec::new();

        if let Some(task) = input.task.filter(|t| !t.is_empty()) {
            sections.push(("task", format!("MAIN TASK (END GOAL): {task}\n\n")));
        }

        sections.push(("url", format!("CURRENT URL: {}\n\n", input.dom_state.url)));
        sections.push((
            "interactive_elements",
            format!("{ELEMENTS_HEADER}{listing}\n"),
        ));

        let history = self.render_history(input.history);
        if let Some(text) = &history.text {
            sections.push(("history", text.clone()));
        }

        if let Some(result) = input.last_result.filter(|r| !r.is_empty()) {
            sections.push(("last_result", format!("RESULT OF LAST ACTION:\n{result}\n")));
        }

        if !input.open_tabs.is_empty() {
            sections.push(("open_tabs", Self::render_open_tabs(input.open_tabs)));
        }

        sections.push(("reminders", REMINDERS.to_string()));

        let message: String = sections.iter().map(|(_, text)| text.as_str()).collect();
        let stats: Vec<SectionStats> = sections
            .iter()
            .map(|(name, text)| SectionStats {
                name: (*name).into(),
                tokens: token::estimate_tokens(text),
            })
            .collect();
        let estimated_tokens = token::estimate_tokens(&message);

        debug!(
            url = %input.dom_state.url,
            elements = element_count,
            steps_rendered = history.rendered,
            steps_skipped = history.skipped.len(),
            estimated_tokens,
            "Assembled step context"
        );

        Ok(AssembledContext {
            message,
            xpath_map,
            selector_map,
            metadata: AssemblyMetadata {
                estimated_tokens,
                sections: stats,
                element_count,
                steps_rendered: history.rendered,
                steps_windowed_out: history.windowed_out,
                skipped_steps: history.skipped,
            },
        })
    }

    // ── Private section renderers ─────────────────────────────────────────

    fn render_history(&self, raw: &[Value]) -> HistorySection {
        let mut valid: Vec<HistoryStep> = Vec::new();
        let mut skipped: Vec<SkippedStep> = Vec::new();

        for decoded in decode_history(raw) {
            match decoded {
                DecodedStep::Valid(step) => {
                    for action in &step.skipped_actions {
                        warn!(
                            step = step.number,
                            index = action.index,
                            found = action.found,
                            "Dropping malformed history action"
                        );
                    }
                    valid.push(step);
                }
                DecodedStep::Skipped(step) => {
                    warn!(step = step.number, reason = %step.reason, "Skipping history step");
                    skipped.push(step);
                }
            }
        }

        // Oldest steps go first when a window is set.
        let windowed_out = match self.max_history_steps {
            Some(max) if valid.len() > max => valid.len() - max,
            _ => 0,
        };
        let kept = &valid[windowed_out..];

        let text = if kept.is_empty() {
            None
        } else {
            let mut out = String::from(HISTORY_HEADER);
            match windowed_out {
                0 => {}
                1 => out.push_str("(1 earlier step omitted)\n"),
                n => out.push_str(&format!("({n} earlier steps omitted)\n")),
            }
            for step in kept {
                out.push_str(&render_step(step));
            }
            Some(out)
        };

        HistorySection {
            text,
            rendered: kept.len(),
            windowed_out,
            skipped,
        }
    }

    fn render_open_tabs(tabs: &[OpenTab]) -> String {
        let mut out = String::from("OPEN TABS:\n");
        for tab in tabs {
            out.push_str(&format!(
                "- [{}] {} ({})",
                tab.id,
                tab.title.as_deref().unwrap_or("untitled"),
                tab.url
            ));
            if tab.active {
                out.push_str(" (current)");
            }
            out.push('\n');
        }
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
