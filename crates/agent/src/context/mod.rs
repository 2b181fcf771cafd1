//! Per-step context assembly pipeline.
//!
//! Turns a page snapshot, the task, prior history and last-result feedback
//! into the user message for one decision step, plus the locator maps the
//! action layer uses to resolve the model's chosen element ids.
//!
//! # Sections (in message order)
//!
//! | Section | Source | When present |
//! |---------|--------|--------------|
//! | Task | caller | task given and non-empty |
//! | Current URL | DOM snapshot | always |
//! | Interactive elements | highlighter | always |
//! | Action history | decoded history | at least one valid step |
//! | Last result | caller | result given and non-empty |
//! | Open tabs | caller | tabs given |
//! | Reminders | fixed | always |

pub mod assembler;
pub mod history;
pub mod token;

pub use assembler::{
    AssembledContext, AssemblyError, AssemblyMetadata, ContextAssembler, SectionStats, StepInput,
};
pub use history::{render_action, render_step};
