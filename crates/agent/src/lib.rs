//! Context building for the Navigator browser agent.
//!
//! Each decision step the orchestrator needs two things for the model:
//!
//! 1. **System prompt** — the fixed action protocol ([`SystemPromptProvider`])
//! 2. **User message** — page elements, task, history and feedback for this
//!    step ([`ContextAssembler`])
//!
//! The assembler also returns the element-id → locator maps that the action
//! layer needs to act on whatever element the model picks. Sending the
//! prompt, parsing the reply and executing actions happen elsewhere.

pub mod context;
pub mod snapshot;
pub mod system_prompt;

pub use context::{
    AssembledContext, AssemblyError, AssemblyMetadata, ContextAssembler, SectionStats, StepInput,
};
pub use snapshot::{PromptSnapshotWriter, SnapshotFiles, new_task_id};
pub use system_prompt::{SystemPromptProvider, system_prompt};
