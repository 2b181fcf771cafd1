//! `navigator build` — Assemble the user message for one decision step.
//!
//! The highlighter itself runs next to the browser; this command replays
//! its captured output (`--highlight`) against a DOM snapshot (`--dom`).

use clap::Args;
use navigator_agent::{ContextAssembler, PromptSnapshotWriter, StepInput, new_task_id, system_prompt};
use navigator_config::AppConfig;
use navigator_core::{DomState, OpenTab, RecordedHighlight};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// DOM snapshot (JSON: url + element_tree)
    #[arg(long)]
    pub dom: PathBuf,

    /// Captured highlighter output (JSON: text, xpath_map, selector_map)
    #[arg(long)]
    pub highlight: PathBuf,

    /// The user's end goal
    #[arg(short, long)]
    pub task: Option<String>,

    /// Prior steps (JSON list of {url, actions})
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Result of the last action
    #[arg(short, long)]
    pub result: Option<String>,

    /// Open tabs (JSON list of {id, url, title, active})
    #[arg(long)]
    pub tabs: Option<PathBuf>,

    /// Print the full assembly (message, maps, metadata) as JSON
    #[arg(long)]
    pub json: bool,

    /// Write a prompt snapshot even if snapshots are disabled in config
    #[arg(long)]
    pub save: bool,

    /// Task id used for snapshot file names (generated if omitted)
    #[arg(long)]
    pub task_id: Option<String>,
}

pub fn run(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let dom: DomState = read_json(&args.dom)?;
    let highlight = RecordedHighlight::from_json(&std::fs::read_to_string(&args.highlight)?)?;
    let history = match &args.history {
        Some(path) => read_history(path)?,
        None => Vec::new(),
    };
    let tabs: Vec<OpenTab> = match &args.tabs {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    tracing::debug!(
        url = %dom.url,
        nodes = dom.element_tree.len(),
        elements = dom.element_count(),
        history = history.len(),
        "Loaded step inputs"
    );

    let mut input = StepInput::new(&dom)
        .with_history(&history)
        .with_open_tabs(&tabs);
    if let Some(task) = args.task.as_deref() {
        input = input.with_task(task);
    }
    if let Some(result) = args.result.as_deref() {
        input = input.with_last_result(result);
    }

    let assembler = ContextAssembler::from_config(highlight, &config.context);
    let context = assembler.build(&input)?;

    if args.save || config.snapshots.enabled {
        let task_id = args.task_id.clone().unwrap_or_else(new_task_id);
        let files =
            PromptSnapshotWriter::from_config(&config.snapshots).write(&task_id, system_prompt(), &context)?;
        tracing::info!(prompt = %files.prompt.display(), maps = %files.maps.display(), "Snapshot saved");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        print!("{}", context.message);
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> navigator_core::Result<T> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// History is normally a list; anything else is treated as a single entry
/// and left to history decoding to accept or skip.
fn read_history(path: &Path) -> navigator_core::Result<Vec<Value>> {
    Ok(match read_json::<Value>(path)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    })
}
