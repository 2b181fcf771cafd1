//! Prompt snapshots: the exact text sent for a step, kept on disk for
//! debugging and replay.
//!
//! Layout under the snapshot directory:
//!
//! - `{task_id}_dom_snapshot_prompt.txt` — system prompt, newline, user message
//! - `{task_id}_element_maps.json` — the xpath and selector maps

use crate::context::AssembledContext;
use chrono::Utc;
use navigator_config::SnapshotConfig;
use navigator_core::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Generate a task id of the form `task_20260101_120000_1a2b3c4d`.
pub fn new_task_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("task_{}_{}", Utc::now().format("%Y%m%d_%H%M%S"), &suffix[..8])
}

/// Paths written for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFiles {
    pub prompt: PathBuf,
    pub maps: PathBuf,
}

#[derive(Serialize)]
struct MapsFile<'a> {
    task_id: &'a str,
    xpath_map: &'a navigator_core::XPathMap,
    selector_map: &'a navigator_core::SelectorMap,
}

/// Writes prompt snapshots into one directory.
#[derive(Debug, Clone)]
pub struct PromptSnapshotWriter {
    dir: PathBuf,
}

impl PromptSnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(&config.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the prompt and maps for `task_id`, creating the directory if
    /// needed. Existing files for the same task are overwritten.
    pub fn write(
        &self,
        task_id: &str,
        system_prompt: &str,
        context: &AssembledContext,
    ) -> Result<SnapshotFiles> {
        if task_id.is_empty()
            || task_id.contains(['/', '\\'])
            || task_id.contains("..")
        {
            return Err(Error::Config {
                message: format!("task id {task_id:?} is not usable as a file name"),
            });
        }

        std::fs::create_dir_all(&self.dir)?;

        let prompt = self.dir.join(format!("{task_id}_dom_snapshot_prompt.txt"));
        std::fs::write(&prompt, format!("{system_prompt}\n{}", context.message))?;

        let maps = self.dir.join(format!("{task_id}_element_maps.json"));
        let body = serde_json::to_string_pretty(&MapsFile {
            task_id,
            xpath_map: &context.xpath_map,
            selector_map: &context.selector_map,
        })?;
        std::fs::write(&maps, body)?;

        info!(task_id, path = %prompt.display(), "Wrote prompt snapshot");
        Ok(SnapshotFiles { prompt, maps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextAssembler, StepInput};
    use navigator_core::{DomState, RecordedHighlight};

    fn assembled() -> AssembledContext {
        let page = RecordedHighlight::from_json(
            r#"{"text": "[E1]<input text/>",
                "xpath_map": {"E1": "/html/body/input"},
                "selector_map": {"E1": "input[type='text']"}}"#,
        )
        .unwrap();
        let dom = DomState::new("https://x.test/login");
        ContextAssembler::new(page)
            .build(&StepInput::new(&dom).with_task("Log in"))
            .unwrap()
    }

    #[test]
    fn task_id_shape() {
        let id = new_task_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 4, "{id}");
        assert_eq!(parts[0], "task");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 8);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_task_id(), new_task_id());
    }

    #[test]
    fn writes_prompt_and_maps() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PromptSnapshotWriter::new(dir.path().join("snapshots"));
        let ctx = assembled();

        let files = writer.write("task_1", "SYSTEM", &ctx).unwrap();
        assert!(files.prompt.ends_with("task_1_dom_snapshot_prompt.txt"));

        let prompt = std::fs::read_to_string(&files.prompt).unwrap();
        assert_eq!(prompt, format!("SYSTEM\n{}", ctx.message));

        let maps: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files.maps).unwrap()).unwrap();
        assert_eq!(maps["task_id"], "task_1");
        assert_eq!(maps["xpath_map"]["E1"], "/html/body/input");
        assert_eq!(maps["selector_map"]["E1"], "input[type='text']");
    }

    #[test]
    fn rejects_path_like_task_ids() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PromptSnapshotWriter::new(dir.path());
        let ctx = assembled();
        for bad in ["", "../escape", "a/b", "a\\b"] {
            assert!(writer.write(bad, "SYSTEM", &ctx).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn from_config_uses_configured_dir() {
        let config = SnapshotConfig {
            enabled: true,
            dir: PathBuf::from("/tmp/navigator-snaps"),
        };
        let writer = PromptSnapshotWriter::from_config(&config);
        assert_eq!(writer.dir(), Path::new("/tmp/navigator-snaps"));
    }
}
