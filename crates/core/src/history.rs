//! Prior-step history, decoded at the boundary.
//!
//! History arrives from the orchestrating loop as loosely shaped JSON. Steps
//! may not be objects, `actions` may be a single object instead of a list,
//! individual actions may be junk. [`decode_history`] makes one pass over the
//! raw input and turns every entry into a [`DecodedStep`]: either a valid step
//! the renderer can trust, or a skipped one carrying the reason.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// The kind of JSON value found where something else was expected.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Action types the model may emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ActionKind {
    Click,
    Input,
    Scroll,
    Url,
    SwitchToTab,
    /// Anything else, kept verbatim. Empty when the record had no type.
    Other(String),
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "click" => Self::Click,
            "input" => Self::Input,
            "scroll" => Self::Scroll,
            "url" => Self::Url,
            "switchToTab" => Self::SwitchToTab,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire name, as the model writes it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::Scroll => "scroll",
            Self::Url => "url",
            Self::SwitchToTab => "switchToTab",
            Self::Other(raw) => raw,
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector pair carried by records written before element ids existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacySelector {
    pub xpath_ref: String,
    pub selector: String,
}

/// One action taken in a prior step.
///
/// Scalar payloads are kept in their textual form; `null` counts as absent.
/// `text` and `url` are also absent when falsy (`false`, `0`, `""`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_selector: Option<LegacySelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
}

impl ActionRecord {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            element_id: None,
            legacy_selector: None,
            text: None,
            url: None,
            amount: None,
            tab_id: None,
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        let kind = obj
            .get("type")
            .and_then(scalar_text)
            .map(|t| ActionKind::parse(&t))
            .unwrap_or_else(|| ActionKind::Other(String::new()));

        let legacy_selector = match (
            obj.get("xpath_ref").and_then(scalar_text),
            obj.get("selector").and_then(scalar_text),
        ) {
            (Some(xpath_ref), Some(selector)) => Some(LegacySelector {
                xpath_ref,
                selector,
            }),
            _ => None,
        };

        Self {
            kind,
            element_id: obj.get("element_id").and_then(scalar_text),
            legacy_selector,
            text: obj.get("text").filter(|v| !is_falsy(v)).and_then(scalar_text),
            url: obj.get("url").filter(|v| !is_falsy(v)).and_then(scalar_text),
            amount: obj.get("amount").and_then(scalar_text),
            tab_id: obj.get("tab_id").and_then(scalar_text),
        }
    }
}

/// Textual form of a JSON scalar. Nested values are rendered compactly.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// An action entry dropped from an otherwise valid step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAction {
    /// 0-based position within the step's action list.
    pub index: usize,
    pub found: &'static str,
}

/// A prior step that survived validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStep {
    /// 1-based position in the raw history.
    pub number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub actions: Vec<ActionRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_actions: Vec<SkippedAction>,
}

/// Why a history entry was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The entry itself is not an object.
    NotARecord { found: &'static str },
    /// `actions` is missing, null, empty or otherwise falsy.
    NoActions,
    /// `actions` is neither a list nor a single action object.
    ActionsNotASequence { found: &'static str },
    /// Every action entry was malformed.
    NoUsableActions,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotARecord { found } => write!(f, "history entry is a {found}, not an object"),
            Self::NoActions => f.write_str("no actions recorded"),
            Self::ActionsNotASequence { found } => {
                write!(f, "actions is a {found}, not a list")
            }
            Self::NoUsableActions => f.write_str("no well-formed actions"),
        }
    }
}

/// A history entry that was left out, with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStep {
    /// 1-based position in the raw history.
    pub number: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Result of decoding one raw history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedStep {
    Valid(HistoryStep),
    Skipped(SkippedStep),
}

/// Decode raw history entries, in order. Never fails: malformed entries come
/// back as [`DecodedStep::Skipped`].
pub fn decode_history(raw: &[Value]) -> Vec<DecodedStep> {
    raw.iter()
        .enumerate()
        .map(|(i, entry)| decode_step(i + 1, entry))
        .collect()
}

fn decode_step(number: usize, entry: &Value) -> DecodedStep {
    let skip = |reason| DecodedStep::Skipped(SkippedStep { number, reason });

    let Value::Object(obj) = entry else {
        return skip(SkipReason::NotARecord {
            found: json_kind(entry),
        });
    };

    let url = obj.get("url").and_then(scalar_text);
    let raw_actions: Vec<&Value> = match obj.get("actions") {
        None => return skip(SkipReason::NoActions),
        Some(v) if is_falsy(v) => return skip(SkipReason::NoActions),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        Some(other) => {
            return skip(SkipReason::ActionsNotASequence {
                found: json_kind(other),
            });
        }
    };

    let mut actions = Vec::with_capacity(raw_actions.len());
    let mut skipped_actions = Vec::new();
    for (index, action) in raw_actions.into_iter().enumerate() {
        match action {
            Value::Object(fields) => actions.push(ActionRecord::from_object(fields)),
            other => skipped_actions.push(SkippedAction {
                index,
                found: json_kind(other),
            }),
        }
    }

    if actions.is_empty() {
        return skip(SkipReason::NoUsableActions);
    }

    DecodedStep::Valid(HistoryStep {
        number,
        url,
        actions,
        skipped_actions,
    })
}

/// Values the orchestrator uses to mean "nothing here".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}
