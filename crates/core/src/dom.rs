//! Page snapshot domain types.
//!
//! A [`DomState`] is produced fresh for every decision step by the page-side
//! collector and is read-only to everything in this workspace. The element
//! tree mirrors the collector's wire format (camelCase field names, node keys
//! as strings, children referenced by numeric key).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Attributes surfaced per element unless configuration says otherwise.
///
/// Kept short on purpose: every extra attribute is repeated for every
/// element in every step.
pub const DEFAULT_ELEMENT_ATTRIBUTES: &[&str] =
    &["id", "name", "type", "value", "placeholder", "href"];

/// Snapshot of the current page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomState {
    /// URL of the page the snapshot was taken from.
    pub url: String,

    /// Flattened node table, keyed by the collector's node key.
    #[serde(default)]
    pub element_tree: BTreeMap<String, DomNode>,
}

impl DomState {
    /// A snapshot with a URL and no nodes.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            element_tree: BTreeMap::new(),
        }
    }

    /// Number of element (non-text) nodes in the tree.
    pub fn element_count(&self) -> usize {
        self.element_tree
            .values()
            .filter(|n| matches!(n, DomNode::Element(_)))
            .count()
    }
}

/// One entry of the element tree.
///
/// Text nodes are tried first: they are the only variant with a `text`
/// field, so element nodes never match them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomNode {
    Text(TextNode),
    Element(ElementNode),
}

/// A visible or hidden run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    #[serde(rename = "type", default = "text_node_type")]
    pub node_type: String,
    pub text: String,
    #[serde(default)]
    pub is_visible: bool,
}

fn text_node_type() -> String {
    "TEXT_NODE".into()
}

/// An element node as reported by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag_name: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub xpath: String,
    #[serde(default)]
    pub children: Vec<u64>,
    #[serde(default)]
    pub is_interactive: bool,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub is_top_element: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_root: Option<bool>,
}

/// An open browser tab, as reported by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTab {
    /// Identifier the model passes back in a `switchToTab` action.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whether this is the tab the snapshot was taken from.
    #[serde(default)]
    pub active: bool,
}

/// Browsers hand out numeric tab ids; the wire sometimes carries them as strings.
fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number tab id, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collector_snapshot() {
        let json = r#"{
            "url": "https://x.test/login",
            "element_tree": {
                "1": {
                    "tagName": "input",
                    "attributes": {"type": "text", "name": "user"},
                    "xpath": "/html/body/form/input[1]",
                    "children": [],
                    "isInteractive": true,
                    "isVisible": true,
                    "isTopElement": true,
                    "viewportCoordinates": {"center": {"x": 1.0, "y": 2.0}}
                },
                "2": {"type": "TEXT_NODE", "text": "Username", "isVisible": true}
            }
        }"#;
        let state: DomState = serde_json::from_str(json).unwrap();
        assert_eq!(state.url, "https://x.test/login");
        assert_eq!(state.element_tree.len(), 2);
        assert_eq!(state.element_count(), 1);

        match &state.element_tree["1"] {
            DomNode::Element(el) => {
                assert_eq!(el.tag_name, "input");
                assert_eq!(el.attributes["name"], "user");
                assert!(el.is_interactive);
            }
            other => panic!("expected element node, got {other:?}"),
        }
        match &state.element_tree["2"] {
            DomNode::Text(t) => {
                assert_eq!(t.node_type, "TEXT_NODE");
                assert_eq!(t.text, "Username");
            }
            other => panic!("expected text node, got {other:?}"),
        }
    }

    #[test]
    fn missing_tree_is_empty() {
        let state: DomState = serde_json::from_str(r#"{"url": "about:blank"}"#).unwrap();
        assert!(state.element_tree.is_empty());
        assert_eq!(state, DomState::new("about:blank"));
    }

    #[test]
    fn open_tab_defaults() {
        let tab: OpenTab =
            serde_json::from_str(r#"{"id": "17", "url": "https://x.test"}"#).unwrap();
        assert!(!tab.active);
        assert!(tab.title.is_none());
    }

    #[test]
    fn numeric_tab_id_is_accepted() {
        let tab: OpenTab =
            serde_json::from_str(r#"{"id": 1234, "url": "https://x.test", "active": true}"#)
                .unwrap();
        assert_eq!(tab.id, "1234");
        assert!(tab.active);

        let err = serde_json::from_str::<OpenTab>(r#"{"id": [1], "url": "u"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn default_attributes_are_the_narrow_whitelist() {
        assert_eq!(
            DEFAULT_ELEMENT_ATTRIBUTES,
            &["id", "name", "type", "value", "placeholder", "href"]
        );
    }
}
