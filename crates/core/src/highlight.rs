//! The DOM highlighting boundary.
//!
//! Walking the live tree and deciding which nodes are interactive is the job
//! of a [`HighlightDomGenerator`]. This module owns what comes back from it:
//! a rendered element listing plus two lookup tables from element identifier
//! to locator. The listing and the tables must agree, so a
//! [`HighlightedDom`] can only be built through [`HighlightedDom::new`],
//! which checks that once. Everything downstream relies on it.
//!
//! Element lines in the listing start with the identifier in brackets:
//!
//! ```text
//! [E1]<input text name=user/>
//! [E2]<a /login>Sign in/>
//! ```

use crate::dom::DomState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Short per-step element identifier of the form `E<n>`.
///
/// Only stable for the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(String);

impl ElementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(s: &str) -> bool {
        match s.strip_prefix('E') {
            Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

impl FromStr for ElementId {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(HighlightError::InvalidIdentifier(s.to_string()))
        }
    }
}

impl TryFrom<String> for ElementId {
    type Error = HighlightError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(HighlightError::InvalidIdentifier(s))
        }
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element identifier → xpath locator.
pub type XPathMap = BTreeMap<ElementId, String>;

/// Element identifier → structured (CSS) selector.
pub type SelectorMap = BTreeMap<ElementId, String>;

/// Errors raised at the highlighting boundary. All of them are fatal for the
/// step: without a consistent element listing nothing can be grounded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HighlightError {
    #[error("DOM highlighter failed: {0}")]
    GeneratorFailed(String),

    #[error("Invalid element identifier: {0:?} (expected E<n>)")]
    InvalidIdentifier(String),

    #[error(
        "Element listing and locator maps disagree: \
         missing xpath for {missing_xpath:?}, missing selector for {missing_selector:?}, \
         unlisted keys {unlisted:?}"
    )]
    InconsistentMaps {
        missing_xpath: Vec<String>,
        missing_selector: Vec<String>,
        unlisted: Vec<String>,
    },
}

/// Validated output of a [`HighlightDomGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedDom {
    text: String,
    xpath_map: XPathMap,
    selector_map: SelectorMap,
}

impl HighlightedDom {
    /// Check that every identifier listed in `text` is a key of both maps and
    /// that neither map carries keys the listing does not mention.
    pub fn new(
        text: impl Into<String>,
        xpath_map: XPathMap,
        selector_map: SelectorMap,
    ) -> Result<Self, HighlightError> {
        let text = text.into();
        let listed = listed_identifiers(&text);

        let missing_xpath = missing_from(&listed, &xpath_map);
        let missing_selector = missing_from(&listed, &selector_map);
        let unlisted: Vec<String> = xpath_map
            .keys()
            .chain(selector_map.keys())
            .filter(|id| !listed.contains(*id))
            .map(ToString::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if !missing_xpath.is_empty() || !missing_selector.is_empty() || !unlisted.is_empty() {
            return Err(HighlightError::InconsistentMaps {
                missing_xpath,
                missing_selector,
                unlisted,
            });
        }

        Ok(Self {
            text,
            xpath_map,
            selector_map,
        })
    }

    pub fn xpath_map(&self) -> &XPathMap {
        &self.xpath_map
    }

    pub fn selector_map(&self) -> &SelectorMap {
        &self.selector_map
    }

    /// Number of interactive elements in the listing.
    pub fn element_count(&self) -> usize {
        self.xpath_map.len()
    }

    pub fn into_parts(self) -> (String, XPathMap, SelectorMap) {
        (self.text, self.xpath_map, self.selector_map)
    }
}

/// Identifiers that open a line of the listing, e.g. `[E12]<button ...`.
pub fn listed_identifiers(text: &str) -> BTreeSet<ElementId> {
    text.lines()
        .filter_map(|line| {
            let rest = line.trim_start().strip_prefix('[')?;
            let (candidate, _) = rest.split_once(']')?;
            candidate.parse::<ElementId>().ok()
        })
        .collect()
}

fn missing_from(listed: &BTreeSet<ElementId>, map: &BTreeMap<ElementId, String>) -> Vec<String> {
    listed
        .iter()
        .filter(|id| !map.contains_key(*id))
        .map(ToString::to_string)
        .collect()
}

/// Turns a page snapshot into an element listing plus locator maps.
///
/// Implementations decide which nodes are interactive and how they are
/// annotated. `attributes` is the whitelist of attribute names to surface
/// per element. Concurrent callers are only safe if the implementation is.
pub trait HighlightDomGenerator {
    fn generate(
        &self,
        dom: &DomState,
        attributes: &[String],
    ) -> Result<HighlightedDom, HighlightError>;
}

impl<G: HighlightDomGenerator + ?Sized> HighlightDomGenerator for &G {
    fn generate(
        &self,
        dom: &DomState,
        attributes: &[String],
    ) -> Result<HighlightedDom, HighlightError> {
        (**self).generate(dom, attributes)
    }
}

/// Highlighter output captured earlier (e.g. dumped by the page-side
/// collector), replayed as-is for every snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedHighlight {
    pub text: String,
    #[serde(default)]
    pub xpath_map: XPathMap,
    #[serde(default)]
    pub selector_map: SelectorMap,
}

impl RecordedHighlight {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl HighlightDomGenerator for RecordedHighlight {
    fn generate(
        &self,
        dom: &DomState,
        attributes: &[String],
    ) -> Result<HighlightedDom, HighlightError> {
        tracing::trace!(
            url = %dom.url,
            attributes = attributes.len(),
            "Replaying recorded highlight output"
        );
        HighlightedDom::new(
            self.text.clone(),
            self.xpath_map.clone(),
            self.selector_map.clone(),
        )
    }
}
