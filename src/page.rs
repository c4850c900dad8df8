//! Host-environment page snapshot types.
//!
//! The engine never touches a live DOM. The host (a browser content
//! script, an embedding process, or a test harness) serializes the parts
//! of the document the classifier needs into a [`PageSnapshot`] and feeds
//! it to the pipeline. All fields are tolerant of absence: a partial
//! snapshot degrades to negative signals, never to an error.

use serde::{Deserialize, Serialize};

/// A point-in-time capture of the current document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Full page URL.
    #[serde(default)]
    pub url: String,

    /// Document title.
    #[serde(default)]
    pub title: String,

    /// Visible page text, in document order.
    #[serde(default)]
    pub text: String,

    /// Descriptors for elements relevant to cart-state detection.
    #[serde(default)]
    pub elements: Vec<ElementInfo>,
}

/// A lightweight descriptor of one DOM element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Space-separated class attribute value.
    #[serde(default)]
    pub classes: String,

    /// Element id attribute value.
    #[serde(default)]
    pub id: String,

    /// `data-*` attribute names and values, flattened to strings.
    #[serde(default)]
    pub data_attrs: Vec<String>,
}

impl ElementInfo {
    /// Build a descriptor from a class attribute value.
    pub fn with_classes(classes: &str) -> Self {
        Self {
            classes: classes.to_owned(),
            ..Self::default()
        }
    }

    /// Build a descriptor from an id attribute value.
    pub fn with_id(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            ..Self::default()
        }
    }
}
