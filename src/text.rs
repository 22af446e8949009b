//! Text splitting into animatable units.
//!
//! Content is a small tree of [`ContentNode`]s. Splitting walks it in order
//! and assigns every leaf a stable index: words of text nodes, links and
//! images as atomic units, and explicit line breaks. Letters are split by
//! grapheme cluster so that combined characters and emoji stay whole.

use unicode_segmentation::UnicodeSegmentation;

/// Node of the content tree handed to the layout engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum ContentNode {
    /// Run of text, split into words on whitespace
    Text { text: String },
    /// Link, kept whole
    Link {
        href: String,
        text: String,
        #[cfg_attr(feature = "serde", serde(default))]
        id: Option<String>,
    },
    /// Image, kept whole
    Image {
        src: String,
        alt: String,
        #[cfg_attr(feature = "serde", serde(default))]
        id: Option<String>,
    },
    /// Forced row break
    LineBreak,
    /// Any other element. Its children are split in place; without children
    /// the element itself is an atomic unit.
    Element {
        tag: String,
        #[cfg_attr(feature = "serde", serde(default))]
        id: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<ContentNode>,
    },
}

impl ContentNode {
    /// Text node.
    pub fn text(text: impl Into<String>) -> Self {
        ContentNode::Text { text: text.into() }
    }

    /// Element node without an id.
    pub fn element(tag: impl Into<String>, children: Vec<ContentNode>) -> Self {
        ContentNode::Element {
            tag: tag.into(),
            id: None,
            children,
        }
    }

    /// Attach an element id, used to look up per-cell configuration.
    ///
    /// No effect on text and line breaks.
    pub fn with_id(mut self, new_id: impl Into<String>) -> Self {
        match &mut self {
            ContentNode::Link { id, .. }
            | ContentNode::Image { id, .. }
            | ContentNode::Element { id, .. } => *id = Some(new_id.into()),
            ContentNode::Text { .. } | ContentNode::LineBreak => {}
        }
        self
    }
}

/// What a unit renders.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitKind {
    Word(String),
    Link { href: String, text: String },
    Image { src: String, alt: String },
    /// Childless element rendered as-is
    Atomic { tag: String },
    Break,
}

/// Leaf unit with its position in content order.
#[derive(Clone, Debug, PartialEq)]
pub struct WordUnit {
    pub index: usize,
    pub kind: UnitKind,
    /// Id of the nearest enclosing element that has one
    pub element_id: Option<String>,
}

impl WordUnit {
    /// True for forced row breaks.
    #[inline]
    pub fn is_break(&self) -> bool {
        self.kind == UnitKind::Break
    }

    /// Text used for measurement and letter splitting.
    pub fn label(&self) -> &str {
        match &self.kind {
            UnitKind::Word(word) => word,
            UnitKind::Link { text, .. } => text,
            UnitKind::Image { alt, .. } => alt,
            UnitKind::Atomic { .. } | UnitKind::Break => "",
        }
    }
}

/// One letter (grapheme cluster) of a word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LetterUnit {
    /// Index across all letters of the content
    pub index: usize,
    /// Word this letter belongs to
    pub word_index: usize,
    pub text: String,
}

/// Split plain text into words on whitespace runs.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Split a content tree into ordered units.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{split_content, ContentNode, UnitKind};
///
/// let content = vec![
///     ContentNode::text("Hello  brave\nworld"),
///     ContentNode::LineBreak,
///     ContentNode::element("p", vec![ContentNode::text("again")]).with_id("intro"),
/// ];
/// let units = split_content(&content);
///
/// assert_eq!(units.len(), 5);
/// assert_eq!(units[1].kind, UnitKind::Word("brave".into()));
/// assert!(units[3].is_break());
/// assert_eq!(units[4].element_id.as_deref(), Some("intro"));
/// ```
pub fn split_content(nodes: &[ContentNode]) -> Vec<WordUnit> {
    let mut units = Vec::new();
    for node in nodes {
        split_node(node, None, &mut units);
    }
    units
}

fn split_node(node: &ContentNode, inherited: Option<&str>, units: &mut Vec<WordUnit>) {
    match node {
        ContentNode::Text { text } => {
            for word in text.split_whitespace() {
                push_unit(units, UnitKind::Word(word.to_string()), inherited);
            }
        }
        ContentNode::Link { href, text, id } => push_unit(
            units,
            UnitKind::Link {
                href: href.clone(),
                text: text.clone(),
            },
            id.as_deref().or(inherited),
        ),
        ContentNode::Image { src, alt, id } => push_unit(
            units,
            UnitKind::Image {
                src: src.clone(),
                alt: alt.clone(),
            },
            id.as_deref().or(inherited),
        ),
        ContentNode::LineBreak => push_unit(units, UnitKind::Break, None),
        ContentNode::Element { tag, id, children } => {
            let id = id.as_deref().or(inherited);
            if children.is_empty() {
                push_unit(units, UnitKind::Atomic { tag: tag.clone() }, id);
            } else {
                for child in children {
                    split_node(child, id, units);
                }
            }
        }
    }
}

fn push_unit(units: &mut Vec<WordUnit>, kind: UnitKind, id: Option<&str>) {
    units.push(WordUnit {
        index: units.len(),
        kind,
        element_id: id.map(str::to_string),
    });
}

/// Split words into letters with a global letter index.
///
/// A letter's index is the number of letters in all previous words plus its
/// position in its own word.
pub fn split_letters<S: AsRef<str>>(words: &[S]) -> Vec<LetterUnit> {
    let mut letters = Vec::new();
    for (word_index, word) in words.iter().enumerate() {
        for grapheme in word.as_ref().graphemes(true) {
            letters.push(LetterUnit {
                index: letters.len(),
                word_index,
                text: grapheme.to_string(),
            });
        }
    }
    letters
}
