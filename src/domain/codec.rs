//! Indentation-delimited plain text <-> tree.
//!
//! One node per line; nesting is the count of leading space characters.
//! Parsing never fails: badly indented input yields a shallower tree.

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, TreeArena};

/// Spaces emitted per depth level by default.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Parsing context: the node new lines are appended to and the indentation that opened it.
#[derive(Debug, Clone, Copy)]
struct Frame {
    parent: NodeId,
    indent: usize,
}

/// Frame stack whose bottom frame (the root at indent 0) can never be popped.
struct Frames {
    base: Frame,
    nested: Vec<Frame>,
}

impl Frames {
    fn new(root: NodeId) -> Self {
        Self {
            base: Frame {
                parent: root,
                indent: 0,
            },
            nested: Vec::new(),
        }
    }

    fn top(&self) -> Frame {
        self.nested.last().copied().unwrap_or(self.base)
    }

    fn push(&mut self, frame: Frame) {
        self.nested.push(frame);
    }

    fn pop(&mut self) -> bool {
        self.nested.pop().is_some()
    }
}

/// Leading literal spaces; a tab ends the count like any other character.
fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// The form of `value` that survives a serialize/parse round trip.
///
/// Surrounding whitespace is dropped; a value that is blank or spans several
/// lines has no single-line form and yields `None`.
pub fn line_value(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(['\n', '\r']) {
        return None;
    }
    Some(trimmed)
}

/// Appends the nodes described by `text` below the root of `tree`.
///
/// A line indented deeper than the current frame only opens a new level when
/// the current parent already has a child; otherwise it becomes a sibling.
/// Returns the number of nodes created.
#[instrument(level = "debug", skip(tree, text), fields(bytes = text.len()))]
pub fn parse_into(tree: &mut TreeArena, text: &str) -> usize {
    let mut frames = Frames::new(tree.root());
    let mut created = 0;

    for line in text.split('\n') {
        let indent = indentation(line);
        let content = line[indent..].trim();
        if content.is_empty() {
            continue;
        }

        let top = frames.top();
        if indent > top.indent {
            let last_child = tree
                .get_node(top.parent)
                .and_then(|n| n.children.last().copied());
            if let Some(last_child) = last_child {
                frames.push(Frame {
                    parent: last_child,
                    indent,
                });
            }
        } else {
            while indent < frames.top().indent && frames.pop() {}
        }

        if tree.append_child(frames.top().parent, content).is_some() {
            created += 1;
        }
    }

    debug!(created, "parsed outline");
    created
}

/// Builds a fresh tree from `text`.
pub fn parse(root_value: &str, text: &str) -> TreeArena {
    let mut tree = TreeArena::new(root_value);
    parse_into(&mut tree, text);
    tree
}

/// Writes every node below the root in pre-order, `indent_width` spaces per level.
#[instrument(level = "debug", skip(tree))]
pub fn serialize(tree: &TreeArena, indent_width: usize) -> String {
    let unit = " ".repeat(indent_width);
    let mut out = String::new();
    for (idx, node) in tree.iter().skip(1) {
        let level = tree.depth_of(idx).saturating_sub(1);
        out.push_str(&unit.repeat(level));
        out.push_str(&node.value);
        out.push('\n');
    }
    out
}
