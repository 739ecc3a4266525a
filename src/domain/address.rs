//! Transient coordinates handed out to presentation collaborators.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::arena::NodeId;

/// A `(row, column, node)` coordinate into a [`TreeModel`](crate::domain::TreeModel).
///
/// An address without a node is the invalid address, which stands for the root.
/// Addresses are only meaningful until the next structural change; the model
/// re-validates them on every use and rejects those whose node has left the
/// recorded parent or row, or has been destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address {
    row: usize,
    column: usize,
    node: Option<NodeId>,
    parent: Option<NodeId>,
}

impl Address {
    pub fn invalid() -> Self {
        Self::default()
    }

    pub(crate) fn new(row: usize, column: usize, node: NodeId, parent: NodeId) -> Self {
        Self {
            row,
            column,
            node: Some(node),
            parent: Some(parent),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Parent the node lived under when this address was handed out.
    pub(crate) fn parent_node(&self) -> Option<NodeId> {
        self.parent
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(_) => write!(f, "({}, {})", self.row, self.column),
            None => write!(f, "(root)"),
        }
    }
}

/// Formats a row path as `0/2/1`; the root is the empty string.
pub fn format_path(path: &[usize]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// Which aspect of a node's value is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Display,
    Edit,
    ToolTip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropAction {
    Copy,
    Move,
    Link,
}

impl fmt::Display for DropAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropAction::Copy => write!(f, "copy"),
            DropAction::Move => write!(f, "move"),
            DropAction::Link => write!(f, "link"),
        }
    }
}

bitflags! {
    /// Capabilities a presentation layer may offer for an address.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u32 {
        const SELECTABLE = 1;
        const EDITABLE = 1 << 1;
        const DRAG_ENABLED = 1 << 2;
        const DROP_ENABLED = 1 << 3;
        const ENABLED = 1 << 5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&[0, 2, 1]), "0/2/1");
        assert_eq!(format_path(&[]), "");
    }

    #[test]
    fn test_invalid_address_is_root() {
        let address = Address::invalid();
        assert!(!address.is_valid());
        assert_eq!(address.node(), None);
        assert_eq!(address.to_string(), "(root)");
    }
}
