//! Row/column addressing over the node arena plus bracketed structural mutation.
//!
//! Every structural change is announced twice: once before the arena is
//! touched and once after. Observers receive a shared borrow of the model,
//! so they can re-derive addresses but can never mutate it from inside a
//! notification.

use std::fmt;

use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

use crate::domain::address::{Address, DropAction, ItemFlags, Orientation, Role};
use crate::domain::arena::{NodeId, TreeArena, MAX_ROWS};
use crate::domain::codec::{self, DEFAULT_INDENT_WIDTH};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::transfer::{TransferPayload, NODE_MIME_TYPE};

/// Values the model falls back to when it has to invent content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    /// Root value, shown as the single header label
    pub root_title: String,
    /// Value of rows created by `insert_rows`
    pub placeholder: String,
    /// Value given to a child created by `insert_child`
    pub empty_item: String,
    /// Header label assigned when a column has none
    pub empty_header: String,
    /// Spaces per depth level when serializing
    pub indent_width: usize,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            root_title: "TreeView".into(),
            placeholder: "New Item".into(),
            empty_item: "[No data]".into(),
            empty_header: "[No header]".into(),
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

/// Notifications emitted by [`TreeModel`].
///
/// `first..=last` are row numbers under `parent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    RowsAboutToBeInserted {
        parent: Address,
        first: usize,
        last: usize,
    },
    RowsInserted {
        parent: Address,
        first: usize,
        last: usize,
    },
    RowsAboutToBeRemoved {
        parent: Address,
        first: usize,
        last: usize,
    },
    RowsRemoved {
        parent: Address,
        first: usize,
        last: usize,
    },
    DataChanged {
        top_left: Address,
        bottom_right: Address,
    },
    HeaderDataChanged {
        orientation: Orientation,
        first: usize,
        last: usize,
    },
    ModelAboutToBeReset,
    ModelReset,
}

impl ModelEvent {
    /// True for events after which previously obtained addresses must be discarded.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            ModelEvent::DataChanged { .. } | ModelEvent::HeaderDataChanged { .. }
        )
    }
}

/// Receives model notifications synchronously, in emission order.
pub trait ModelObserver {
    fn on_event(&mut self, event: &ModelEvent, model: &TreeModel);
}

impl<F> ModelObserver for F
where
    F: FnMut(&ModelEvent, &TreeModel),
{
    fn on_event(&mut self, event: &ModelEvent, model: &TreeModel) {
        self(event, model)
    }
}

/// Editable single-column tree model.
pub struct TreeModel {
    tree: TreeArena,
    options: ModelOptions,
    session: Uuid,
    observers: Vec<Box<dyn ModelObserver>>,
}

impl fmt::Debug for TreeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeModel")
            .field("tree", &self.tree)
            .field("options", &self.options)
            .field("session", &self.session)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new(ModelOptions::default())
    }
}

impl TreeModel {
    pub fn new(options: ModelOptions) -> Self {
        Self {
            tree: TreeArena::new(options.root_title.clone()),
            options,
            session: Uuid::new_v4(),
            observers: Vec::new(),
        }
    }

    #[instrument(level = "debug", skip(text, options))]
    pub fn from_text(text: &str, options: ModelOptions) -> Self {
        let mut model = Self::new(options);
        codec::parse_into(&mut model.tree, text);
        model
    }

    /// Serializes the document with the configured indent width.
    pub fn to_text(&self) -> String {
        codec::serialize(&self.tree, self.options.indent_width)
    }

    /// Replaces the whole document with the outline in `text`.
    #[instrument(level = "debug", skip(self, text))]
    pub fn reset_from_text(&mut self, text: &str) {
        self.emit(ModelEvent::ModelAboutToBeReset);
        self.tree = TreeArena::new(self.options.root_title.clone());
        codec::parse_into(&mut self.tree, text);
        self.emit(ModelEvent::ModelReset);
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Identifies this model instance in drag payloads.
    pub fn session_id(&self) -> Uuid {
        self.session
    }

    pub fn subscribe(&mut self, observer: impl ModelObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: ModelEvent) {
        trace!(?event, "emit");
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.on_event(&event, self);
        }
        self.observers = observers;
    }

    // ------------------------------------------------------------
    // Addressing
    // ------------------------------------------------------------

    /// Resolves an address to its node, the root for the invalid address.
    ///
    /// A valid address only resolves while its node still sits at the recorded
    /// row under the recorded parent; anything else is stale and yields `None`.
    fn node_for(&self, address: &Address) -> Option<NodeId> {
        let Some(node) = address.node() else {
            return Some(self.tree.root());
        };
        let parent = self.tree.parent(node)?;
        if address.parent_node() != Some(parent) {
            return None;
        }
        (self.tree.child(parent, address.row()) == Some(node)).then_some(node)
    }

    /// Current address of a node, the invalid address for the root.
    pub fn address_of(&self, node: NodeId) -> Address {
        if node == self.tree.root() {
            return Address::invalid();
        }
        self.tree
            .parent(node)
            .map_or_else(Address::invalid, |parent| {
                Address::new(self.tree.row(node), 0, node, parent)
            })
    }

    /// False for addresses invalidated by a structural change.
    pub fn is_live(&self, address: &Address) -> bool {
        address.is_valid() && self.node_for(address).is_some()
    }

    pub fn row_count(&self, parent: &Address) -> usize {
        self.node_for(parent)
            .map_or(0, |node| self.tree.child_count(node))
    }

    pub fn column_count(&self, _parent: &Address) -> usize {
        1
    }

    pub fn has_index(&self, row: usize, column: usize, parent: &Address) -> bool {
        row < self.row_count(parent) && column < self.column_count(parent)
    }

    pub fn index(&self, row: usize, column: usize, parent: &Address) -> Address {
        if parent.is_valid() && parent.column() != 0 {
            return Address::invalid();
        }
        if !self.has_index(row, column, parent) {
            return Address::invalid();
        }
        self.node_for(parent)
            .and_then(|p| Some((p, self.tree.child(p, row)?)))
            .map_or_else(Address::invalid, |(p, child)| {
                Address::new(row, column, child, p)
            })
    }

    /// Address of the parent; invalid for top-level rows and the root.
    pub fn parent(&self, address: &Address) -> Address {
        let Some(node) = address.node().filter(|_| self.is_live(address)) else {
            return Address::invalid();
        };
        match self.tree.parent(node) {
            Some(p) if p != self.tree.root() => self.address_of(p),
            _ => Address::invalid(),
        }
    }

    pub fn data(&self, address: &Address, role: Role) -> Option<&str> {
        if !address.is_valid() || !matches!(role, Role::Display | Role::Edit) {
            return None;
        }
        self.node_for(address).and_then(|node| self.tree.value(node))
    }

    /// Stores `value` trimmed; blank or multi-line values are rejected since
    /// the text format could not reproduce them.
    #[instrument(level = "debug", skip(self, value))]
    pub fn set_data(&mut self, address: &Address, value: &str, role: Role) -> bool {
        if role != Role::Edit || !address.is_valid() {
            return false;
        }
        let Some(node) = self.node_for(address) else {
            warn!(%address, "set_data on stale address rejected");
            return false;
        };
        let Some(value) = codec::line_value(value) else {
            warn!(error = %DomainError::InvalidValue(value.to_string()), "set_data rejected");
            return false;
        };
        if !self.tree.set_value(node, value) {
            return false;
        }
        self.emit(ModelEvent::DataChanged {
            top_left: *address,
            bottom_right: *address,
        });
        true
    }

    /// The root value labels column 0; an empty label counts as missing.
    pub fn header_data(&self, section: usize, orientation: Orientation, role: Role) -> Option<&str> {
        if section != 0 || orientation != Orientation::Horizontal || role != Role::Display {
            return None;
        }
        self.tree
            .value(self.tree.root())
            .filter(|label| !label.is_empty())
    }

    pub fn set_header_data(
        &mut self,
        section: usize,
        orientation: Orientation,
        value: &str,
        role: Role,
    ) -> bool {
        if section != 0 || orientation != Orientation::Horizontal || role != Role::Edit {
            return false;
        }
        let root = self.tree.root();
        self.tree.set_value(root, value);
        self.emit(ModelEvent::HeaderDataChanged {
            orientation,
            first: section,
            last: section,
        });
        true
    }

    pub fn flags(&self, address: &Address) -> ItemFlags {
        if !address.is_valid() {
            return ItemFlags::DROP_ENABLED;
        }
        if !self.is_live(address) {
            return ItemFlags::empty();
        }
        ItemFlags::SELECTABLE
            | ItemFlags::ENABLED
            | ItemFlags::EDITABLE
            | ItemFlags::DRAG_ENABLED
            | ItemFlags::DROP_ENABLED
    }

    /// Address reached by following `path` row by row from the root.
    pub fn index_for_path(&self, path: &[usize]) -> Address {
        let mut current = Address::invalid();
        for &row in path {
            current = self.index(row, 0, &current);
            if !current.is_valid() {
                break;
            }
        }
        current
    }

    /// Rows from the top level down to the addressed node; empty for the root.
    pub fn path_of(&self, address: &Address) -> Option<Vec<usize>> {
        let node = self.node_for(address)?;
        let root = self.tree.root();
        let mut path = Vec::new();
        let mut current = node;
        while current != root {
            path.push(self.tree.row(current));
            current = self.tree.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    // ------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------

    /// Creates `count` placeholder rows under `parent` starting at `pos`.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_rows(&mut self, pos: usize, count: usize, parent: &Address) -> bool {
        match self.try_insert_rows(pos, count, parent) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "insert_rows rejected");
                false
            }
        }
    }

    fn try_insert_rows(&mut self, pos: usize, count: usize, parent: &Address) -> DomainResult<()> {
        let node = self
            .node_for(parent)
            .ok_or(DomainError::StaleAddress { row: parent.row() })?;
        let existing = self.tree.child_count(node);
        if count == 0 || pos > existing {
            return Err(DomainError::RowOutOfRange {
                row: pos,
                count: existing,
            });
        }
        if count > MAX_ROWS - existing.min(MAX_ROWS) {
            return Err(DomainError::RangeOutOfBounds {
                start: pos,
                end: pos.saturating_add(count),
                count: existing,
            });
        }
        let last = pos + count - 1;
        self.emit(ModelEvent::RowsAboutToBeInserted {
            parent: *parent,
            first: pos,
            last,
        });
        let placeholder = self.options.placeholder.clone();
        let result = self.tree.insert_children(node, pos, count, &placeholder);
        self.emit(ModelEvent::RowsInserted {
            parent: *parent,
            first: pos,
            last,
        });
        debug!(pos, count, "rows inserted");
        result
    }

    /// Destroys `count` rows under `parent` starting at `pos`, all or nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_rows(&mut self, pos: usize, count: usize, parent: &Address) -> bool {
        match self.try_remove_rows(pos, count, parent) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "remove_rows rejected");
                false
            }
        }
    }

    fn try_remove_rows(&mut self, pos: usize, count: usize, parent: &Address) -> DomainResult<()> {
        let node = self
            .node_for(parent)
            .ok_or(DomainError::StaleAddress { row: parent.row() })?;
        let existing = self.tree.child_count(node);
        let end = pos.checked_add(count).unwrap_or(usize::MAX);
        if count == 0 || end > existing {
            return Err(DomainError::RangeOutOfBounds {
                start: pos,
                end,
                count: existing,
            });
        }
        self.emit(ModelEvent::RowsAboutToBeRemoved {
            parent: *parent,
            first: pos,
            last: end - 1,
        });
        let result = self.tree.remove_children(node, pos, count);
        self.emit(ModelEvent::RowsRemoved {
            parent: *parent,
            first: pos,
            last: end - 1,
        });
        debug!(pos, count, "rows removed");
        result
    }

    /// Inserts one child at row 0 of `current` and returns its address.
    ///
    /// The child gets the empty-item value; a missing header label is filled in.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(&mut self, current: &Address) -> Option<Address> {
        // Single-column model: every node already has its one column.
        if !self.insert_rows(0, 1, current) {
            return None;
        }
        let empty_item = self.options.empty_item.clone();
        let empty_header = self.options.empty_header.clone();
        for column in 0..self.column_count(current) {
            let child = self.index(0, column, current);
            self.set_data(&child, &empty_item, Role::Edit);
            if self
                .header_data(column, Orientation::Horizontal, Role::Display)
                .is_none()
            {
                self.set_header_data(column, Orientation::Horizontal, &empty_header, Role::Edit);
            }
        }
        Some(self.index(0, 0, current))
    }

    /// Moves `nodes`, in order, under `destination` starting at `row`.
    ///
    /// Nodes that already live under `destination` above `row` shift the
    /// target up by one, so moving row 0 to row 3 among four siblings lands
    /// the node at row 2.
    #[instrument(level = "debug", skip(self))]
    pub fn move_nodes(&mut self, nodes: &[NodeId], destination: &Address, row: usize) -> bool {
        let result = self
            .node_for(destination)
            .ok_or(DomainError::StaleAddress {
                row: destination.row(),
            })
            .and_then(|dest| self.try_move(nodes, dest, row));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "move rejected");
                false
            }
        }
    }

    fn try_move(&mut self, nodes: &[NodeId], destination: NodeId, row: usize) -> DomainResult<()> {
        let existing = self.tree.child_count(destination);
        if row > existing {
            return Err(DomainError::RowOutOfRange {
                row,
                count: existing,
            });
        }
        let mut distinct: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if node == self.tree.root() {
                return Err(DomainError::RootNotMovable);
            }
            if !self.tree.contains(node) {
                return Err(DomainError::StaleAddress { row });
            }
            if self.tree.is_ancestor_or_self(node, destination) {
                return Err(DomainError::CycleDetected);
            }
            if !distinct.contains(&node) {
                distinct.push(node);
            }
        }

        let mut row = row;
        for node in distinct {
            let source = self
                .tree
                .parent(node)
                .ok_or(DomainError::StaleAddress { row })?;
            let source_row = self.tree.row(node);
            if source == destination && source_row < row {
                row -= 1;
            }

            let source_address = self.address_of(source);
            self.emit(ModelEvent::RowsAboutToBeRemoved {
                parent: source_address,
                first: source_row,
                last: source_row,
            });
            let detached = self.tree.detach(node);
            self.emit(ModelEvent::RowsRemoved {
                parent: source_address,
                first: source_row,
                last: source_row,
            });
            detached?;

            let destination_address = self.address_of(destination);
            self.emit(ModelEvent::RowsAboutToBeInserted {
                parent: destination_address,
                first: row,
                last: row,
            });
            let attached = self.tree.attach(destination, row, node);
            self.emit(ModelEvent::RowsInserted {
                parent: destination_address,
                first: row,
                last: row,
            });
            attached?;
            debug!(source_row, row, "node moved");
            row += 1;
        }
        Ok(())
    }

    // ------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------

    pub fn mime_types(&self) -> Vec<&'static str> {
        vec![NODE_MIME_TYPE]
    }

    /// Payload naming the distinct live nodes behind `addresses`, in first-seen order.
    pub fn mime_data(&self, addresses: &[Address]) -> TransferPayload {
        let mut nodes: Vec<NodeId> = Vec::new();
        for address in addresses {
            if let Some(node) = address.node().filter(|_| self.is_live(address)) {
                if !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
        }
        TransferPayload::new(self.session, nodes)
    }

    pub fn supported_drop_actions(&self) -> &'static [DropAction] {
        &[DropAction::Move]
    }

    pub fn can_drop_mime_data(&self, payload: &TransferPayload, action: DropAction) -> bool {
        self.check_payload(payload, action).is_ok()
    }

    fn check_payload(&self, payload: &TransferPayload, action: DropAction) -> DomainResult<()> {
        if !payload.has_format(NODE_MIME_TYPE) {
            return Err(DomainError::UnknownFormat(payload.format.clone()));
        }
        if payload.session != self.session {
            return Err(DomainError::ForeignSession);
        }
        if !self.supported_drop_actions().contains(&action) {
            return Err(DomainError::UnsupportedAction(action.to_string()));
        }
        if payload.action != DropAction::Move {
            return Err(DomainError::UnsupportedAction(payload.action.to_string()));
        }
        Ok(())
    }

    /// Moves the payload's nodes under `parent`.
    ///
    /// Without a row the nodes go to row 0 of a real parent, or after the
    /// last top-level row when dropped on the root.
    #[instrument(level = "debug", skip(self, payload))]
    pub fn drop_mime_data(
        &mut self,
        payload: &TransferPayload,
        action: DropAction,
        row: Option<usize>,
        _column: usize,
        parent: &Address,
    ) -> bool {
        if let Err(e) = self.check_payload(payload, action) {
            warn!(error = %e, "drop rejected");
            return false;
        }
        let row = row.unwrap_or_else(|| {
            if parent.is_valid() {
                0
            } else {
                self.row_count(parent)
            }
        });
        self.move_nodes(&payload.node_ids(), parent, row)
    }
}
