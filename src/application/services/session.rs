//! Edit session service
//!
//! Tracks the current address the way a tree view does and offers the
//! editing actions a shell binds to menu entries.

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::codec;
use crate::domain::{
    format_path, Address, DomainError, DropAction, Role, TransferPayload, TreeModel,
};

/// Parses `0/2/1`; an empty string or `/` is the root.
pub fn parse_path(text: &str) -> ApplicationResult<Vec<usize>> {
    text.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .trim()
                .parse::<usize>()
                .map_err(|_| ApplicationError::NoSuchNode(text.to_string()))
        })
        .collect()
}

/// A model plus the address the user is working on.
#[derive(Debug)]
pub struct EditSession {
    model: TreeModel,
    current: Address,
}

impl EditSession {
    pub fn new(model: TreeModel) -> Self {
        Self {
            model,
            current: Address::invalid(),
        }
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn current(&self) -> Address {
        self.current
    }

    /// Makes the node at `path` current; the empty path selects the root.
    pub fn select_path(&mut self, path: &[usize]) -> ApplicationResult<Address> {
        let address = self.model.index_for_path(path);
        if !path.is_empty() && !address.is_valid() {
            return Err(ApplicationError::NoSuchNode(format_path(path)));
        }
        self.current = address;
        Ok(address)
    }

    /// Path of the current address, `None` once it went stale.
    pub fn current_path(&self) -> Option<Vec<usize>> {
        self.model.path_of(&self.current)
    }

    pub fn can_insert_row(&self) -> bool {
        self.model.is_live(&self.current)
    }

    pub fn can_remove_row(&self) -> bool {
        self.model.is_live(&self.current)
    }

    fn require_current(&self) -> ApplicationResult<Address> {
        if self.model.is_live(&self.current) {
            Ok(self.current)
        } else {
            Err(ApplicationError::NoSelection)
        }
    }

    /// Renames the current node.
    #[instrument(level = "debug", skip(self))]
    pub fn set_value(&mut self, value: &str) -> ApplicationResult<()> {
        let current = self.require_current()?;
        if codec::line_value(value).is_none() {
            return Err(DomainError::InvalidValue(value.to_string()).into());
        }
        if !self.model.set_data(&current, value, Role::Edit) {
            return Err(ApplicationError::Rejected("set value".into()));
        }
        Ok(())
    }

    /// Inserts an empty sibling right below the current node and selects it.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_row(&mut self) -> ApplicationResult<Address> {
        let current = self.require_current()?;
        let parent = self.model.parent(&current);
        let row = current.row() + 1;
        if !self.model.insert_rows(row, 1, &parent) {
            return Err(ApplicationError::Rejected("insert row".into()));
        }
        let empty_item = self.model.options().empty_item.clone();
        for column in 0..self.model.column_count(&parent) {
            let child = self.model.index(row, column, &parent);
            self.model.set_data(&child, &empty_item, Role::Edit);
        }
        self.current = self.model.index(row, 0, &parent);
        debug!(row, "row inserted after current");
        Ok(self.current)
    }

    /// Removes the current node with its subtree; nothing is current afterwards.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_row(&mut self) -> ApplicationResult<()> {
        let current = self.require_current()?;
        let parent = self.model.parent(&current);
        if !self.model.remove_rows(current.row(), 1, &parent) {
            return Err(ApplicationError::Rejected("remove row".into()));
        }
        self.current = Address::invalid();
        Ok(())
    }

    /// Inserts a first child under the current node (or the root) and selects it.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(&mut self) -> ApplicationResult<Address> {
        let current = self.current;
        if current.is_valid() && !self.model.is_live(&current) {
            return Err(ApplicationError::NoSelection);
        }
        let child = self
            .model
            .insert_child(&current)
            .ok_or_else(|| ApplicationError::Rejected("insert child".into()))?;
        self.current = child;
        Ok(child)
    }

    /// Serialized drag payload for the nodes at `sources`.
    pub fn drag(&self, sources: &[Address]) -> ApplicationResult<Vec<u8>> {
        Ok(self.model.mime_data(sources).encode()?)
    }

    /// Drops a serialized payload under `parent` at `row`.
    ///
    /// The current node keeps its selection through the move.
    #[instrument(level = "debug", skip(self, bytes))]
    pub fn drop_payload(
        &mut self,
        bytes: &[u8],
        action: DropAction,
        row: Option<usize>,
        parent: &Address,
    ) -> ApplicationResult<()> {
        let payload = TransferPayload::decode(bytes)?;
        let selected = self.current.node();
        if !self.model.drop_mime_data(&payload, action, row, 0, parent) {
            return Err(ApplicationError::Rejected("drop".into()));
        }
        self.current = selected.map_or_else(Address::invalid, |node| self.model.address_of(node));
        Ok(())
    }

    /// Moves the nodes at `sources` under `parent`, like a drag and drop inside one view.
    pub fn move_rows(
        &mut self,
        sources: &[Address],
        parent: &Address,
        row: Option<usize>,
    ) -> ApplicationResult<()> {
        let bytes = self.drag(sources)?;
        self.drop_payload(&bytes, DropAction::Move, row, parent)
    }
}
