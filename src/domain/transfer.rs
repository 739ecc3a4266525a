//! Drag/drop payload identifying moved nodes within one model session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::address::DropAction;
use crate::domain::arena::NodeId;
use crate::domain::error::{DomainError, DomainResult};

/// Format tag carried by every payload produced by a model.
pub const NODE_MIME_TYPE: &str = "application/x-rstree-node";

/// Serializable form of a [`NodeId`]: arena slot plus generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle {
    slot: usize,
    generation: u64,
}

impl From<NodeId> for NodeHandle {
    fn from(id: NodeId) -> Self {
        let (slot, generation) = id.into_raw_parts();
        Self { slot, generation }
    }
}

impl From<NodeHandle> for NodeId {
    fn from(handle: NodeHandle) -> Self {
        NodeId::from_raw_parts(handle.slot, handle.generation)
    }
}

/// Nodes picked up by a drag, tagged with the session of the model that produced them.
///
/// Handles are only meaningful inside the arena of that session, so a drop
/// into any other model is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub format: String,
    pub session: Uuid,
    pub action: DropAction,
    pub nodes: Vec<NodeHandle>,
}

impl TransferPayload {
    pub fn new(session: Uuid, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            format: NODE_MIME_TYPE.to_string(),
            session,
            action: DropAction::Move,
            nodes: nodes.into_iter().map(NodeHandle::from).collect(),
        }
    }

    pub fn has_format(&self, format: &str) -> bool {
        self.format == format
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().copied().map(NodeId::from).collect()
    }

    pub fn encode(&self) -> DomainResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| DomainError::MalformedPayload(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> DomainResult<Self> {
        let payload: Self = serde_json::from_slice(bytes)
            .map_err(|e| DomainError::MalformedPayload(e.to_string()))?;
        if !payload.has_format(NODE_MIME_TYPE) {
            return Err(DomainError::UnknownFormat(payload.format));
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_keeps_generation() {
        let id = NodeId::from_raw_parts(7, 3);
        let handle = NodeHandle::from(id);
        assert_eq!(NodeId::from(handle), id);
    }

    #[test]
    fn test_decode_rejects_foreign_format() {
        let mut payload = TransferPayload::new(Uuid::new_v4(), Vec::new());
        payload.format = "text/plain".to_string();
        let bytes = payload.encode().unwrap();
        assert_eq!(
            TransferPayload::decode(&bytes),
            Err(DomainError::UnknownFormat("text/plain".to_string()))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            TransferPayload::decode(b"not json"),
            Err(DomainError::MalformedPayload(_))
        ));
    }
}
