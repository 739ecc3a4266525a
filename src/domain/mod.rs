//! Domain layer: the tree document and its addressing contract
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod address;
pub mod arena;
pub mod codec;
pub mod error;
pub mod model;
pub mod render;
pub mod transfer;

pub use address::{format_path, Address, DropAction, ItemFlags, Orientation, Role};
pub use arena::{NodeId, TreeArena, TreeNode};
pub use error::{DomainError, DomainResult};
pub use model::{ModelEvent, ModelObserver, ModelOptions, TreeModel};
pub use render::{to_tree_string_with_paths, TreeNodeConvert};
pub use transfer::{NodeHandle, TransferPayload, NODE_MIME_TYPE};
