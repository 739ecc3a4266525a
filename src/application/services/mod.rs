//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, FileChooser)
//! but are themselves concrete structs, not traits.

mod document;
mod session;

pub use document::{DocumentService, DEFAULT_DOCUMENT};
pub use session::{parse_path, EditSession};
