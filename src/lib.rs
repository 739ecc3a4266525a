//! # rstree
//!
//! An editable outline document: an arena tree whose nodes each hold one
//! value, addressed by `(row, column, parent)` coordinates so a presentation
//! layer can browse, edit, reorder and persist it.
//!
//! ## Layers
//!
//! - [`domain`]: node arena, addressing contract, structural mutation with
//!   before/after notifications, the indentation text codec and drag payloads.
//!   No I/O.
//! - [`application`]: document open/save and the edit session (current item
//!   plus the insert/remove/move actions).
//! - [`infrastructure`]: filesystem and file chooser boundaries, wiring.
//! - [`cli`]: the `rstree` command line.
//!
//! ## Text format
//!
//! One value per line, nested by leading spaces:
//!
//! ```text
//! Getting Started
//!     Qt Essentials
//!     Qt Modules
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
