//! In-memory file namespace for wmibar.
//!
//! The bar exposes its configuration and its items as a tree of small files.
//! Writers and readers reach the tree through [`Namespace::read`] and
//! [`Namespace::write`], which fire the per-node hooks registered by the bar.
//! Hooks are the only way the bar learns about changes; nothing polls.

mod namespace;
mod path;

pub use namespace::{HookHandler, Namespace, NodeId, Siblings};
pub use path::{normalize, parent};
