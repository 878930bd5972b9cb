//! In-memory hierarchical namespace.
//!
//! Nodes live in a [`Tree`] arena and are addressed by [`NodeId`]. Folder
//! sizes are kept eagerly consistent: every mutation re-aggregates the
//! affected folder and all of its ancestors. Removed subtrees wait in the
//! [`RecycleBin`](bin::RecycleBin) until they are recovered or purged.

mod bin;
mod error;
mod node;
mod resolver;
mod tree;
mod vfs;

pub use error::VfsError;
pub use node::{NodeId, NodeKind};
pub use tree::Tree;
pub use vfs::{BinView, Listing, Vfs};
