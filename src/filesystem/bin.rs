use std::collections::VecDeque;

use snafu::OptionExt;

use super::error::{BinEmptySnafu, VfsError};
use super::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinEntry {
    pub node: NodeId,
    pub path: String,
}

impl BinEntry {
    /// Path of the folder the entry was removed from; `/` for top-level nodes.
    pub fn parent_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(0) | None => "/",
            Some(index) => &self.path[..index],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecycleBin {
    entries: VecDeque<BinEntry>,
}

impl RecycleBin {
    pub fn push(&mut self, node: NodeId, path: impl Into<String>) {
        self.entries.push_back(BinEntry {
            node,
            path: path.into(),
        });
    }

    pub fn front(&self) -> Result<&BinEntry, VfsError> {
        self.entries.front().context(BinEmptySnafu)
    }

    pub fn pop_front(&mut self) -> Result<BinEntry, VfsError> {
        self.entries.pop_front().context(BinEmptySnafu)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = BinEntry> + '_ {
        self.entries.drain(..)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
