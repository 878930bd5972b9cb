use snafu::{OptionExt, ensure};

use super::error::{NoParentSnafu, NotFoundSnafu, VfsError};
use super::node::NodeId;
use super::tree::Tree;

const PARENT: &str = "..";
const PREVIOUS: &str = "-";
const CURRENT: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    current: NodeId,
    previous: NodeId,
}

impl Cursor {
    pub fn at(node: NodeId) -> Self {
        Self {
            current: node,
            previous: node,
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn previous(&self) -> NodeId {
        self.previous
    }

    pub fn change_to(&mut self, target: NodeId) {
        self.previous = std::mem::replace(&mut self.current, target);
    }

    pub fn reset_previous(&mut self) {
        self.previous = self.current;
    }

    /// Resolves `path` against this cursor.
    ///
    /// Without a `/` the path is a child name of the current folder or one of
    /// the tokens `..`, `-` and the empty string (root). With a `/` it is
    /// walked segment by segment, from the root when it starts with `/`.
    pub fn resolve(&self, tree: &Tree, path: &str) -> Result<NodeId, VfsError> {
        match path {
            "" => Ok(tree.root()),
            PREVIOUS => Ok(self.previous),
            PARENT => parent_of(tree, self.current),
            name if !name.contains('/') => {
                tree.child(self.current, name).context(NotFoundSnafu { path })
            }
            _ => self.walk(tree, path),
        }
    }

    fn walk(&self, tree: &Tree, path: &str) -> Result<NodeId, VfsError> {
        let (mut node, rest) = match path.strip_prefix('/') {
            Some(rest) => (tree.root(), rest),
            None => (self.current, path),
        };

        for segment in rest.split('/').filter(|segment| !segment.is_empty()) {
            ensure!(tree[node].is_folder(), NotFoundSnafu { path });
            node = match segment {
                CURRENT => node,
                PARENT => parent_of(tree, node)?,
                name => tree.child(node, name).context(NotFoundSnafu { path })?,
            };
        }

        Ok(node)
    }
}

fn parent_of(tree: &Tree, node: NodeId) -> Result<NodeId, VfsError> {
    tree[node].parent().context(NoParentSnafu)
}
