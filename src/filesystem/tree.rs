use std::ops::{Index, IndexMut};

use snafu::ensure;
use tracing::debug;

use super::error::{
    DuplicateNameSnafu, InvalidNameSnafu, SizeOverflowSnafu, TargetIsFileSnafu, VfsError,
};
use super::node::{FOLDER_OVERHEAD, Node, NodeId, NodeKind, ROOT_OVERHEAD};

const ROOT_NAME: &str = "/";

/// Arena holding every node of one filesystem, attached or sitting in the bin.
///
/// Children are owned through the `children` lists; `parent` links are plain
/// ids used for upward walks only. Released slots are recycled by later
/// allocations.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Option<Node>>,
    vacant: Vec<NodeId>,
    root: NodeId,
}

impl Tree {
    pub fn new(created_at: impl Into<String>) -> Self {
        let root = Node::new(
            ROOT_NAME.to_string(),
            NodeKind::Folder,
            ROOT_OVERHEAD,
            created_at.into(),
        );
        Self {
            slots: vec![Some(root)],
            vacant: Vec::new(),
            root: NodeId::from(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self[parent]
            .children
            .iter()
            .copied()
            .find(|child| self[*child].name == name)
    }

    pub fn create_folder(
        &mut self,
        parent: NodeId,
        name: &str,
        created_at: impl Into<String>,
    ) -> Result<NodeId, VfsError> {
        self.create(parent, NodeKind::Folder, name, FOLDER_OVERHEAD, created_at.into())
    }

    pub fn create_file(
        &mut self,
        parent: NodeId,
        name: &str,
        size: u64,
        created_at: impl Into<String>,
    ) -> Result<NodeId, VfsError> {
        self.create(parent, NodeKind::File, name, size, created_at.into())
    }

    fn create(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: &str,
        size: u64,
        created_at: String,
    ) -> Result<NodeId, VfsError> {
        ensure!(kind.is_valid_name(name), InvalidNameSnafu { name });
        ensure!(
            self[parent].is_folder(),
            TargetIsFileSnafu {
                path: self.path_of(parent)
            }
        );
        ensure!(
            self.child(parent, name).is_none(),
            DuplicateNameSnafu { name }
        );
        self.check_growth(parent, size, None)?;

        let id = self.allocate(Node::new(name.to_string(), kind, size, created_at));
        debug!("Created {} '{}' as {}", kind, name, id);
        self.link(parent, id);
        Ok(id)
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        match self.vacant.pop() {
            Some(id) => {
                self.slots[id.index()] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId::from(self.slots.len() - 1)
            }
        }
    }

    /// Appends `id` to the children of `parent` and re-aggregates sizes.
    ///
    /// Callers are responsible for name uniqueness and for `id` being detached.
    /// Nothing changes when a folder size would overflow.
    pub fn attach(&mut self, parent: NodeId, id: NodeId) -> Result<(), VfsError> {
        self.ensure_room(parent, id)?;
        self.link(parent, id);
        Ok(())
    }

    /// Fails if `id` (attached or not) cannot be placed under `parent` without
    /// overflowing a folder size on the way to the root.
    pub fn ensure_room(&self, parent: NodeId, id: NodeId) -> Result<(), VfsError> {
        self.check_growth(parent, self[id].size, self[id].parent)
    }

    fn check_growth(
        &self,
        parent: NodeId,
        added: u64,
        counted_under: Option<NodeId>,
    ) -> Result<(), VfsError> {
        let mut current = Some(parent);
        while let Some(id) = current {
            let counted = counted_under.is_some_and(|old| self.is_ancestor_or_self(id, old));
            ensure!(
                counted || self[id].size.checked_add(added).is_some(),
                SizeOverflowSnafu {
                    path: self.path_of(id)
                }
            );
            current = self[id].parent;
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, id: NodeId) {
        self[parent].children.push(id);
        self[id].parent = Some(parent);
        self.recompute(parent);
    }

    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self[id].parent.take()?;
        self[parent].children.retain(|child| *child != id);
        self.recompute(parent);
        Some(parent)
    }

    pub fn overhead(&self, id: NodeId) -> u64 {
        if id == self.root {
            ROOT_OVERHEAD
        } else {
            FOLDER_OVERHEAD
        }
    }

    /// Resets the size of `from` (if a folder) and of every ancestor to
    /// overhead plus the sum of their direct children.
    pub fn recompute(&mut self, from: NodeId) {
        let mut current = Some(from);
        while let Some(id) = current {
            if self[id].is_folder() {
                let size = self[id]
                    .children
                    .iter()
                    .fold(self.overhead(id), |total, c| total.saturating_add(self[*c].size));
                self[id].size = size;
            }
            current = self[id].parent;
        }
    }

    pub fn path_of(&self, id: NodeId) -> String {
        if id == self.root {
            return ROOT_NAME.to_string();
        }

        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.filter(|node| *node != self.root) {
            names.push(self[node].name.as_str());
            current = self[node].parent;
        }

        names
            .iter()
            .rev()
            .fold(String::new(), |mut path, name| {
                path.push('/');
                path.push_str(name);
                path
            })
    }

    pub fn pre_order(&self, from: NodeId) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![from],
        }
    }

    pub fn find(&self, name: &str) -> Vec<NodeId> {
        self.pre_order(self.root)
            .skip(1)
            .filter(|id| self[*id].name == name)
            .collect()
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self[id].parent;
        }
        false
    }

    /// Drops `id` and its whole subtree, returning how many nodes were freed.
    /// The root cannot be released.
    pub fn release(&mut self, id: NodeId) -> usize {
        if id == self.root {
            return 0;
        }
        self.detach(id);

        let doomed: Vec<NodeId> = self.pre_order(id).collect();
        for dead in &doomed {
            self.slots[dead.index()] = None;
            self.vacant.push(*dead);
        }
        doomed.len()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.get(id)
            .unwrap_or_else(|| panic!("node {id} is not part of this tree"))
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("node {id} is not part of this tree"),
        }
    }
}

pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree[id].children.iter().rev().copied());
        Some(id)
    }
}
