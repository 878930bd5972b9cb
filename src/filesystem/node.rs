use derive_more::{Display, From};

pub const FOLDER_OVERHEAD: u64 = 10;
pub const ROOT_OVERHEAD: u64 = 0;

/// Index of a node inside a [`Tree`](super::Tree) arena.
///
/// Ids are only meaningful for the tree that handed them out. Using an id
/// after its subtree was released panics on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    #[display("file")]
    File,
    #[display("dir")]
    Folder,
}

impl NodeKind {
    pub fn tag(self) -> u8 {
        match self {
            NodeKind::File => 0,
            NodeKind::Folder => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(NodeKind::File),
            1 => Some(NodeKind::Folder),
            _ => None,
        }
    }

    /// Folders accept ASCII alphanumerics, files additionally accept dots.
    pub fn is_valid_name(self, name: &str) -> bool {
        if name.is_empty() || name == "." || name == ".." {
            return false;
        }
        name.chars().all(|c| match self {
            NodeKind::Folder => c.is_ascii_alphanumeric(),
            NodeKind::File => c.is_ascii_alphanumeric() || c == '.',
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(super) name: String,
    pub(super) kind: NodeKind,
    pub(super) size: u64,
    pub(super) created_at: String,
    pub(super) children: Vec<NodeId>,
    pub(super) parent: Option<NodeId>,
}

impl Node {
    pub(super) fn new(name: String, kind: NodeKind, size: u64, created_at: String) -> Self {
        Self {
            name,
            kind,
            size,
            created_at,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}
