use std::fmt;
use std::num::ParseIntError;

use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::{debug, warn};

use crate::filesystem::{NodeId, NodeKind, Tree, VfsError};

const ROOT_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub path: String,
    pub size: u64,
    pub kind: NodeKind,
    pub created_at: String,
}

impl Record {
    pub fn of(tree: &Tree, id: NodeId) -> Self {
        let node = &tree[id];
        Self {
            path: tree.path_of(id),
            size: node.size(),
            kind: node.kind(),
            created_at: node.created_at().to_string(),
        }
    }

    pub fn parse(line: &str, line_number: usize) -> Result<Self, DecodeError> {
        let mut fields = line.splitn(4, ',');
        let mut next_field = |name: &str| {
            fields.next().context(MalformedRecordSnafu {
                line: line_number,
                reason: format!("missing {name} field"),
            })
        };

        let path = next_field("path")?.to_string();
        let size = next_field("size")?
            .trim()
            .parse::<u64>()
            .context(InvalidSizeSnafu { line: line_number })?;
        let tag = next_field("kind")?.trim();
        let kind = tag
            .parse::<u8>()
            .ok()
            .and_then(NodeKind::from_tag)
            .context(InvalidKindSnafu {
                line: line_number,
                value: tag,
            })?;
        let created_at = next_field("timestamp")?
            .trim_end_matches(['\r', '\n'])
            .to_string();

        Ok(Self {
            path,
            size,
            kind,
            created_at,
        })
    }

    fn split_path(&self) -> Option<(&str, &str)> {
        if !self.path.starts_with('/') {
            return None;
        }
        self.path.rsplit_once('/')
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.path,
            self.size,
            self.kind.tag(),
            self.created_at
        )
    }
}

pub fn encode(tree: &Tree) -> String {
    tree.pre_order(tree.root())
        .map(|id| format!("{}\n", Record::of(tree, id)))
        .collect()
}

/// Rebuilds a tree from [`encode`] output.
///
/// Ancestry comes from the record paths: a stack holds the path of every
/// node on the way down from the root, and each record is attached under the
/// entry whose path equals its own parent path. Stored folder sizes are
/// re-derived from the restored children.
pub fn decode(contents: &str) -> Result<Tree, DecodeError> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (line, first) = lines.next().context(EmptyInputSnafu)?;
    let root = Record::parse(first, line)?;
    ensure!(
        root.path == ROOT_PATH && root.kind == NodeKind::Folder,
        MissingRootSnafu { line }
    );

    let mut tree = Tree::new(root.created_at);
    let mut stored_sizes = vec![(tree.root(), root.size)];
    let mut ancestors: Vec<(String, NodeId)> = vec![(String::new(), tree.root())];

    for (line, text) in lines {
        let record = Record::parse(text, line)?;
        let (parent_path, name) = record.split_path().context(MalformedRecordSnafu {
            line,
            reason: format!("'{}' is not an absolute path", record.path),
        })?;

        while ancestors
            .last()
            .is_some_and(|(path, _)| path != parent_path)
        {
            ancestors.pop();
        }
        let parent = ancestors
            .last()
            .map(|(_, id)| *id)
            .context(OrphanRecordSnafu {
                line,
                path: record.path.as_str(),
            })?;

        let created = match record.kind {
            NodeKind::Folder => tree.create_folder(parent, name, record.created_at.as_str()),
            NodeKind::File => {
                tree.create_file(parent, name, record.size, record.created_at.as_str())
            }
        };
        let id = created.context(InvalidNodeSnafu {
            line,
            path: record.path.as_str(),
        })?;

        stored_sizes.push((id, record.size));
        ancestors.push((record.path, id));
    }

    for (id, stored) in stored_sizes {
        let actual = tree[id].size();
        if actual != stored {
            warn!(
                "Stored size {} of '{}' does not match its contents, using {}",
                stored,
                tree.path_of(id),
                actual
            );
        }
    }

    debug!("Decoded {} nodes", tree.len());
    Ok(tree)
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError {
    #[snafu(display("Data file contains no records"))]
    EmptyInput,
    #[snafu(display("Line {}: {}", line, reason))]
    MalformedRecord { line: usize, reason: String },
    #[snafu(display("Line {}: size is not an unsigned integer", line))]
    InvalidSize { line: usize, source: ParseIntError },
    #[snafu(display("Line {}: unknown node kind '{}'", line, value))]
    InvalidKind { line: usize, value: String },
    #[snafu(display("Line {}: first record must be the root folder '/'", line))]
    MissingRoot { line: usize },
    #[snafu(display("Line {}: parent of '{}' was not recorded before it", line, path))]
    OrphanRecord { line: usize, path: String },
    #[snafu(display("Line {}: cannot restore '{}'", line, path))]
    InvalidNode {
        line: usize,
        path: String,
        source: VfsError,
    },
}
