use snafu::{OptionExt, ensure};
use tracing::{debug, info, warn};

use super::bin::RecycleBin;
use super::error::{
    DuplicateNameSnafu, InvalidMoveSnafu, InvalidParameterSnafu, NotFoundSnafu,
    OrphanedParentSnafu, TargetIsFileSnafu, VfsError,
};
use super::node::{NodeId, NodeKind};
use super::resolver::Cursor;
use super::tree::Tree;

pub type Clock = fn() -> String;

const SORT_FLAG: &str = "sort";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub kind: NodeKind,
    pub name: String,
    pub size: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinView {
    pub kind: NodeKind,
    pub name: String,
    pub size: u64,
    pub path: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct Vfs {
    tree: Tree,
    bin: RecycleBin,
    cursor: Cursor,
    clock: Clock,
}

impl Vfs {
    pub fn new(clock: Clock) -> Self {
        Self::from_tree(Tree::new(clock()), clock)
    }

    pub fn from_tree(tree: Tree, clock: Clock) -> Self {
        let cursor = Cursor::at(tree.root());
        Self {
            tree,
            bin: RecycleBin::default(),
            cursor,
            clock,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn bin(&self) -> &RecycleBin {
        &self.bin
    }

    pub fn resolve(&self, path: &str) -> Result<NodeId, VfsError> {
        self.cursor.resolve(&self.tree, path)
    }

    pub fn pwd(&self) -> String {
        self.tree.path_of(self.cursor.current())
    }

    pub fn mkdir(&mut self, name: &str) -> Result<NodeId, VfsError> {
        self.tree
            .create_folder(self.cursor.current(), name, (self.clock)())
    }

    pub fn touch(&mut self, name: &str, size: u64) -> Result<NodeId, VfsError> {
        self.tree
            .create_file(self.cursor.current(), name, size, (self.clock)())
    }

    pub fn cd(&mut self, path: &str) -> Result<(), VfsError> {
        let target = self.resolve(path)?;
        ensure!(self.tree[target].is_folder(), TargetIsFileSnafu { path });
        self.cursor.change_to(target);
        debug!("Changed directory to {}", self.pwd());
        Ok(())
    }

    pub fn rm(&mut self, name: &str) -> Result<(), VfsError> {
        let current = self.cursor.current();
        let node = self
            .tree
            .child(current, name)
            .context(NotFoundSnafu { path: name })?;

        let path = self.tree.path_of(node);
        if self.tree.is_ancestor_or_self(node, self.cursor.previous()) {
            self.cursor.reset_previous();
        }

        self.tree.detach(node);
        debug!("Moved '{}' to the bin", path);
        self.bin.push(node, path);
        Ok(())
    }

    /// Relocates `source` into the folder `target`. Both accept anything `cd` does.
    pub fn mv(&mut self, source: &str, target: &str) -> Result<(), VfsError> {
        let moving = self.resolve(source)?;
        let destination = self.resolve(target)?;
        ensure!(
            self.tree[destination].is_folder(),
            TargetIsFileSnafu { path: target }
        );
        ensure!(
            moving != self.tree.root() && !self.tree.is_ancestor_or_self(moving, destination),
            InvalidMoveSnafu {
                source_path: self.tree.path_of(moving),
                target_path: self.tree.path_of(destination),
            }
        );

        let name = self.tree[moving].name().to_string();
        if let Some(existing) = self.tree.child(destination, &name) {
            ensure!(existing == moving, DuplicateNameSnafu { name });
        }

        self.tree.ensure_room(destination, moving)?;
        self.tree.detach(moving);
        self.tree.attach(destination, moving)?;
        debug!(
            "Moved '{}' to '{}'",
            name,
            self.tree.path_of(destination)
        );
        Ok(())
    }

    /// Reattaches the oldest bin entry under the folder it was removed from.
    ///
    /// An entry whose original folder is gone is dropped for good. An entry
    /// whose name is taken again stays at the front of the bin.
    pub fn recover(&mut self) -> Result<NodeId, VfsError> {
        let entry = self.bin.front()?.clone();
        let parent_path = entry.parent_path().to_string();

        let parent = Cursor::at(self.tree.root())
            .resolve(&self.tree, &parent_path)
            .ok()
            .filter(|parent| self.tree[*parent].is_folder());

        let Some(parent) = parent else {
            self.bin.pop_front()?;
            let released = self.tree.release(entry.node);
            warn!(
                "Dropped '{}' ({} nodes): '{}' no longer exists",
                entry.path, released, parent_path
            );
            return OrphanedParentSnafu { path: parent_path }.fail();
        };

        let name = self.tree[entry.node].name().to_string();
        ensure!(
            self.tree.child(parent, &name).is_none(),
            DuplicateNameSnafu { name }
        );

        self.tree.attach(parent, entry.node)?;
        self.bin.pop_front()?;
        debug!("Recovered '{}'", entry.path);
        Ok(entry.node)
    }

    pub fn find(&self, name: &str) -> Vec<String> {
        self.tree
            .find(name)
            .into_iter()
            .map(|id| self.tree.path_of(id))
            .collect()
    }

    pub fn size(&self, path: &str) -> Result<u64, VfsError> {
        let node = self.resolve(path)?;
        Ok(self.tree[node].size())
    }

    /// Children of the current folder in insertion order, or by descending
    /// size when `flag` is `sort`.
    pub fn ls(&self, flag: Option<&str>) -> Result<Vec<Listing>, VfsError> {
        let sort = match flag {
            None => false,
            Some(SORT_FLAG) => true,
            Some(parameter) => return InvalidParameterSnafu { parameter }.fail(),
        };

        let mut listings: Vec<Listing> = self.tree[self.cursor.current()]
            .children()
            .iter()
            .map(|child| {
                let node = &self.tree[*child];
                Listing {
                    kind: node.kind(),
                    name: node.name().to_string(),
                    size: node.size(),
                    created_at: node.created_at().to_string(),
                }
            })
            .collect();

        if sort {
            listings.sort_by(|a, b| b.size.cmp(&a.size));
        }
        Ok(listings)
    }

    pub fn showbin(&self) -> Result<BinView, VfsError> {
        let entry = self.bin.front()?;
        let node = &self.tree[entry.node];
        Ok(BinView {
            kind: node.kind(),
            name: node.name().to_string(),
            size: node.size(),
            path: entry.path.clone(),
            created_at: node.created_at().to_string(),
        })
    }

    pub fn emptybin(&mut self) -> usize {
        let mut released = 0;
        for entry in self.bin.drain() {
            released += self.tree.release(entry.node);
        }
        info!("Emptied the bin, released {} nodes", released);
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "Sun Oct 18 12:00:00 2026";

    fn fixed_clock() -> String {
        TS.to_string()
    }

    fn vfs() -> Vfs {
        Vfs::new(fixed_clock)
    }

    fn assert_sizes_consistent(vfs: &Vfs) {
        let tree = vfs.tree();
        for id in tree.pre_order(tree.root()) {
            let node = &tree[id];
            if node.is_folder() {
                let total: u64 = node.children().iter().map(|c| tree[*c].size()).sum();
                assert_eq!(node.size(), tree.overhead(id) + total);
            }
        }
    }

    fn assert_siblings_unique(vfs: &Vfs) {
        let tree = vfs.tree();
        for id in tree.pre_order(tree.root()) {
            let mut names: Vec<&str> = tree[id]
                .children()
                .iter()
                .map(|c| tree[*c].name())
                .collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate names under {}", tree.path_of(id));
        }
    }

    #[test]
    fn file_size_and_folder_overhead() {
        let mut vfs = vfs();
        vfs.mkdir("A").unwrap();
        vfs.cd("A").unwrap();
        vfs.touch("B.txt", 5).unwrap();
        assert_eq!(vfs.size("B.txt"), Ok(5));

        vfs.cd("..").unwrap();
        assert_eq!(vfs.size("A"), Ok(15));
        assert_eq!(vfs.size("/"), Ok(15));
        assert_eq!(vfs.size("/A/B.txt"), Ok(5));
    }

    #[test]
    fn mkdir_twice_is_duplicate() {
        let mut vfs = vfs();
        vfs.mkdir("docs").unwrap();
        assert_eq!(
            vfs.mkdir("docs"),
            Err(VfsError::DuplicateName {
                name: "docs".into()
            })
        );
    }

    #[test]
    fn touch_with_invalid_character() {
        let mut vfs = vfs();
        assert_eq!(
            vfs.touch("a!b.txt", 3),
            Err(VfsError::InvalidName {
                name: "a!b.txt".into()
            })
        );
        assert!(vfs.ls(None).unwrap().is_empty());
    }

    #[test]
    fn rm_showbin_recover_restores_node() {
        let mut vfs = vfs();
        vfs.mkdir("docs").unwrap();
        vfs.cd("docs").unwrap();
        vfs.touch("a.txt", 4).unwrap();
        vfs.cd("..").unwrap();
        assert_eq!(vfs.size("docs"), Ok(14));

        vfs.rm("docs").unwrap();
        assert_eq!(vfs.size("/"), Ok(0));
        assert!(vfs.find("docs").is_empty());

        let shown = vfs.showbin().unwrap();
        assert_eq!(shown.name, "docs");
        assert_eq!(shown.path, "/docs");
        assert_eq!(shown.size, 14);
        assert_eq!(shown.kind, NodeKind::Folder);

        vfs.recover().unwrap();
        assert_eq!(vfs.size("docs"), Ok(14));
        assert_eq!(vfs.size("/"), Ok(14));
        assert_eq!(vfs.find("a.txt"), vec!["/docs/a.txt"]);
        assert!(vfs.bin().is_empty());
        assert_sizes_consistent(&vfs);
    }

    #[test]
    fn rm_missing_name_is_not_found() {
        let mut vfs = vfs();
        assert_eq!(
            vfs.rm("ghost"),
            Err(VfsError::NotFound {
                path: "ghost".into()
            })
        );
    }

    #[test]
    fn recover_nested_entry_into_original_parent() {
        let mut vfs = vfs();
        vfs.mkdir("a").unwrap();
        vfs.cd("a").unwrap();
        vfs.mkdir("b").unwrap();
        vfs.touch("keep.txt", 1).unwrap();
        vfs.rm("b").unwrap();
        vfs.cd("/").unwrap();

        vfs.recover().unwrap();
        assert_eq!(vfs.find("b"), vec!["/a/b"]);
        assert_eq!(vfs.size("/a"), Ok(21));
    }

    #[test]
    fn recover_with_vanished_parent_drops_entry() {
        let mut vfs = vfs();
        vfs.mkdir("a").unwrap();
        vfs.cd("a").unwrap();
        vfs.touch("x.txt", 2).unwrap();
        vfs.rm("x.txt").unwrap();
        vfs.cd("..").unwrap();
        vfs.rm("a").unwrap();
        let before = vfs.tree().len();

        assert_eq!(
            vfs.recover(),
            Err(VfsError::OrphanedParent { path: "/a".into() })
        );
        assert_eq!(vfs.bin().len(), 1);
        assert_eq!(vfs.tree().len(), before - 1);
        assert_eq!(vfs.showbin().unwrap().name, "a");
    }

    #[test]
    fn recover_onto_taken_name_keeps_entry() {
        let mut vfs = vfs();
        vfs.touch("a.txt", 1).unwrap();
        vfs.rm("a.txt").unwrap();
        vfs.touch("a.txt", 9).unwrap();

        assert_eq!(
            vfs.recover(),
            Err(VfsError::DuplicateName {
                name: "a.txt".into()
            })
        );
        assert_eq!(vfs.bin().len(), 1);
        assert_eq!(vfs.size("a.txt"), Ok(9));
    }

    #[test]
    fn recover_and_showbin_on_empty_bin() {
        let mut vfs = vfs();
        assert_eq!(vfs.recover(), Err(VfsError::BinEmpty));
        assert_eq!(vfs.showbin(), Err(VfsError::BinEmpty));
    }

    #[test]
    fn emptybin_releases_all_entries() {
        let mut vfs = vfs();
        vfs.mkdir("a").unwrap();
        vfs.cd("a").unwrap();
        vfs.touch("f", 1).unwrap();
        vfs.cd("..").unwrap();
        vfs.touch("g", 1).unwrap();
        vfs.rm("a").unwrap();
        vfs.rm("g").unwrap();

        assert_eq!(vfs.emptybin(), 3);
        assert!(vfs.bin().is_empty());
        assert_eq!(vfs.tree().len(), 1);
        assert_eq!(vfs.emptybin(), 0);
    }

    #[test]
    fn cd_variants() {
        let mut vfs = vfs();
        vfs.mkdir("a").unwrap();
        vfs.touch("f.txt", 1).unwrap();
        vfs.cd("a").unwrap();
        vfs.mkdir("b").unwrap();
        vfs.cd("/a/b").unwrap();
        assert_eq!(vfs.pwd(), "/a/b");

        vfs.cd("-").unwrap();
        assert_eq!(vfs.pwd(), "/a");
        vfs.cd("-").unwrap();
        assert_eq!(vfs.pwd(), "/a/b");

        vfs.cd("").unwrap();
        assert_eq!(vfs.pwd(), "/");
        assert_eq!(vfs.cd(".."), Err(VfsError::NoParent));
        assert_eq!(
            vfs.cd("f.txt"),
            Err(VfsError::TargetIsFile {
                path: "f.txt".into()
            })
        );
        assert_eq!(
            vfs.cd("/nowhere"),
            Err(VfsError::NotFound {
                path: "/nowhere".into()
            })
        );
        assert_eq!(vfs.pwd(), "/");
    }

    #[test]
    fn rm_of_previous_folder_resets_dash() {
        let mut vfs = vfs();
        vfs.mkdir("a").unwrap();
        vfs.cd("a").unwrap();
        vfs.cd("..").unwrap();
        vfs.rm("a").unwrap();

        vfs.cd("-").unwrap();
        assert_eq!(vfs.pwd(), "/");
    }

    #[test]
    fn mv_relocates_and_updates_both_parents() {
        let mut vfs = vfs();
        vfs.mkdir("src").unwrap();
        vfs.mkdir("dst").unwrap();
        vfs.cd("src").unwrap();
        vfs.touch("f.txt", 6).unwrap();
        vfs.cd("..").unwrap();

        vfs.mv("/src/f.txt", "dst").unwrap();
        assert_eq!(vfs.size("src"), Ok(10));
        assert_eq!(vfs.size("dst"), Ok(16));
        assert_eq!(vfs.size("/"), Ok(26));
        assert_eq!(vfs.find("f.txt"), vec!["/dst/f.txt"]);
        assert_sizes_consistent(&vfs);
    }

    #[test]
    fn mv_errors() {
        let mut vfs = vfs();
        vfs.mkdir("a").unwrap();
        vfs.touch("f.txt", 1).unwrap();
        vfs.cd("a").unwrap();
        vfs.mkdir("inner").unwrap();
        vfs.touch("f.txt", 2).unwrap();
        vfs.cd("/").unwrap();

        assert_eq!(
            vfs.mv("missing", "a"),
            Err(VfsError::NotFound {
                path: "missing".into()
            })
        );
        assert_eq!(
            vfs.mv("a", "f.txt"),
            Err(VfsError::TargetIsFile {
                path: "f.txt".into()
            })
        );
        assert_eq!(
            vfs.mv("a", "/a/inner"),
            Err(VfsError::InvalidMove {
                source_path: "/a".into(),
                target_path: "/a/inner".into()
            })
        );
        assert_eq!(
            vfs.mv("f.txt", "a"),
            Err(VfsError::DuplicateName {
                name: "f.txt".into()
            })
        );
        assert_eq!(vfs.size("f.txt"), Ok(1));
        assert_siblings_unique(&vfs);
    }

    #[test]
    fn mv_to_parent_with_dotdot() {
        let mut vfs = vfs();
        vfs.mkdir("a").unwrap();
        vfs.cd("a").unwrap();
        vfs.touch("up.txt", 3).unwrap();

        vfs.mv("up.txt", "..").unwrap();
        assert_eq!(vfs.size("/up.txt"), Ok(3));
        assert_eq!(vfs.size("/a"), Ok(10));
    }

    #[test]
    fn find_lists_all_matches_in_pre_order() {
        let mut vfs = vfs();
        vfs.mkdir("x").unwrap();
        vfs.cd("x").unwrap();
        vfs.touch("log", 1).unwrap();
        vfs.cd("/").unwrap();
        vfs.mkdir("log").unwrap();

        assert_eq!(vfs.find("log"), vec!["/x/log", "/log"]);
        assert!(vfs.find("nothing").is_empty());
    }

    #[test]
    fn ls_orders_and_sorts() {
        let mut vfs = vfs();
        vfs.touch("small", 1).unwrap();
        vfs.mkdir("dir").unwrap();
        vfs.touch("big", 50).unwrap();
        vfs.touch("tie", 10).unwrap();

        let names = |rows: Vec<Listing>| rows.into_iter().map(|r| r.name).collect::<Vec<_>>();
        assert_eq!(names(vfs.ls(None).unwrap()), vec!["small", "dir", "big", "tie"]);
        assert_eq!(
            names(vfs.ls(Some("sort")).unwrap()),
            vec!["big", "dir", "tie", "small"]
        );
        assert_eq!(
            vfs.ls(Some("-l")),
            Err(VfsError::InvalidParameter {
                parameter: "-l".into()
            })
        );
    }

    #[test]
    fn touch_max_size_under_folder_reports_overflow() {
        let mut vfs = vfs();
        vfs.mkdir("A").unwrap();
        vfs.cd("A").unwrap();

        assert_eq!(
            vfs.touch("f", u64::MAX),
            Err(VfsError::SizeOverflow { path: "/A".into() })
        );
        assert!(vfs.ls(None).unwrap().is_empty());
        assert_eq!(vfs.size("/A"), Ok(10));
        assert_eq!(vfs.tree().len(), 2);
        assert_sizes_consistent(&vfs);
    }

    #[test]
    fn two_large_files_at_root_report_overflow() {
        let half = u64::MAX / 2 + 1;
        let mut vfs = vfs();
        vfs.touch("a", half).unwrap();

        assert_eq!(
            vfs.touch("b", half),
            Err(VfsError::SizeOverflow { path: "/".into() })
        );
        assert!(vfs.find("b").is_empty());
        assert_eq!(vfs.size("/"), Ok(half));
        assert_sizes_consistent(&vfs);
    }

    #[test]
    fn mv_of_huge_file_within_its_branch_succeeds() {
        let mut vfs = vfs();
        vfs.mkdir("d").unwrap();
        vfs.touch("big", u64::MAX - 10).unwrap();

        vfs.mv("big", "d").unwrap();
        assert_eq!(vfs.size("d"), Ok(u64::MAX));
        assert_eq!(vfs.size("/"), Ok(u64::MAX));
        assert_sizes_consistent(&vfs);
    }

    #[test]
    fn recover_that_would_overflow_keeps_entry() {
        let mut vfs = vfs();
        vfs.touch("big", u64::MAX - 5).unwrap();
        vfs.rm("big").unwrap();
        vfs.touch("fill", 10).unwrap();

        assert_eq!(
            vfs.recover(),
            Err(VfsError::SizeOverflow { path: "/".into() })
        );
        assert_eq!(vfs.bin().len(), 1);
        assert_eq!(vfs.size("/"), Ok(10));
        assert!(vfs.find("big").is_empty());
        assert_sizes_consistent(&vfs);
    }

    #[test]
    fn pwd_and_timestamps() {
        let mut vfs = vfs();
        assert_eq!(vfs.pwd(), "/");
        vfs.mkdir("a").unwrap();
        let listing = vfs.ls(None).unwrap();
        assert_eq!(listing[0].created_at, TS);
        assert_eq!(listing[0].kind, NodeKind::Folder);
    }
}
