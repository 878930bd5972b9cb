use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VfsError {
    #[snafu(display("'{}' is not a valid name", name))]
    InvalidName { name: String },
    #[snafu(display("'{}' already exists in this folder", name))]
    DuplicateName { name: String },
    #[snafu(display("'{}' does not exist", path))]
    NotFound { path: String },
    #[snafu(display("'{}' is a file, not a folder", path))]
    TargetIsFile { path: String },
    #[snafu(display("Root has no parent folder"))]
    NoParent,
    #[snafu(display("Bin is empty"))]
    BinEmpty,
    #[snafu(display("Original location '{}' no longer exists", path))]
    OrphanedParent { path: String },
    #[snafu(display("Invalid parameter '{}'", parameter))]
    InvalidParameter { parameter: String },
    #[snafu(display("Size of '{}' would exceed {} bytes", path, u64::MAX))]
    SizeOverflow { path: String },
    #[snafu(display("Cannot move '{}' into '{}'", source_path, target_path))]
    InvalidMove {
        source_path: String,
        target_path: String,
    },
}
