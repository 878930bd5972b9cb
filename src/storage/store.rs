use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use super::codec::{self, DecodeError};
use crate::filesystem::Tree;

/// Reads the data file at `path`. A missing file is not an error: it means
/// no filesystem was saved yet.
pub async fn load(path: &Path) -> Result<Option<Tree>, StoreError> {
    debug!("Reading data file: {}", path.display());
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            info!("No data file at {}, starting fresh", path.display());
            return Ok(None);
        }
        Err(error) => {
            return Err(error).context(ReadSnafu { path });
        }
    };

    let contents = String::from_utf8(bytes).context(EncodingSnafu { path })?;
    let tree = codec::decode(&contents).context(DecodeFailureSnafu { path })?;
    info!("Loaded {} nodes from {}", tree.len(), path.display());
    Ok(Some(tree))
}

pub async fn save(path: &Path, tree: &Tree) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .context(WriteSnafu { path: parent })?;
    }

    let contents = codec::encode(tree);
    let bytes = contents.len();
    fs::write(path, contents.into_bytes())
        .await
        .0
        .context(WriteSnafu { path })?;
    info!("Saved {} bytes to {}", bytes, path.display());
    Ok(())
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Failed to read the data file: {}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Data file {} is not valid UTF-8", path.display()))]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the data file: {}", path.display()))]
    DecodeFailure { path: PathBuf, source: DecodeError },
    #[snafu(display("Failed to write the data file: {}", path.display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}
