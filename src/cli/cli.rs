use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{ColorChoice, LogLevel};
use crate::config::CONFIG_FILE_NAME;

/// Interactive shell over an in-memory filesystem that persists to a flat text file.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// File the filesystem is loaded from and saved to [default: vfs.dat]
    #[clap(long, short)]
    pub data_file: Option<PathBuf>,

    /// Optional YAML config file
    #[clap(long, short, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Do not write the data file when the shell exits
    #[clap(long)]
    pub no_save: bool,

    #[clap(long, value_enum)]
    pub color: Option<ColorChoice>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
