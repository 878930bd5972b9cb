use std::path::PathBuf;

use crate::application::data::ColorChoice;
use crate::cli::Cli;
use crate::config::ShellConfig;

pub const DEFAULT_DATA_FILE: &str = "vfs.dat";
pub const DEFAULT_PROMPT: &str = "$";

/// Settings the shell runs with. Command line flags win over the config
/// file, which wins over the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub data_file: PathBuf,
    pub prompt: String,
    pub save_on_exit: bool,
    pub color: ColorChoice,
}

impl RuntimeConfig {
    pub fn new(cli: &Cli, config: ShellConfig) -> Self {
        Self {
            data_file: cli
                .data_file
                .clone()
                .or(config.data_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            prompt: config
                .prompt
                .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            save_on_exit: !cli.no_save && config.save_on_exit.unwrap_or(true),
            color: cli.color.or(config.color).unwrap_or_default(),
        }
    }
}
