use std::io::IsTerminal;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{ShellConfig, ShellConfigError};
use crate::ext::current_timestamp;
use crate::filesystem::Vfs;
use crate::shell::{Shell, ShellOptions};
use crate::storage::{self, StoreError};

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let config = ShellConfig::read(&cli.config).await.context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);
        let runtime = RuntimeConfig::new(&cli, config);
        debug!("Runtime config: {:?}", runtime);

        let vfs = match storage::load(&runtime.data_file)
            .await
            .context(LoadSnafu)?
        {
            Some(tree) => Vfs::from_tree(tree, current_timestamp),
            None => Vfs::new(current_timestamp),
        };

        let stdin = std::io::stdin();
        let options = ShellOptions {
            prompt: runtime.prompt.clone(),
            color: runtime.color.enabled(),
            interactive: stdin.is_terminal(),
        };
        let mut shell = Shell::new(vfs, options);
        shell
            .run(stdin.lock(), &mut std::io::stdout().lock())
            .context(TerminalSnafu)?;

        let bin = shell.vfs().bin();
        if !bin.is_empty() {
            info!("Discarding {} entries left in the bin", bin.len());
        }

        if runtime.save_on_exit {
            storage::save(&runtime.data_file, shell.vfs().tree())
                .await
                .context(SaveSnafu)?;
        } else {
            info!("Saving disabled, discarding changes");
        }

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading the config"))]
    ConfigError { source: ShellConfigError },
    #[snafu(display("Critical failure encountered while loading the filesystem"))]
    LoadError { source: StoreError },
    #[snafu(display("Critical failure encountered while talking to the terminal"))]
    TerminalError { source: std::io::Error },
    #[snafu(display("Critical failure encountered while saving the filesystem"))]
    SaveError { source: StoreError },
}
