#![allow(clippy::enum_variant_names)]

use clap::Parser as _;
use supports_color::Stream;
use tracing::debug;

use crate::application::data::LogLevel;
use crate::application::{Application, ApplicationError};
use crate::cli::Cli;

mod application;
mod cli;
mod config;
mod ext;
mod filesystem;
mod shell;
mod storage;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    debug!("vfs {} with {:?}", env!("CARGO_PKG_VERSION"), cli);

    Application::run(cli).await
}

// stdout carries command output only.
fn init_logging(log_level: LogLevel) {
    let Some(level) = log_level.to_tracing_level() else {
        return;
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(supports_color::on(Stream::Stderr).is_some())
        .with_target(false)
        .without_time()
        .compact()
        .init();
}
