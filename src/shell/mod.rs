mod command;
mod shell;

pub use shell::{Shell, ShellOptions};
