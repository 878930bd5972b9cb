use std::io::{self, BufRead, Write};

use colored::Colorize;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use super::command::{Command, InvalidEncodingSnafu};
use crate::filesystem::{BinView, Listing, NodeKind, Vfs, VfsError};

const HELP: &str = "\
List of available commands:
help                          : Prints this list of commands
pwd                           : Prints the path of the current folder
ls [sort]                     : Lists the current folder, sorted by descending size with 'sort'
mkdir <foldername>            : Creates a folder under the current folder
touch <filename> <size>       : Creates a file of the given size under the current folder
cd [foldername|..|-|/path]    : Changes the current folder (no argument goes to the root)
rm <foldername>|<filename>    : Moves a file or folder of the current folder to the bin
find <foldername>|<filename>  : Prints the path of every file or folder with that name
mv <file> <folder>            : Moves a file or folder into another folder
size <path>                   : Prints the total size of a file or folder
showbin                       : Shows the oldest entry of the bin
emptybin                      : Empties the bin
recover                       : Restores the oldest entry of the bin to its original folder
exit                          : Saves and quits";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub prompt: String,
    pub color: bool,
    /// Print a prompt before every line; off when input is piped.
    pub interactive: bool,
}

pub struct Shell {
    vfs: Vfs,
    options: ShellOptions,
}

impl Shell {
    pub fn new(vfs: Vfs, options: ShellOptions) -> Self {
        Self { vfs, options }
    }

    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    /// Runs until `exit` or the end of `input`. Command failures are printed
    /// and do not stop the loop; only I/O errors on the streams do.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> io::Result<()> {
        self.print_prompt(output)?;
        for bytes in input.split(b'\n') {
            let flow = match String::from_utf8(bytes?).context(InvalidEncodingSnafu) {
                Ok(line) => self.run_line(line.trim(), output)?,
                Err(error) => {
                    self.print_error(output, &error)?;
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                return Ok(());
            }

            self.print_prompt(output)?;
        }

        if self.options.interactive {
            writeln!(output)?;
        }
        Ok(())
    }

    fn run_line(&mut self, line: &str, output: &mut impl Write) -> io::Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        debug!("Running '{}'", line);
        match line.parse::<Command>() {
            Ok(command) => self.execute(command, output),
            Err(error) => {
                self.print_error(output, &error)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command, output: &mut impl Write) -> io::Result<Flow> {
        if command == Command::Exit {
            return Ok(Flow::Exit);
        }

        match self.apply(command, output) {
            Ok(()) => Ok(Flow::Continue),
            Err(StepError::Rejected { source }) => {
                self.print_error(output, &source)?;
                Ok(Flow::Continue)
            }
            Err(StepError::Output { source }) => Err(source),
        }
    }

    fn apply(&mut self, command: Command, output: &mut impl Write) -> Result<(), StepError> {
        match command {
            Command::Help => writeln!(output, "{HELP}").context(OutputSnafu)?,
            Command::Pwd => writeln!(output, "{}", self.vfs.pwd()).context(OutputSnafu)?,
            Command::Ls { flag } => {
                let listings = self.vfs.ls(flag.as_deref()).context(RejectedSnafu)?;
                for listing in &listings {
                    writeln!(output, "{}", self.format_listing(listing)).context(OutputSnafu)?;
                }
            }
            Command::Mkdir { name } => {
                self.vfs.mkdir(&name).context(RejectedSnafu)?;
            }
            Command::Touch { name, size } => {
                self.vfs.touch(&name, size).context(RejectedSnafu)?;
            }
            Command::Cd { path } => self.vfs.cd(&path).context(RejectedSnafu)?,
            Command::Rm { name } => self.vfs.rm(&name).context(RejectedSnafu)?,
            Command::Find { name } => {
                for path in self.vfs.find(&name) {
                    writeln!(output, "{path}").context(OutputSnafu)?;
                }
            }
            Command::Mv { source, target } => {
                self.vfs.mv(&source, &target).context(RejectedSnafu)?
            }
            Command::Size { path } => {
                let size = self.vfs.size(&path).context(RejectedSnafu)?;
                writeln!(output, "{size}").context(OutputSnafu)?;
            }
            Command::Showbin => {
                let view = self.vfs.showbin().context(RejectedSnafu)?;
                writeln!(output, "{}", self.format_bin_view(&view)).context(OutputSnafu)?;
            }
            Command::Emptybin => {
                self.vfs.emptybin();
            }
            Command::Recover => {
                self.vfs.recover().context(RejectedSnafu)?;
            }
            Command::Exit => {}
        }
        Ok(())
    }

    fn format_listing(&self, listing: &Listing) -> String {
        format!(
            "{:>4} {} {:>10} {}",
            listing.kind.to_string(),
            self.paint_name(format!("{:>15}", listing.name), listing.kind),
            listing.size,
            listing.created_at
        )
    }

    fn format_bin_view(&self, view: &BinView) -> String {
        format!(
            "{:>4} {} {:>5} {:>15} {}",
            view.kind.to_string(),
            self.paint_name(format!("{:>10}", view.name), view.kind),
            view.size,
            view.path,
            view.created_at
        )
    }

    fn paint_name(&self, padded: String, kind: NodeKind) -> String {
        match (self.options.color, kind) {
            (true, NodeKind::Folder) => padded.blue().bold().to_string(),
            (true, NodeKind::File) => padded.green().to_string(),
            (false, _) => padded,
        }
    }

    fn print_prompt(&self, output: &mut impl Write) -> io::Result<()> {
        if !self.options.interactive {
            return Ok(());
        }
        let path = self.vfs.pwd();
        let path = if self.options.color {
            path.cyan().to_string()
        } else {
            path
        };
        write!(output, "{}{} ", path, self.options.prompt)?;
        output.flush()
    }

    fn print_error(
        &self,
        output: &mut impl Write,
        error: &dyn std::error::Error,
    ) -> io::Result<()> {
        let label = if self.options.color {
            "Error:".red().bold().to_string()
        } else {
            "Error:".to_string()
        };
        writeln!(output, "{label} {error}")
    }
}

#[derive(Debug, Snafu)]
enum StepError {
    #[snafu(display("{source}"))]
    Rejected { source: VfsError },
    #[snafu(display("Failed to write command output"))]
    Output { source: io::Error },
}
