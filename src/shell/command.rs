use std::num::ParseIntError;
use std::string::FromUtf8Error;
use std::str::FromStr;

use snafu::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Pwd,
    Ls { flag: Option<String> },
    Mkdir { name: String },
    Touch { name: String, size: u64 },
    Cd { path: String },
    Rm { name: String },
    Find { name: String },
    Mv { source: String, target: String },
    Size { path: String },
    Showbin,
    Emptybin,
    Recover,
    Exit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let mut args = Arguments {
            command: name,
            words,
        };

        let command = match name {
            "help" => Command::Help,
            "pwd" => Command::Pwd,
            "ls" => Command::Ls {
                flag: args.optional(),
            },
            "mkdir" => Command::Mkdir {
                name: args.required("foldername")?,
            },
            "touch" => {
                let name = args.required("filename")?;
                let size = args.required("size")?;
                let size = size.parse().context(InvalidSizeSnafu { value: size })?;
                Command::Touch { name, size }
            }
            "cd" => Command::Cd {
                path: args.optional().unwrap_or_default(),
            },
            "rm" => Command::Rm {
                name: args.required("name")?,
            },
            "find" => Command::Find {
                name: args.required("name")?,
            },
            "mv" => Command::Mv {
                source: args.required("source")?,
                target: args.required("folder")?,
            },
            "size" => Command::Size {
                path: args.required("path")?,
            },
            "showbin" => Command::Showbin,
            "emptybin" => Command::Emptybin,
            "recover" => Command::Recover,
            "exit" | "quit" => Command::Exit,
            _ => return UnknownCommandSnafu { name }.fail(),
        };

        args.finish()?;
        Ok(command)
    }
}

struct Arguments<'a, I> {
    command: &'a str,
    words: I,
}

impl<'a, I: Iterator<Item = &'a str>> Arguments<'a, I> {
    fn optional(&mut self) -> Option<String> {
        self.words.next().map(str::to_string)
    }

    fn required(&mut self, argument: &str) -> Result<String, CommandError> {
        self.optional().context(MissingArgumentSnafu {
            command: self.command,
            argument,
        })
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.words.next() {
            Some(argument) => UnexpectedArgumentSnafu {
                command: self.command,
                argument,
            }
            .fail(),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum CommandError {
    #[snafu(display("Input line is not valid UTF-8"))]
    InvalidEncoding { source: FromUtf8Error },
    #[snafu(display("Unknown command '{}', type 'help' for a list of commands", name))]
    UnknownCommand { name: String },
    #[snafu(display("'{}' expects a <{}> argument", command, argument))]
    MissingArgument { command: String, argument: String },
    #[snafu(display("'{}' does not take the extra argument '{}'", command, argument))]
    UnexpectedArgument { command: String, argument: String },
    #[snafu(display("'{}' is not a valid size", value))]
    InvalidSize {
        value: String,
        source: ParseIntError,
    },
}
