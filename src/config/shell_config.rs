use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::application::data::ColorChoice;

pub const CONFIG_FILE_NAME: &str = "vfs.yaml";

const DATA_FILE_KEY: &str = "data_file";
const PROMPT_KEY: &str = "prompt";
const SAVE_ON_EXIT_KEY: &str = "save_on_exit";
const COLOR_KEY: &str = "color";

/// Optional settings read from `vfs.yaml`. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellConfig {
    pub data_file: Option<PathBuf>,
    pub prompt: Option<String>,
    pub save_on_exit: Option<bool>,
    pub color: Option<ColorChoice>,
}

impl ShellConfig {
    /// Reads the config at `path`, or returns defaults when there is none.
    pub async fn read(path: &Path) -> Result<Self, ShellConfigError> {
        debug!("Opening config file: {}", path.display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error).context(ReadSnafu {
                    file_path: path.display().to_string(),
                });
            }
        };

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    fn from_mapping(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, ShellConfigError> {
        let color = string_value(top_level, COLOR_KEY)?
            .map(|value| {
                ColorChoice::from_str(value, true).map_err(|_| ShellConfigError::InvalidValue {
                    key: COLOR_KEY.to_string(),
                    expected: "one of auto, always, never".to_string(),
                })
            })
            .transpose()?;

        Ok(ShellConfig {
            data_file: string_value(top_level, DATA_FILE_KEY)?.map(PathBuf::from),
            prompt: string_value(top_level, PROMPT_KEY)?.map(str::to_string),
            save_on_exit: bool_value(top_level, SAVE_ON_EXIT_KEY)?,
            color,
        })
    }
}

impl TryFrom<&str> for ShellConfig {
    type Error = ShellConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(ShellConfig::default());
        };

        let top_level = document
            .as_mapping()
            .ok_or(ShellConfigError::TopLevelNotMap)?;
        Self::from_mapping(top_level)
    }
}

fn lookup<'a, 'y>(
    top_level: &'a LinkedHashMap<Yaml<'y>, Yaml<'y>>,
    key: &'static str,
) -> Option<&'a Yaml<'y>> {
    match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
        None | Some(Yaml::Value(Scalar::Null)) => None,
        found => found,
    }
}

fn string_value<'a>(
    top_level: &'a LinkedHashMap<Yaml<'_>, Yaml<'_>>,
    key: &'static str,
) -> Result<Option<&'a str>, ShellConfigError> {
    match lookup(top_level, key) {
        None => Ok(None),
        Some(Yaml::Value(Scalar::String(value))) => Ok(Some(value.as_ref())),
        Some(_) => InvalidValueSnafu {
            key,
            expected: "a string",
        }
        .fail(),
    }
}

fn bool_value(
    top_level: &LinkedHashMap<Yaml<'_>, Yaml<'_>>,
    key: &'static str,
) -> Result<Option<bool>, ShellConfigError> {
    match lookup(top_level, key) {
        None => Ok(None),
        Some(Yaml::Value(Scalar::Boolean(value))) => Ok(Some(*value)),
        Some(_) => InvalidValueSnafu {
            key,
            expected: "true or false",
        }
        .fail(),
    }
}

#[derive(Debug, Snafu)]
pub enum ShellConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be {}", key, expected))]
    InvalidValue { key: String, expected: String },
}
