use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Port used when neither the command line nor the config file sets one.
pub const DEFAULT_PORT: u16 = 8080;

/// Config file read when `-c` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "web.conf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Canonical path of the directory files are served from.
    pub document_root: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: failed to open config file: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config error at line {line}: {fault}\n>> '{text}'")]
    Line {
        line: usize,
        text: String,
        fault: LineFault,
    },
    #[error("no document-dir setting")]
    MissingDocumentRoot,
}

/// What was wrong with a single config line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineFault {
    #[error("bad syntax")]
    BadSyntax,
    #[error("invalid port")]
    InvalidPort,
    #[error("invalid directory")]
    InvalidDirectory,
    #[error("{0}")]
    Inaccessible(String),
    #[error("unsupported config setting")]
    Unsupported,
}

impl Config {
    /// Reads and parses the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses `key = value` settings.
    ///
    /// Recognized keys (case-insensitive) are `port` and `document-dir`.
    /// Blanks outside double quotes are ignored, backslashes are dropped and
    /// lines starting with `#` are comments.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut port = None;
        let mut document_root = None;

        for (idx, text_line) in text.lines().enumerate() {
            let fail = |fault| ConfigError::Line {
                line: idx + 1,
                text: text_line.to_string(),
                fault,
            };

            let Some((key, value)) = split_setting(text_line).map_err(fail)? else {
                continue;
            };

            if key.eq_ignore_ascii_case("port") {
                port = Some(parse_port(&value).map_err(fail)?);
            } else if key.eq_ignore_ascii_case("document-dir") {
                document_root = Some(parse_directory(&value).map_err(fail)?);
            } else {
                return Err(fail(LineFault::Unsupported));
            }
        }

        Ok(Self {
            port: port.unwrap_or(DEFAULT_PORT),
            document_root: document_root.ok_or(ConfigError::MissingDocumentRoot)?,
        })
    }

    /// Applies a port given on the command line, which wins over the file.
    pub fn with_port_override(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

/// Splits one line into key and value. Blank and comment lines give `None`.
fn split_setting(line: &str) -> Result<Option<(String, String)>, LineFault> {
    if line.trim_start().starts_with('#') {
        return Ok(None);
    }

    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '\\' => continue,
            ' ' | '\t' if !quoted => continue,
            '"' => {
                quoted = !quoted;
                continue;
            }
            '=' if !in_value && !quoted => {
                in_value = true;
                continue;
            }
            _ => {}
        }

        if in_value {
            value.push(ch);
        } else {
            key.push(ch);
        }
    }

    match (key.is_empty(), value.is_empty()) {
        (true, true) => Ok(None),
        (false, false) => Ok(Some((key, value))),
        _ => Err(LineFault::BadSyntax),
    }
}

fn parse_port(value: &str) -> Result<u16, LineFault> {
    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(LineFault::InvalidPort),
    }
}

fn parse_directory(value: &str) -> Result<PathBuf, LineFault> {
    let metadata =
        std::fs::metadata(value).map_err(|e| LineFault::Inaccessible(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(LineFault::InvalidDirectory);
    }
    std::fs::canonicalize(value).map_err(|e| LineFault::Inaccessible(e.to_string()))
}
