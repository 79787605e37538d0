use std::path::PathBuf;

use thiserror::Error;

use crate::config::DEFAULT_CONFIG_FILE;

pub const USAGE: &str = "usage: staticd [-p port] [-d] [-l logfile] [-r chroot] [-c config]";

/// Command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// `-p`: overrides the port from the config file
    pub port: Option<u16>,
    /// `-d`: detach from the terminal and run in the background
    pub daemonize: bool,
    /// `-l`: append log output to this file
    pub log_file: Option<PathBuf>,
    /// `-r`: confine the process to this directory
    pub chroot: Option<PathBuf>,
    /// `-c`: config file to read
    pub config: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            port: None,
            daemonize: false,
            log_file: None,
            chroot: None,
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("option -{0} requires a value\n{USAGE}")]
    MissingValue(char),
    #[error("port must be an integer between 1 and 65535, got '{0}'")]
    InvalidPort(String),
    #[error("unknown option '{0}'\n{USAGE}")]
    UnknownOption(String),
    #[error("unexpected argument '{0}'\n{USAGE}")]
    UnexpectedArgument(String),
}

impl Args {
    /// Parses options getopt-style: a value may follow its flag directly
    /// (`-p8080`) or as the next argument (`-p 8080`).
    ///
    /// The program name must not be part of `args`.
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut parsed = Args::default();
        let mut args = args.into_iter().map(Into::<String>::into);

        while let Some(arg) = args.next() {
            let Some(flags) = arg.strip_prefix('-').filter(|f| !f.is_empty()) else {
                return Err(ArgsError::UnexpectedArgument(arg.clone()));
            };

            let mut chars = flags.chars();
            let Some(flag) = chars.next() else {
                return Err(ArgsError::UnknownOption(arg.clone()));
            };
            let attached = chars.as_str();

            if flag == 'd' {
                if !attached.is_empty() {
                    return Err(ArgsError::UnknownOption(arg.clone()));
                }
                parsed.daemonize = true;
                continue;
            }

            if !matches!(flag, 'p' | 'l' | 'r' | 'c') {
                return Err(ArgsError::UnknownOption(arg.clone()));
            }

            let value = if attached.is_empty() {
                args.next().ok_or(ArgsError::MissingValue(flag))?
            } else {
                attached.to_string()
            };

            match flag {
                'p' => parsed.port = Some(parse_port(&value)?),
                'l' => parsed.log_file = Some(PathBuf::from(value)),
                'r' => parsed.chroot = Some(PathBuf::from(value)),
                _ => parsed.config = PathBuf::from(value),
            }
        }

        Ok(parsed)
    }
}

fn parse_port(value: &str) -> Result<u16, ArgsError> {
    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ArgsError::InvalidPort(value.to_string())),
    }
}
