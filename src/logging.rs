//! Log output: subscriber installation and access-log records.
//!
//! Everything goes through one `tracing` subscriber: the `-l` file when one
//! is given, stdout otherwise. There is no syslog sink; under `-d` stdout is
//! the null device, so a detached server should be started with `-l`.

use std::fmt;
use std::fs::OpenOptions;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local};

/// Installs the global `tracing` subscriber.
///
/// With a log file, events are appended to it without ANSI colouring;
/// otherwise they go to stdout.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

/// One line of the access log, in Common Log Format:
///
/// ```text
/// 127.0.0.1 - - [05/Mar/2024:14:07:09 +0100] "GET /index.html HTTP/1.1" 200 1043
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub peer: IpAddr,
    pub timestamp: DateTime<FixedOffset>,
    pub method: Option<String>,
    pub uri: Option<String>,
    pub version: Option<String>,
    pub status: u16,
    /// `None` is rendered as `-` (unknown length or HEAD request).
    pub content_length: Option<u64>,
}

impl AccessRecord {
    /// Creates a record stamped with the current local time.
    pub fn now(
        peer: IpAddr,
        method: Option<String>,
        uri: Option<String>,
        version: Option<String>,
        status: u16,
        content_length: Option<u64>,
    ) -> Self {
        Self {
            peer,
            timestamp: Local::now().into(),
            method,
            uri,
            version,
            status,
            content_length,
        }
    }

    fn request_line(&self) -> String {
        [&self.method, &self.uri, &self.version]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{}\" {} ",
            self.peer,
            self.timestamp.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
        )?;

        match self.content_length {
            Some(len) => write!(f, "{len}"),
            None => f.write_str("-"),
        }
    }
}
