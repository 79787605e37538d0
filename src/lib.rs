//! staticd - minimal origin HTTP server
//!
//! Serves static files from a document root over GET and HEAD.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod http;
pub mod jail;
pub mod logging;
pub mod server;
