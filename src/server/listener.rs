use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinSet;
use tracing::info;

use crate::config::Config;
use crate::http::connection;
use crate::http::resolver::Resolver;

/// Accepts connections and serves each one on its own task.
pub struct Server {
    listener: TcpListener,
    resolver: Arc<Resolver>,
}

impl Server {
    pub async fn bind(addr: impl ToSocketAddrs, resolver: Resolver) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("failed to bind listening socket")?;

        Ok(Self {
            listener,
            resolver: Arc::new(resolver),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop.
    ///
    /// Finished connection tasks are reaped as the loop goes; a panicking
    /// task is logged and does not affect the others. Failed accepts are
    /// logged and the loop continues.
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            addr = %self.local_addr()?,
            root = %self.resolver.document_root().display(),
            "Listening"
        );

        let mut workers = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, peer)) => {
                        tracing::debug!(peer = %peer, "Accepted connection");
                        workers.spawn(connection::serve(socket, peer, Arc::clone(&self.resolver)));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },

                Some(finished) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = finished {
                        tracing::error!(error = %e, "Connection task failed");
                    }
                }
            }
        }
    }
}

/// Binds the configured port on all interfaces and serves forever.
pub async fn run(cfg: &Config, resolver: Resolver) -> anyhow::Result<()> {
    let server = Server::bind(("0.0.0.0", cfg.port), resolver)
        .await
        .with_context(|| format!("cannot listen on port {}", cfg.port))?;
    server.run().await
}
