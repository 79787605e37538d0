use anyhow::Context;

use staticd::cli::Args;
use staticd::config::Config;
use staticd::daemon::Daemon;
use staticd::http::resolver::Resolver;
use staticd::jail::Jail;
use staticd::logging;
use staticd::server::listener;

fn main() -> anyhow::Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;

    let mut cfg = Config::load(&args.config)?.with_port_override(args.port);
    let mut log_file = args.log_file.clone();

    // The null device has to be opened before the jail hides it.
    let daemon = args.daemonize.then(Daemon::prepare).transpose()?;

    if let Some(root) = &args.chroot {
        let jail = Jail::new(root)?;
        cfg.document_root = jail.rebase(&cfg.document_root)?;
        log_file = log_file.map(|path| jail.rebase(&path)).transpose()?;
        jail.enter()?;
    }

    logging::init(log_file.as_deref())?;

    if let Some(root) = &args.chroot {
        tracing::info!(root = %root.display(), "Confined to chroot");
    }

    let resolver = Resolver::new(&cfg.document_root).with_context(|| {
        format!("invalid document root {}", cfg.document_root.display())
    })?;

    // Forking is only sound while no runtime threads exist.
    if let Some(daemon) = daemon {
        daemon.detach()?;
        tracing::info!(pid = std::process::id(), "Detached from terminal");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(serve(cfg, resolver))
}

async fn serve(cfg: Config, resolver: Resolver) -> anyhow::Result<()> {
    tokio::select! {
        res = listener::run(&cfg, resolver) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
