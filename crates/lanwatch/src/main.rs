//! `lanwatch` -- LAN watcher daemon.
//!
//! Polls the router for the active device set on a fixed interval,
//! diffs it against a whitelist of known MACs, and toggles the
//! download client's speed limit (with webhook notification) when an
//! unfamiliar device appears.
//!
//! Entry point: CLI argument parsing, tracing setup, config loading,
//! backend construction, and graceful ctrl-c shutdown.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lanwatch_api::{FeedClient, HttpHostQuery, RouterClient, ZxhnClient};
use lanwatch_config::{Backend, Config};
use lanwatch_core::{CycleOutcome, ModeSource, Notifier, ThrottleClient, Watcher, Whitelist};

/// Throttle downloads when unfamiliar devices join the network.
#[derive(Parser, Debug)]
#[command(name = "lanwatch", version, about)]
struct Cli {
    /// Path to the configuration file (defaults to the XDG location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single check cycle, print the result, and exit
    #[arg(long)]
    once: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = lanwatch_config::load(cli.config.as_deref())?;
    let watcher = build_watcher(&config)?;

    if cli.once {
        let outcome = watcher.run_cycle().await?;
        print_outcome(&outcome);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_cancel.cancel();
        }
    });

    watcher.run(cancel).await;
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wire the watcher from configuration: backend selection happens here,
/// once, and never again at call time.
fn build_watcher(config: &Config) -> Result<Watcher> {
    let transport = config.transport();

    let router = match config.router.backend {
        Backend::Zxhn => RouterClient::Zxhn(ZxhnClient::new(
            config.router_url()?,
            config.router.username.clone(),
            config.resolve_password()?,
            &transport,
        )?),
        Backend::Feed => RouterClient::Feed(FeedClient::new(HttpHostQuery::new(
            config.feed_url()?,
            &transport,
        )?)),
    };

    let whitelist: Whitelist = config.watch.whitelist.iter().collect();
    if whitelist.is_empty() {
        info!("whitelist is empty; every device counts as unfamiliar");
    }

    let throttle = ThrottleClient::new(config.toggle_url()?, config.state_url()?, &transport)?;

    let mut watcher = Watcher::new(router, whitelist, throttle, config.interval());

    if let Some(mode_url) = config.mode_url()? {
        watcher = watcher.with_mode_source(ModeSource::new(mode_url, &transport)?);
    }
    if let Some(webhook_url) = config.webhook_url()? {
        watcher = watcher.with_notifier(Notifier::new(
            webhook_url,
            config.notify.username.clone(),
            &transport,
        )?);
    }

    Ok(watcher)
}

fn print_outcome(outcome: &CycleOutcome) {
    println!("mode: {:?}", outcome.mode);
    match outcome.limited {
        Some(true) => println!("speed limit: on"),
        Some(false) => println!("speed limit: off"),
        None => println!("speed limit: unknown"),
    }
    println!("online hosts: {}", outcome.hosts.len());
    for host in &outcome.hosts {
        let familiar = !outcome.strangers.iter().any(|s| s.mac == host.mac);
        let tag = if familiar { "" } else { "  (unfamiliar)" };
        let ip = host.ip.as_deref().unwrap_or("-");
        println!("  {:<17}  {:<15}  {}{tag}", host.mac, ip, host.name);
    }
    println!("action: {:?}", outcome.action);
}
