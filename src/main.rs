//! lockblog - A static markdown blog gated behind an on-chain membership lock.

mod access;
mod build;
mod cli;
mod config;
mod content;
mod gate;
mod generator;
mod init;
mod logger;
mod paywall;
mod render;
mod serve;
mod session;
mod utils;
mod wallet;
mod watch;

use access::{AccessOracle, AccessResult, RpcOracle, query_access};
use anyhow::{Context, Result, bail};
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use init::new_site;
use paywall::Paywall;
use serve::{ServeContext, serve_site};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = SiteConfig::load(&cli)?;
    config.validate(&cli)?;

    match &cli.command {
        Commands::Init { name } => new_site(&config, name.is_some()),
        Commands::Build { .. } => {
            let paywall = Paywall::new(&config.lock, &config.paywall)?;
            build_site(&config, &paywall).map(|_| ())
        }
        Commands::Serve { .. } => {
            let paywall = Paywall::new(&config.lock, &config.paywall)?;
            let (server, _) = serve::bind(&mut config)?;
            let posts = build_site(&config, &paywall)?;

            let runtime = runtime()?;
            let oracle: Arc<dyn AccessOracle> =
                Arc::new(RpcOracle::new(&config.lock.rpc_url, config.lock.verify_chain)?);
            let ctx = ServeContext::new(config, paywall, posts, oracle, runtime.handle().clone())?;
            serve_site(server, Arc::new(ctx))
        }
        Commands::Access { address } => check_access(&config, address),
        Commands::Checkout { redirect } => {
            let paywall = Paywall::new(&config.lock, &config.paywall)?;
            println!("{}", paywall.checkout_url(paywall.checkout_request(), redirect.as_deref()));
            Ok(())
        }
    }
}

/// Multi-threaded runtime for oracle queries; request handling stays on the main thread.
fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("lockblog-access")
        .build()
        .context("Failed to start async runtime")
}

/// One-shot membership query for `address`.
fn check_access(config: &SiteConfig, address: &str) -> Result<()> {
    let lock = config.lock.lock()?;
    let oracle = RpcOracle::new(&config.lock.rpc_url, config.lock.verify_chain)?;

    match runtime()?.block_on(query_access(&oracle, &lock, address)) {
        AccessResult::Resolved(true) => {
            println!("{address}: access granted");
            Ok(())
        }
        AccessResult::Resolved(false) => {
            println!("{address}: no membership");
            Ok(())
        }
        AccessResult::Failed(reason) => bail!("{address}: {reason}"),
        AccessResult::Loading => bail!("{address}: query did not complete"),
    }
}
