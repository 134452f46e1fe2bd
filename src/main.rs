//! Hopgate - routing console for a forwarding proxy
//!
//! Keeps the routing table that decides, per target, whether a connection is
//! refused, made directly, or relayed through a SOCKS upstream.

mod console;

use anyhow::{Context, Result};
use clap::Parser;
use console::Console;
use hopgate_router::{
    RouterContext, RoutingCommandHandler, RoutingRuleStore, SystemResolver, UpstreamChainBuilder,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Hopgate - route connections directly, through SOCKS upstreams, or nowhere
#[derive(Parser, Debug)]
#[command(name = "hopgate")]
#[command(version = env!("GIT_TAG"))]
#[command(long_version = concat!(env!("GIT_TAG"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
#[command(long_about = r#"
Routing console for a forwarding proxy. Startup rules are installed first,
then commands are read from stdin.

EXAMPLES:
  # Relay everything through a local SOCKS5 upstream, except one host
  hopgate --default socks5://127.0.0.1:1080 --reject ads.example.com

  # Send one network through a SOCKS4 upstream with priority 5
  hopgate --route "10.0.0.1 socks4://gw.internal:1080 5"

ENVIRONMENT VARIABLES:
  HOPGATE_DEFAULT          Default route descriptor
  HOPGATE_REJECT           Comma-separated targets to reject
  HOPGATE_CONNECT_TIMEOUT  Connect timeout in seconds
  RUST_LOG                 Log filter (overrides --verbose)
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Default route descriptor (reject, none, or a SOCKS endpoint)
    #[arg(long = "default", env = "HOPGATE_DEFAULT", default_value = "none")]
    default_route: String,

    /// Target to reject (repeatable)
    #[arg(long, env = "HOPGATE_REJECT", value_delimiter = ',')]
    reject: Vec<String>,

    /// Routing entry as "<target> <descriptor> [priority]" (repeatable)
    #[arg(long)]
    route: Vec<String>,

    /// Connect timeout in seconds
    #[arg(long, env = "HOPGATE_CONNECT_TIMEOUT", default_value = "10")]
    connect_timeout: u64,
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    // RUST_LOG wins over --verbose when set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr, stdout belongs to the console
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Install the rules given on the command line
fn apply_startup_rules(handler: &RoutingCommandHandler, cli: &Cli) -> Result<()> {
    // Default route first, so it is entry 1 in listings
    handler
        .run(&["default", cli.default_route.as_str()])
        .with_context(|| format!("Invalid default route '{}'", cli.default_route))?;

    for target in cli.reject.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        handler
            .run(&["reject", target])
            .with_context(|| format!("Invalid reject target '{}'", target))?;
    }

    // Each --route is the argument list of an `add` command
    for route in &cli.route {
        let mut args = vec!["add"];
        args.extend(route.split_whitespace());
        handler
            .run(args.as_slice())
            .with_context(|| format!("Invalid route '{}'", route))?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    info!("Hopgate starting...");

    // Build the routing layer
    let ctx = RouterContext::new(Arc::new(SystemResolver))
        .with_connect_timeout(Duration::from_secs(cli.connect_timeout));
    let store = Arc::new(RoutingRuleStore::new());
    let handler = RoutingCommandHandler::new(UpstreamChainBuilder::new(ctx), Arc::clone(&store));

    // A bad startup rule is fatal
    apply_startup_rules(&handler, &cli).context("Failed to apply startup rules")?;
    info!("{} routing entries installed", store.len());

    // Serve the console until it ends or Ctrl+C
    let console = Console::new(handler);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = console.run(stdin, tokio::io::stdout()) => {
            result.context("Console I/O failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    info!("Hopgate stopped");
    Ok(())
}
