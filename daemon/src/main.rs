//! BLN daemon — entry point for running a node.
//!
//! Wires a node over in-memory storage with the null broadcaster, starts
//! its five worker threads, and stops them again on Ctrl-C (`SIGINT`'s
//! default disposition already terminates the process; we just also let
//! `stop` run so the threads are joined instead of abandoned). Opens no
//! sockets: peer transport, RPC, and WebSocket surfaces are named-interface
//! collaborators this binary doesn't implement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bln_ledger::genesis::{create_genesis_block, genesis_creator, genesis_hash, GenesisConfig};
use bln_nullables::NullStore;
use bln_types::{NetworkId, NodeConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "bln-daemon", about = "BLN protocol node daemon")]
struct Cli {
    /// Network to connect to.
    #[arg(long, default_value = "dev")]
    network: String,

    /// Number of vote-processor worker threads.
    #[arg(long, default_value_t = 2)]
    vote_threads: usize,

    /// Election loop request interval, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    request_interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let network = match cli.network.as_str() {
        "live" => NetworkId::Live,
        "test" => NetworkId::Test,
        _ => NetworkId::Dev,
    };

    let config = NodeConfig {
        network,
        ..Default::default()
    };
    bln_node::init_logging(&config.logging);
    tracing::info!(network = network.as_str(), "starting node");

    let store = NullStore::new();
    let mut node = bln_node::BlnNode::new(store, &config.consensus);

    let creator = genesis_creator(network);
    let genesis = GenesisConfig {
        network,
        creator: creator.clone(),
    };
    node.ledger.process(&creator, create_genesis_block(&genesis))?;
    tracing::info!(hash = ?genesis_hash(network), "genesis seeded");

    node.start(
        Arc::new(bln_node::NullObservers),
        Arc::new(bln_node::NullCementedCallback),
        cli.vote_threads,
        Duration::from_millis(cli.request_interval_ms),
    );

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .expect("failed to install SIGINT handler");
    }
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(200));
    }

    tracing::info!("shutting down");
    node.stop();
    Ok(())
}
