use anyhow::Result;
use argh::FromArgs;
use std::sync::Arc;
use tinylib::config::NodeConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod handler;
mod node;
mod repl;
mod util;

use node::Node;

#[derive(FromArgs)]
/// A minimal proof-of-work cryptocurrency node
struct Args {
    #[argh(option)]
    /// port number (defaults to NODE_PORT env var or 3151)
    port: Option<u16>,
    #[argh(positional)]
    /// addresses of initial peers (can also use INITIAL_PEERS env var)
    peers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    util::init_tracing();
    let config = NodeConfig::global();
    let args: Args = argh::from_env();

    // Priority: CLI args > environment vars > defaults
    let port = args.port.unwrap_or(config.port);
    let mut peers = args.peers;
    if peers.is_empty() {
        peers = config.initial_peers.clone();
    }

    let node = Arc::new(Node::new());
    info!("wallet key: {}", node.wallet.public_key());

    for peer in &peers {
        if let Err(e) = node.clone().connect(peer.clone()).await {
            warn!("could not reach initial peer {peer}: {e}");
        }
    }

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    let accept_node = node.clone();
    tokio::spawn(async move {
        loop {
            let (socket, remote) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };
            if accept_node.peer_count() >= NodeConfig::global().max_peers {
                // over the cap: accept, then immediately decline
                warn!("peer limit reached, declining {remote}");
                drop(socket);
                continue;
            }
            accept_node.clone().adopt(remote.to_string(), socket);
        }
    });

    repl::run(node).await
}
