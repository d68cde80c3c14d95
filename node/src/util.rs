use crate::node::Node;
use std::sync::Arc;
use tinylib::config::NodeConfig;
use tinylib::miner;
use tinylib::network::Message;
use tokio::time::{self, Duration};
use tracing::{info, warn};

pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}

/// The mining timer: one attempt per tick against a fresh snapshot of chain
/// and pool. A block accepted from a peer between ticks simply moves the
/// next attempt onto the new tip, so no explicit cancellation is needed.
pub async fn mine_loop(node: Arc<Node>) {
    let config = NodeConfig::global();
    let mut interval = time::interval(Duration::from_millis(config.mine_interval_ms));
    loop {
        interval.tick().await;
        let mined = {
            let mut state = node.state.write().await;
            let state = &mut *state;
            let Some(block) =
                miner::attempt(&state.chain, state.pool.txs(), &node.wallet.public_key())
            else {
                continue;
            };
            match state.chain.add_block(block.clone()) {
                Ok(()) => {
                    state.pool.remove_block_txs(&block);
                    info!(
                        "mined block {} at height {}",
                        block.hash,
                        state.chain.block_height()
                    );
                    Some(state.chain.tip().clone())
                }
                Err(e) => {
                    warn!("discarding own block: {e}");
                    None
                }
            }
        };
        if let Some(block) = mined {
            node.broadcast(&Message::LatestBlock { block }, None).await;
        }
    }
}
