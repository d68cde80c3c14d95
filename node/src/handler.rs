use crate::node::Node;
use std::cmp::Ordering;
use std::io::ErrorKind;
use std::sync::Arc;
use tinylib::network::Message;
use tokio::net::tcp::OwnedReadHalf;
use tracing::{debug, info, warn};

/// Per-peer receive loop. One undecodable frame is logged and skipped so a
/// single malformed message never costs us the connection; a transport
/// error or EOF removes the peer from the active set.
pub async fn handle_connection(node: Arc<Node>, mut reader: OwnedReadHalf, peer: String) {
    loop {
        let message = match Message::receive_async(&mut reader).await {
            Ok(message) => message,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("bad message from {peer}: {e}");
                continue;
            }
            Err(e) => {
                debug!("link to {peer} closed: {e}");
                node.drop_peer(&peer);
                return;
            }
        };
        dispatch(&node, &peer, message).await;
    }
}

async fn dispatch(node: &Arc<Node>, peer: &str, message: Message) {
    match message {
        Message::LatestBlock { block } => {
            // try to extend our chain with the peer's tip; any disagreement
            // earns the peer our full chain so it can resolve the fork
            let verdict = {
                let mut state = node.state.write().await;
                match state.chain.add_block(block.clone()) {
                    Ok(()) => {
                        state.pool.remove_block_txs(&block);
                        Ok(state.chain.tip().clone())
                    }
                    Err(e) => Err(e),
                }
            };
            match verdict {
                Ok(tip) => {
                    info!("accepted block {} from {peer}", tip.hash);
                    // relay the tip we adopted, not the payload we received
                    node.broadcast(&Message::LatestBlock { block: tip }, Some(peer))
                        .await;
                }
                Err(e) => {
                    warn!("block from {peer} rejected: {e}");
                    let chain = node.state.read().await.chain.blocks().to_vec();
                    node.send_to(peer, &Message::Blockchain { chain }).await;
                }
            }
        }
        Message::Blockchain { chain } => {
            let (adopted_tip, respond_with_ours) = {
                let mut state = node.state.write().await;
                match state.chain.try_swap(chain) {
                    Ok(Ordering::Greater) => {
                        state.pool.clear();
                        info!("adopted a heavier chain from {peer}");
                        (Some(state.chain.tip().clone()), false)
                    }
                    Ok(Ordering::Equal) => {
                        debug!("chain from {peer} carries equal work, ignoring");
                        (None, false)
                    }
                    Ok(Ordering::Less) => {
                        debug!("chain from {peer} is lighter than ours");
                        (None, true)
                    }
                    Err(e) => {
                        warn!("chain from {peer} rejected: {e}");
                        (None, true)
                    }
                }
            };
            if let Some(block) = adopted_tip {
                node.broadcast(&Message::LatestBlock { block }, Some(peer))
                    .await;
            } else if respond_with_ours {
                let chain = node.state.read().await.chain.blocks().to_vec();
                node.send_to(peer, &Message::Blockchain { chain }).await;
            }
        }
        Message::Transaction { tx } => {
            let accepted = {
                let mut state = node.state.write().await;
                let state = &mut *state;
                state.pool.add_tx(tx.clone(), state.chain.utxos())
            };
            match accepted {
                Ok(true) => {
                    debug!("transaction {} accepted from {peer}", tx.hash);
                    node.broadcast(&Message::Transaction { tx }, Some(peer))
                        .await;
                }
                Ok(false) => {
                    debug!("transaction from {peer} claims an outpoint already in the pool")
                }
                Err(e) => warn!("transaction from {peer} rejected: {e}"),
            }
        }
    }
}
