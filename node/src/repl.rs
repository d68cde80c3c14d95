use crate::node::Node;
use std::sync::Arc;
use tinylib::config::NodeConfig;
use tinylib::crypto::PublicKey;
use tinylib::network::Message;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Dot-command control surface on stdin. Every failure prints a diagnostic
/// and returns to the prompt; nothing here can wedge the node.
pub async fn run(node: Arc<Node>) -> anyhow::Result<()> {
    println!("commands: .mine .stop .add <ip[:port]> .peers .chain .utxos .intervals");
    println!("          .balance .key .send <amount> <publicKey> .pool .clear .exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        match command {
            ".mine" => {
                if node.clone().start_mining().await {
                    println!("mining started");
                } else {
                    println!("already mining");
                }
            }
            ".stop" => {
                if node.stop_mining().await {
                    println!("mining stopped");
                } else {
                    println!("not mining");
                }
            }
            ".add" => match parts.next() {
                Some(target) => {
                    let addr = if target.contains(':') {
                        target.to_string()
                    } else {
                        format!("{target}:{}", NodeConfig::global().port)
                    };
                    match node.clone().connect(addr.clone()).await {
                        Ok(()) => println!("added {addr}"),
                        Err(e) => println!("could not connect to {addr}: {e}"),
                    }
                }
                None => println!("usage: .add <ip[:port]>"),
            },
            ".peers" => {
                for peer in node.peer_names() {
                    println!("{peer}");
                }
                println!("{} peer(s)", node.peer_count());
            }
            ".chain" => {
                let state = node.state.read().await;
                match serde_json::to_string_pretty(state.chain.blocks()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("could not render chain: {e}"),
                }
            }
            ".utxos" => {
                let state = node.state.read().await;
                for (outpoint, output) in state.chain.utxos().iter() {
                    println!(
                        "{}:{} {:>6} {}",
                        outpoint.hash, outpoint.index, output.amount, output.public_key
                    );
                }
            }
            ".intervals" => {
                let state = node.state.read().await;
                println!("{:?}", state.chain.intervals());
            }
            ".balance" => {
                let state = node.state.read().await;
                println!("{}", node.wallet.balance(state.chain.utxos()));
            }
            ".key" => println!("{}", node.wallet.public_key()),
            ".send" => {
                let (Some(amount), Some(key)) = (parts.next(), parts.next()) else {
                    println!("usage: .send <amount> <publicKey>");
                    continue;
                };
                let Ok(amount) = amount.parse::<u64>() else {
                    println!("amount must be a positive integer");
                    continue;
                };
                let recipient: PublicKey = match key.parse() {
                    Ok(recipient) => recipient,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let outcome = {
                    let mut state = node.state.write().await;
                    let state = &mut *state;
                    node.wallet
                        .make_tx(amount, &recipient, state.chain.utxos())
                        .and_then(|tx| {
                            state
                                .pool
                                .add_tx(tx.clone(), state.chain.utxos())
                                .map(|accepted| (tx, accepted))
                        })
                };
                match outcome {
                    Ok((tx, true)) => {
                        println!("sent {}", tx.hash);
                        node.broadcast(&Message::Transaction { tx }, None).await;
                    }
                    Ok((_, false)) => {
                        println!("rejected: an input is already claimed by the pool")
                    }
                    Err(e) => println!("{e}"),
                }
            }
            ".pool" => {
                let state = node.state.read().await;
                for tx in state.pool.txs() {
                    println!(
                        "{} ({} in, {} out)",
                        tx.hash,
                        tx.inputs.len(),
                        tx.outputs.len()
                    );
                }
                println!("{} pending", state.pool.len());
            }
            ".clear" => {
                node.state.write().await.pool.clear();
                println!("pool cleared");
            }
            ".exit" => break,
            _ => println!("unknown command: {command}"),
        }
    }
    Ok(())
}
