use crate::handler;
use dashmap::DashMap;
use std::sync::Arc;
use tinylib::network::Message;
use tinylib::types::{Blockchain, Mempool};
use tinylib::wallet::Wallet;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Chain, UTXO set and pool live under one lock: every consensus mutation
/// (block append, chain swap, pool admission and eviction) runs as a single
/// exclusive critical section, and no handler ever observes a half-applied
/// block.
pub struct State {
    pub chain: Blockchain,
    pub pool: Mempool,
}

type PeerWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Everything one running peer owns. Connection handlers, the mining task
/// and the control surface all share it through an `Arc`.
pub struct Node {
    pub state: RwLock<State>,
    peers: DashMap<String, PeerWriter>,
    pub wallet: Wallet,
    miner: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    pub fn new() -> Self {
        Node {
            state: RwLock::new(State {
                chain: Blockchain::new(),
                pool: Mempool::new(),
            }),
            peers: DashMap::new(),
            wallet: Wallet::new(),
            miner: Mutex::new(None),
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn peer_names(&self) -> Vec<String> {
        self.peers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Open an outbound link, greet the peer with our tip, and start its
    /// receive loop.
    pub async fn connect(self: Arc<Self>, addr: String) -> anyhow::Result<()> {
        let stream = TcpStream::connect(&addr).await?;
        let (read_half, write_half) = stream.into_split();
        let writer: PeerWriter = Arc::new(Mutex::new(write_half));
        self.peers.insert(addr.clone(), writer.clone());
        info!("connected to {addr}");

        let tip = self.state.read().await.chain.tip().clone();
        if let Err(e) = (Message::LatestBlock { block: tip })
            .send_async(&mut *writer.lock().await)
            .await
        {
            warn!("could not greet {addr}: {e}");
        }
        tokio::spawn(handler::handle_connection(self, read_half, addr));
        Ok(())
    }

    /// Adopt an accepted inbound socket and start its receive loop.
    pub fn adopt(self: Arc<Self>, addr: String, stream: TcpStream) {
        let (read_half, write_half) = stream.into_split();
        self.peers
            .insert(addr.clone(), Arc::new(Mutex::new(write_half)));
        info!("peer {addr} connected");
        tokio::spawn(handler::handle_connection(self, read_half, addr));
    }

    pub fn drop_peer(&self, addr: &str) {
        if self.peers.remove(addr).is_some() {
            info!("peer {addr} removed");
        }
    }

    /// Send to one peer; a failed write drops the link.
    pub async fn send_to(&self, addr: &str, message: &Message) {
        let Some(writer) = self.peers.get(addr).map(|entry| entry.value().clone()) else {
            return;
        };
        let result = message.send_async(&mut *writer.lock().await).await;
        if let Err(e) = result {
            warn!("send to {addr} failed: {e}");
            self.drop_peer(addr);
        }
    }

    /// Fan a message out to every peer, optionally skipping its origin.
    pub async fn broadcast(&self, message: &Message, except: Option<&str>) {
        let targets: Vec<(String, PeerWriter)> = self
            .peers
            .iter()
            .filter(|entry| except != Some(entry.key().as_str()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        for (addr, writer) in targets {
            if let Err(e) = message.send_async(&mut *writer.lock().await).await {
                warn!("broadcast to {addr} failed: {e}");
                self.drop_peer(&addr);
            }
        }
    }

    /// Start the mining timer unless it is already running.
    pub async fn start_mining(self: Arc<Self>) -> bool {
        let mut slot = self.miner.lock().await;
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }
        *slot = Some(tokio::spawn(crate::util::mine_loop(self.clone())));
        true
    }

    /// Cancel the pending mining timer, if any.
    pub async fn stop_mining(&self) -> bool {
        match self.miner.lock().await.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}
