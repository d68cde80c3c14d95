use crate::types::{Block, Transaction};
use serde::{Deserialize, Serialize};
use std::io::{Error as IoError, ErrorKind as IoErrorKind, Result as IoResult};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Frames larger than this indicate a broken or hostile peer.
const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// The three-message peer protocol. Every frame carries one UTF-8 JSON
/// object tagged by `type`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type")]
pub enum Message {
    /// The sender's tip: sent when a link opens, after a successful own
    /// mine, and when relaying a peer block we accepted.
    #[serde(rename = "LATESTBLOCK")]
    LatestBlock { block: Block },
    /// The sender's full chain, offered when tips disagree.
    #[serde(rename = "BLOCKCHAIN")]
    Blockchain { chain: Vec<Block> },
    /// A pool candidate.
    #[serde(rename = "TRANSACTION")]
    Transaction { tx: Transaction },
}

impl Message {
    /// Read one length-prefixed frame. An undecodable payload (including an
    /// unknown message type) comes back as `InvalidData`, so the caller can
    /// log it and keep the connection; transport failures use other kinds.
    pub async fn receive_async(stream: &mut (impl AsyncRead + Unpin)) -> IoResult<Self> {
        let len = stream.read_u32().await?;
        if len > MAX_FRAME_BYTES {
            // the stream is beyond recovery at this point
            warn!("refusing a {len}-byte frame");
            return Err(IoError::other("oversized frame"));
        }
        let mut payload = vec![0u8; len as usize];
        stream.read_exact(&mut payload).await?;
        serde_json::from_slice(&payload).map_err(|e| {
            debug!("undecodable frame: {e}");
            IoError::new(IoErrorKind::InvalidData, format!("undecodable message: {e}"))
        })
    }

    /// Write one length-prefixed frame.
    pub async fn send_async(&self, stream: &mut (impl AsyncWrite + Unpin)) -> IoResult<()> {
        let payload = serde_json::to_vec(self).expect("BUG: in-memory serialization cannot fail");
        stream.write_u32(payload.len() as u32).await?;
        stream.write_all(&payload).await?;
        stream.flush().await
    }
}
