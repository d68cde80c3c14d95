//! Proof-of-work accounting: what a block actually achieved, what the next
//! block must achieve, and how much work a whole chain represents.

use crate::types::Block;
use crate::{FAST_INTERVAL_SECS, MAX_DIFFICULTY, SLOW_INTERVAL_SECS, U512};

/// Actual difficulty of a mined block: leading zero bits of its hash.
pub fn block_difficulty(block: &Block) -> u32 {
    block.hash.leading_zero_bits()
}

/// Required difficulty for the block that would extend `blocks`.
///
/// Walks every interval between consecutive blocks: an interval under
/// [`FAST_INTERVAL_SECS`] adds a bit, one over [`SLOW_INTERVAL_SECS`]
/// removes a bit, anything in between leaves the accumulator alone. Clamped
/// to [0, [`MAX_DIFFICULTY`]] after every step, steering the network toward
/// a roughly ten-second block cadence.
pub fn next_difficulty(blocks: &[Block]) -> u32 {
    let mut difficulty: u32 = 0;
    for pair in blocks.windows(2) {
        let interval = pair[1].time.saturating_sub(pair[0].time);
        if interval < FAST_INTERVAL_SECS {
            difficulty = (difficulty + 1).min(MAX_DIFFICULTY);
        } else if interval > SLOW_INTERVAL_SECS {
            difficulty = difficulty.saturating_sub(1);
        }
    }
    difficulty
}

/// Cumulative work: the sum of 2^difficulty over all blocks. Wide integer
/// arithmetic keeps fork comparison exact at any reachable difficulty.
pub fn chain_work(blocks: &[Block]) -> U512 {
    blocks.iter().fold(U512::zero(), |acc, block| {
        acc + (U512::one() << block_difficulty(block))
    })
}
