// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - SETTLEMENT CORE
//
// Wager queue, two-nibble matcher, shared pot and the settlement engine.
// A wager is judged against the hash of a block mined REVEAL_DELAY blocks
// after it was placed. Resolution is pull-based: every incoming wager
// attempts to settle the single oldest unresolved one.
// All amounts are u128 base units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod funds;
pub mod matcher;
pub mod oracle;
pub mod pot;
pub mod queue;

pub use config::{ExpiredWagerPolicy, LotteryConfig};
pub use engine::{EngineState, PlaceReceipt, Settlement, SettlementEngine, SettlementOutcome};
pub use error::{LotteryError, LotteryResult};
pub use events::{EventLog, EventSink, LotteryEvent};
pub use funds::{FundsTransfer, InMemoryBank};
pub use matcher::{classify, MatchResult};
pub use oracle::{ChainOracle, SimulatedChain};
pub use pot::PotLedger;
pub use queue::WagerQueue;

/// 1 coin = 10^18 base units
pub const UNITS_PER_COIN: u128 = 1_000_000_000_000_000_000;

/// The single accepted stake: 0.005 coin (5 * 10^15 base units)
pub const DEFAULT_STAKE: u128 = 5_000_000_000_000_000;

/// Blocks between placing a wager and the block whose hash judges it
pub const REVEAL_DELAY: u64 = 3;

/// How far back the chain can still report a block hash (EVM BLOCKHASH window)
pub const HASH_LOOKBACK: u64 = 256;

/// Length of a block hash in bytes
pub const BLOCK_HASH_LEN: usize = 32;

/// Strip an optional `0x` / `0X` prefix.
fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

// ─────────────────────────────────────────────────────────────────
// CHALLENGE
// ─────────────────────────────────────────────────────────────────

/// A bettor's guess: one byte read as two hex characters (e.g. `0xab`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Challenge(pub u8);

impl Challenge {
    pub fn byte(self) -> u8 {
        self.0
    }

    /// Most significant nibble (first hex character)
    pub fn high_nibble(self) -> u8 {
        self.0 >> 4
    }

    /// Least significant nibble (second hex character)
    pub fn low_nibble(self) -> u8 {
        self.0 & 0x0f
    }
}

impl From<u8> for Challenge {
    fn from(b: u8) -> Self {
        Challenge(b)
    }
}

impl FromStr for Challenge {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        if digits.len() != 2 {
            return Err(LotteryError::InvalidChallenge(format!(
                "expected two hex characters, got {:?}",
                s
            )));
        }
        let mut out = [0u8; 1];
        hex::decode_to_slice(digits, &mut out)
            .map_err(|e| LotteryError::InvalidChallenge(format!("{:?}: {}", s, e)))?;
        Ok(Challenge(out[0]))
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────
// BLOCK HASH
// ─────────────────────────────────────────────────────────────────

/// 32-byte block hash. Serialized as 0x-prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash(pub [u8; BLOCK_HASH_LEN]);

impl BlockHash {
    pub const ZERO: BlockHash = BlockHash([0u8; BLOCK_HASH_LEN]);

    pub fn as_bytes(&self) -> &[u8; BLOCK_HASH_LEN] {
        &self.0
    }

    /// The byte the matcher compares against
    pub fn first_byte(&self) -> u8 {
        self.0[0]
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; BLOCK_HASH_LEN]> for BlockHash {
    fn from(bytes: [u8; BLOCK_HASH_LEN]) -> Self {
        BlockHash(bytes)
    }
}

impl FromStr for BlockHash {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; BLOCK_HASH_LEN];
        hex::decode_to_slice(strip_hex_prefix(s.trim()), &mut out)
            .map_err(|e| LotteryError::InvalidBlockHash(format!("{}", e)))?;
        Ok(BlockHash(out))
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for BlockHash {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────
// WAGER
// ─────────────────────────────────────────────────────────────────

/// u128 amounts on the wire. Written as a decimal string because neither
/// serde_json nor toml carries 128-bit integers; read back from a string or
/// from a plain integer (hand-written TOML often uses `stake = 1000`).
pub(crate) mod u128_str {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a base-unit amount as a decimal string or non-negative integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim().parse().map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(u128::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative amount {}", v)))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        d.deserialize_any(AmountVisitor)
    }
}

/// One bettor's stake on one challenge.
///
/// Everything except `resolved` is fixed when the wager is accepted.
/// `resolved` flips exactly once, when the engine judges the wager.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Wager {
    pub bettor: String,
    pub challenge: Challenge,
    #[serde(with = "u128_str")]
    pub amount: u128,
    /// Height of the block whose hash judges this wager
    pub answer_block: u64,
    #[serde(default)]
    pub resolved: bool,
}

impl Wager {
    pub fn new(bettor: &str, challenge: Challenge, amount: u128, placed_at: u64, reveal_delay: u64) -> Self {
        Self {
            bettor: bettor.to_string(),
            challenge,
            amount,
            answer_block: placed_at.saturating_add(reveal_delay),
            resolved: false,
        }
    }

    /// True once the answer block is strictly in the past.
    pub fn is_due(&self, current_height: u64) -> bool {
        current_height > self.answer_block
    }
}

/// Lifecycle of a single wager as observed from outside the engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WagerState {
    /// Answer block not mined yet (or not yet strictly in the past)
    Pending,
    /// Answer block is in the past and its hash is retrievable
    Judgeable,
    /// Answer block is in the past but its hash has left the oracle window
    Expired,
    /// Outcome applied
    Resolved,
}
