use serde::{Deserialize, Serialize};

/// Verbose block information returned by `getblock`.
///
/// Only the fields the pacing loop reads are mandatory; everything else a
/// node adds is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block hash
    pub hash: String,

    /// Proof-of-work difficulty at this block
    pub difficulty: f64,

    /// Block height
    #[serde(default)]
    pub height: Option<u64>,

    /// Confirmations; -1 for blocks off the main chain
    #[serde(default)]
    pub confirmations: Option<i64>,

    /// Block timestamp (seconds since the epoch)
    #[serde(default)]
    pub time: Option<u64>,

    /// Transaction ids included in the block
    #[serde(default)]
    pub tx: Vec<String>,
}
