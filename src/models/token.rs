use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One entry of the written token list. Field order is the key order on disk.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub market_cap: Number,
}
