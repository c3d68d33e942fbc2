use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// One page of `cryptocurrency/listings/latest`.
///
/// Entries are decoded one by one: an entry that does not fit `ListingRecord`
/// is logged and counted in `skipped` instead of failing the whole page.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawListingsPage")]
pub struct ListingsPage {
    pub status: ListingsStatus,
    pub data: Vec<ListingRecord>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct RawListingsPage {
    status: ListingsStatus,
    #[serde(default)]
    data: Vec<Value>,
}

impl From<RawListingsPage> for ListingsPage {
    fn from(raw: RawListingsPage) -> Self {
        let mut data = Vec::with_capacity(raw.data.len());
        let mut skipped = 0;

        for entry in raw.data {
            match serde_json::from_value::<ListingRecord>(entry) {
                Ok(record) => data.push(record),
                Err(e) => {
                    warn!("listings: skipping malformed record: {}", e);
                    skipped += 1;
                }
            }
        }

        ListingsPage {
            status: raw.status,
            data,
            skipped,
        }
    }
}

impl ListingsPage {
    /// Entries the server sent, decodable or not.
    pub fn received(&self) -> usize {
        self.data.len() + self.skipped
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingsStatus {
    pub total_count: usize,
    pub timestamp: Option<String>,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub elapsed: Option<u64>,
    pub credit_count: Option<u64>,
    pub notice: Option<String>,
}

/// Status block of an error response. `total_count` is absent there.
#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub status: ErrorStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: Option<u64>,
    pub name: String,
    pub symbol: String,
    pub slug: Option<String>,
    pub platform: Option<Platform>,
    #[serde(default)]
    pub quote: HashMap<String, Quote>,
}

/// Chain a token is deployed on. Native coins carry no platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: Option<u64>,
    pub name: String,
    pub symbol: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub token_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub price: Option<f64>,
    pub volume_24h: Option<f64>,
    pub market_cap: Option<Number>,
}

impl ListingRecord {
    pub fn market_cap(&self, currency: &str) -> Option<&Number> {
        self.quote.get(currency)?.market_cap.as_ref()
    }
}
