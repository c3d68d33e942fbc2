pub const LISTINGS_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

// The listings endpoint rejects pages larger than this.
pub const MAX_PAGE_LIMIT: u32 = 5000;
pub const DEFAULT_SORT: &str = "market_cap";
pub const DEFAULT_SORT_DIR: &str = "desc";
pub const MIN_VOLUME_USD: f64 = 1000.0;
pub const DEFAULT_CONVERT: &str = "USD";

pub const TARGET_PLATFORM: &str = "Ethereum";
pub const TOKEN_LIST_PATH: &str = "TokenList.json";

pub const PAGE_DELAY_SECS: u64 = 5;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_ATTEMPTS: u32 = 5;
pub const RETRY_BASE_DELAY_MS: u64 = 1000;
pub const RETRY_MAX_DELAY_SECS: u64 = 60;
