use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::{
    config::listings::{
        DEFAULT_CONVERT, DEFAULT_SORT, DEFAULT_SORT_DIR, LISTINGS_URL, MAX_ATTEMPTS,
        MAX_PAGE_LIMIT, MIN_VOLUME_USD, PAGE_DELAY_SECS, REQUEST_TIMEOUT_SECS,
        RETRY_BASE_DELAY_MS, RETRY_MAX_DELAY_SECS, TARGET_PLATFORM, TOKEN_LIST_PATH,
    },
    models::cursor::PageCursor,
    utils::backoff::RetryPolicy,
};

/// Dump every token listed on one platform into a JSON file.
#[derive(Debug, Clone, Parser)]
#[command(name = "token-dump", version)]
pub struct Settings {
    /// CoinMarketCap API key
    #[arg(long, env = "COINMARKETCAP_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Listings endpoint
    #[arg(long, env = "LISTINGS_URL", default_value = LISTINGS_URL)]
    pub url: Url,

    /// Number of listings requested per page
    #[arg(
        long,
        env = "LISTINGS_LIMIT",
        default_value_t = MAX_PAGE_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..=(MAX_PAGE_LIMIT as i64))
    )]
    pub limit: u32,

    #[arg(long, env = "LISTINGS_SORT", default_value = DEFAULT_SORT)]
    pub sort: String,

    #[arg(
        long,
        env = "LISTINGS_SORT_DIR",
        default_value = DEFAULT_SORT_DIR,
        value_parser = ["asc", "desc"]
    )]
    pub sort_dir: String,

    /// Minimum 24h volume of a listing, in the convert currency
    #[arg(long, env = "MIN_VOLUME_USD", default_value_t = MIN_VOLUME_USD)]
    pub min_volume: f64,

    /// Currency the quotes are converted to
    #[arg(long, env = "LISTINGS_CONVERT", default_value = DEFAULT_CONVERT)]
    pub convert: String,

    /// Platform (chain) the tokens must be deployed on
    #[arg(long, env = "TARGET_PLATFORM", default_value = TARGET_PLATFORM)]
    pub platform: String,

    /// Output file, overwritten on every run
    #[arg(long, env = "TOKEN_LIST_PATH", default_value = TOKEN_LIST_PATH)]
    pub output: PathBuf,

    #[arg(long, env = "PAGE_DELAY_SECS", default_value_t = PAGE_DELAY_SECS)]
    pub page_delay_secs: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Attempts per page before giving up on transient failures
    #[arg(
        long,
        env = "MAX_ATTEMPTS",
        default_value_t = MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value_t = RETRY_BASE_DELAY_MS)]
    pub retry_base_delay_ms: u64,

    #[arg(long, env = "RETRY_MAX_DELAY_SECS", default_value_t = RETRY_MAX_DELAY_SECS)]
    pub retry_max_delay_secs: u64,
}

impl Settings {
    pub fn cursor(&self) -> PageCursor {
        PageCursor::new(self.limit)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_secs(self.retry_max_delay_secs),
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
