use log::{info, warn};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT},
    Client, StatusCode,
};
use serde::{Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use url::Url;

use crate::{
    config::{listings::API_KEY_HEADER, settings::Settings},
    models::{
        cursor::PageCursor,
        listing::{ErrorEnvelope, ListingRecord, ListingsPage, ListingsStatus},
    },
    utils::backoff::RetryPolicy,
};

const BODY_PREVIEW_CHARS: usize = 256;

#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("API request error: {0}")]
    ApiRequestError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("API error {code}: {message}")]
    ApiError { code: i64, message: String },

    #[error("Response parsing error: {0}, content: {1}")]
    ParseResponseError(String, String),

    #[error("listing ended early: {received} of {total} records")]
    Incomplete { received: usize, total: usize },

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ListingsError>,
    },
}

impl ListingsError {
    /// Whether the same request may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            ListingsError::ApiRequestError(_) | ListingsError::ParseResponseError(..) => true,
            ListingsError::HttpStatus { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            ListingsError::InvalidRequest(_)
            | ListingsError::ApiError { .. }
            | ListingsError::Incomplete { .. }
            | ListingsError::RetriesExhausted { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ListingsError>;

/// Every listing fetched by one pagination run.
#[derive(Debug)]
pub struct ListingsSnapshot {
    pub records: Vec<ListingRecord>,
    /// Entries received but not decodable; `records.len() + skipped == status.total_count`.
    pub skipped: usize,
    pub status: ListingsStatus,
    pub pages: u32,
}

#[derive(Debug, Serialize)]
struct ListingsQuery<'a> {
    start: u32,
    limit: u32,
    sort: &'a str,
    sort_dir: &'a str,
    #[serde(serialize_with = "whole_or_fraction")]
    volume_24h_min: f64,
    convert: &'a str,
}

pub struct ListingsClient {
    http: Client,
    url: Url,
    sort: String,
    sort_dir: String,
    min_volume: f64,
    convert: String,
}

impl ListingsClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(&settings.api_key).map_err(|_| {
            ListingsError::InvalidRequest("API key is not a valid header value".to_string())
        })?;
        api_key.set_sensitive(true);

        let key_header = HeaderName::from_bytes(API_KEY_HEADER.as_bytes())
            .map_err(|e| ListingsError::InvalidRequest(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(key_header, api_key);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ListingsError::InvalidRequest(e.to_string()))?;

        Ok(ListingsClient {
            http,
            url: settings.url.clone(),
            sort: settings.sort.clone(),
            sort_dir: settings.sort_dir.clone(),
            min_volume: settings.min_volume,
            convert: settings.convert.clone(),
        })
    }

    fn query(&self, cursor: &PageCursor) -> ListingsQuery<'_> {
        ListingsQuery {
            start: cursor.start,
            limit: cursor.limit,
            sort: &self.sort,
            sort_dir: &self.sort_dir,
            volume_24h_min: self.min_volume,
            convert: &self.convert,
        }
    }

    pub async fn fetch_page(&self, cursor: &PageCursor) -> Result<ListingsPage> {
        let res = self
            .http
            .get(self.url.clone())
            .query(&self.query(cursor))
            .send()
            .await
            .map_err(request_error)?;
        let status = res.status();
        let body = res.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        parse_listings_page(&body)
    }

    /// Retries transient failures at the same cursor; anything else is returned as is.
    pub async fn fetch_page_with_retry(
        &self,
        cursor: &PageCursor,
        policy: &RetryPolicy,
    ) -> Result<ListingsPage> {
        let mut attempt = 1;

        loop {
            match self.fetch_page(cursor).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && policy.allows_retry_after(attempt) => {
                    let wait = policy.delay_for(attempt);

                    warn!(
                        "listings: start={} failed (attempt {}/{}): {}, retrying in {:?}",
                        cursor.start, attempt, policy.max_attempts, e, wait
                    );

                    sleep(wait).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    return Err(ListingsError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Requests pages until the accumulated records reach the reported `total_count`.
    pub async fn fetch_all(
        &self,
        mut cursor: PageCursor,
        policy: &RetryPolicy,
        page_delay: Duration,
    ) -> Result<ListingsSnapshot> {
        let mut records: Vec<ListingRecord> = Vec::new();
        let mut skipped = 0;
        let mut pages = 0;

        loop {
            let page = self.fetch_page_with_retry(&cursor, policy).await?;
            let received = page.received();
            let total = page.status.total_count;

            pages += 1;
            skipped += page.skipped;
            records.extend(page.data);

            let accumulated = records.len() + skipped;

            info!(
                "listings: received {} at start={} ({}/{})",
                received, cursor.start, accumulated, total
            );

            if accumulated >= total {
                if accumulated > total {
                    warn!(
                        "listings: got {} records for total_count {}, dropping the surplus",
                        accumulated, total
                    );
                    records.truncate(total.saturating_sub(skipped));
                }

                return Ok(ListingsSnapshot {
                    records,
                    skipped,
                    status: page.status,
                    pages,
                });
            }

            if received == 0 {
                return Err(ListingsError::Incomplete {
                    received: accumulated,
                    total,
                });
            }

            cursor.advance();
            sleep(page_delay).await;
        }
    }
}

// `1000.0` goes out as `volume_24h_min=1000`.
fn whole_or_fraction<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn request_error(e: reqwest::Error) -> ListingsError {
    if e.is_builder() {
        ListingsError::InvalidRequest(e.to_string())
    } else {
        ListingsError::ApiRequestError(e.to_string())
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

fn status_error(status: StatusCode, body: &str) -> ListingsError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.status.error_message)
        .or_else(|| status.canonical_reason().map(String::from))
        .unwrap_or_else(|| preview(body));

    ListingsError::HttpStatus {
        status: status.as_u16(),
        message,
    }
}

pub fn parse_listings_page(body: &str) -> Result<ListingsPage> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(code) = envelope.status.error_code.filter(|code| *code != 0) {
            return Err(ListingsError::ApiError {
                code,
                message: envelope.status.error_message.unwrap_or_default(),
            });
        }
    }

    serde_json::from_str(body)
        .map_err(|e| ListingsError::ParseResponseError(e.to_string(), preview(body)))
}
