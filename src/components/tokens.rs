use log::warn;
use std::fmt;

use crate::models::{listing::ListingRecord, token::OutputRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyAddress,
    ContainsWhitespace,
    NoHexPrefix,
    MissingMarketCap(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyAddress => write!(f, "Invalid token address, empty"),
            Rejection::ContainsWhitespace => write!(f, "Invalid token address, contains spaces"),
            Rejection::NoHexPrefix => write!(f, "Invalid token address, no hexString"),
            Rejection::MissingMarketCap(currency) => write!(f, "No {} market cap", currency),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub name: String,
    pub address: String,
    pub reason: Rejection,
}

#[derive(Debug, Default)]
pub struct Selection {
    pub tokens: Vec<OutputRecord>,
    pub rejected: Vec<Rejected>,
}

/// Checks run in order; the first failing one is the only reason reported.
pub fn validate_address(address: &str) -> Result<(), Rejection> {
    if address.is_empty() {
        Err(Rejection::EmptyAddress)
    } else if address.chars().any(char::is_whitespace) {
        Err(Rejection::ContainsWhitespace)
    } else if !address.starts_with("0x") {
        Err(Rejection::NoHexPrefix)
    } else {
        Ok(())
    }
}

fn reject(record: &ListingRecord, address: &str, reason: Rejection) -> Rejected {
    warn!("{}, token={}, address={}", reason, record.name, address);

    Rejected {
        name: record.name.clone(),
        address: address.to_string(),
        reason,
    }
}

/// Keeps records deployed on `platform` with a well formed token address.
/// Records without a platform, or on another one, are dropped without a diagnostic.
pub fn retain_platform_tokens<'a>(
    records: &'a [ListingRecord],
    platform: &str,
) -> (Vec<&'a ListingRecord>, Vec<Rejected>) {
    let mut kept = Vec::new();
    let mut rejected = Vec::new();

    for record in records {
        let Some(found) = record.platform.as_ref().filter(|p| p.name == platform) else {
            continue;
        };

        match validate_address(&found.token_address) {
            Ok(()) => kept.push(record),
            Err(reason) => rejected.push(reject(record, &found.token_address, reason)),
        }
    }

    (kept, rejected)
}

pub fn project_tokens(
    records: &[&ListingRecord],
    currency: &str,
) -> (Vec<OutputRecord>, Vec<Rejected>) {
    let mut tokens = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        let address = record
            .platform
            .as_ref()
            .map(|p| p.token_address.as_str())
            .unwrap_or_default();

        match record.market_cap(currency) {
            Some(market_cap) => tokens.push(OutputRecord {
                address: address.to_string(),
                name: record.name.clone(),
                symbol: record.symbol.clone(),
                market_cap: market_cap.clone(),
            }),
            None => rejected.push(reject(
                record,
                address,
                Rejection::MissingMarketCap(currency.to_string()),
            )),
        }
    }

    (tokens, rejected)
}

pub fn select_tokens(records: &[ListingRecord], platform: &str, currency: &str) -> Selection {
    let (kept, mut rejected) = retain_platform_tokens(records, platform);
    let (tokens, unpriced) = project_tokens(&kept, currency);

    rejected.extend(unpriced);

    Selection { tokens, rejected }
}
