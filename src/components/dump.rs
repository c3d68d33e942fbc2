use log::info;
use std::path::PathBuf;
use thiserror::Error;

use super::{
    listings::{ListingsClient, ListingsError},
    token_list::{write_token_list, TokenListError},
    tokens::select_tokens,
};
use crate::config::settings::Settings;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("fetch listings: {0}")]
    Listings(#[from] ListingsError),
    #[error("write token list: {0}")]
    TokenList(#[from] TokenListError),
}

#[derive(Debug)]
pub struct DumpSummary {
    pub fetched: usize,
    pub kept: usize,
    pub rejected: usize,
    pub pages: u32,
    pub output: PathBuf,
}

/// Fetches every listing, keeps the tokens of the configured platform and
/// writes them to the output file.
pub async fn dump_tokens(settings: &Settings) -> Result<DumpSummary, DumpError> {
    let client = ListingsClient::new(settings)?;

    info!(
        "dump: fetching {} (limit {}, convert {})",
        settings.url, settings.limit, settings.convert
    );

    let snapshot = client
        .fetch_all(
            settings.cursor(),
            &settings.retry_policy(),
            settings.page_delay(),
        )
        .await?;

    info!("dump: status {:?}", snapshot.status);
    info!(
        "dump: fetched {} listings in {} pages ({} undecodable)",
        snapshot.records.len(),
        snapshot.pages,
        snapshot.skipped
    );

    let selection = select_tokens(&snapshot.records, &settings.platform, &settings.convert);

    info!(
        "dump: found {} valid {} tokens over {}",
        selection.tokens.len(),
        settings.platform,
        snapshot.records.len()
    );

    write_token_list(&settings.output, &selection.tokens)?;

    info!(
        "dump: wrote {} tokens to {:?}",
        selection.tokens.len(),
        settings.output
    );

    Ok(DumpSummary {
        fetched: snapshot.records.len(),
        kept: selection.tokens.len(),
        rejected: selection.rejected.len(),
        pages: snapshot.pages,
        output: settings.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mockito::Matcher;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    const PATH: &str = "/v1/cryptocurrency/listings/latest";

    fn settings_for(server: &mockito::ServerGuard, output: &std::path::Path) -> Settings {
        let url = format!("{}{}", server.url(), PATH);
        let output = output.to_str().unwrap().to_string();

        Settings::try_parse_from([
            "token-dump",
            "--api-key",
            "test-key",
            "--url",
            url.as_str(),
            "--output",
            output.as_str(),
            "--page-delay-secs",
            "0",
            "--retry-base-delay-ms",
            "0",
            "--max-attempts",
            "2",
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_single_page_dump() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", PATH)
            .match_query(Matcher::UrlEncoded("start".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": { "error_code": 0, "total_count": 1 },
                    "data": [{
                        "name": "Foo",
                        "symbol": "FOO",
                        "platform": { "name": "Ethereum", "token_address": "0xabc" },
                        "quote": { "USD": { "market_cap": 100 } }
                    }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", PATH)
            .match_query(Matcher::UrlEncoded("start".into(), "5001".into()))
            .with_status(200)
            .with_body(json!({ "status": { "total_count": 1 }, "data": [] }).to_string())
            .expect(0)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let path = dir.path().join("TokenList.json");
        let settings = settings_for(&server, &path);

        let summary = dump_tokens(&settings).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.pages, 1);

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            parsed,
            json!([{ "address": "0xabc", "name": "Foo", "symbol": "FOO", "market_cap": 100 }])
        );
        assert!(content.contains("\"market_cap\": 100\n"));
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body(
                json!({
                    "status": { "total_count": 4 },
                    "data": [
                        { "name": "Bitcoin", "symbol": "BTC", "platform": null, "quote": { "USD": { "market_cap": 1.2e12 } } },
                        { "name": "Dai", "symbol": "DAI", "platform": { "name": "Ethereum", "token_address": "0x6b175474e89094c44da98b954eedeac495271d0f" }, "quote": { "USD": { "market_cap": 5300000000.25 } } },
                        { "name": "Broken", "symbol": "BRK", "platform": { "name": "Ethereum", "token_address": "0x 12" }, "quote": { "USD": { "market_cap": 3 } } },
                        { "name": "Quick", "symbol": "QUICK", "platform": { "name": "Polygon", "token_address": "0x831753dd7087cac61ab5644b308642cc1c33dc13" }, "quote": { "USD": { "market_cap": 4 } } }
                    ]
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let path = dir.path().join("TokenList.json");
        let settings = settings_for(&server, &path);

        let summary = dump_tokens(&settings).await.unwrap();
        let first = fs::read(&path).unwrap();
        dump_tokens(&settings).await.unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(summary.fetched, 4);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.rejected, 1);
    }

    #[tokio::test]
    async fn test_null_address_only_drops_that_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body(
                json!({
                    "status": { "total_count": 2 },
                    "data": [
                        { "name": "Foo", "symbol": "FOO", "platform": { "name": "Ethereum", "token_address": "0xabc" }, "quote": { "USD": { "market_cap": 100 } } },
                        { "name": "Bar", "symbol": "BAR", "platform": { "name": "Ethereum", "token_address": null }, "quote": { "USD": { "market_cap": 5 } } }
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let path = dir.path().join("TokenList.json");
        let settings = settings_for(&server, &path);

        let summary = dump_tokens(&settings).await.unwrap();

        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.rejected, 1);
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            parsed,
            json!([{ "address": "0xabc", "name": "Foo", "symbol": "FOO", "market_cap": 100 }])
        );
    }

    #[tokio::test]
    async fn test_short_listing_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", PATH)
            .match_query(Matcher::UrlEncoded("start".into(), "1".into()))
            .with_status(200)
            .with_body(
                json!({
                    "status": { "total_count": 5 },
                    "data": [{ "name": "Foo", "symbol": "FOO", "platform": { "name": "Ethereum", "token_address": "0xabc" }, "quote": { "USD": { "market_cap": 100 } } }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _empty = server
            .mock("GET", PATH)
            .match_query(Matcher::UrlEncoded("start".into(), "2".into()))
            .with_status(200)
            .with_body(json!({ "status": { "total_count": 5 }, "data": [] }).to_string())
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let path = dir.path().join("TokenList.json");
        let mut settings = settings_for(&server, &path);
        settings.limit = 1;

        let err = dump_tokens(&settings).await.unwrap_err();

        assert!(matches!(
            err,
            DumpError::Listings(ListingsError::Incomplete { received: 1, total: 5 })
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_output_untouched() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .with_status(403)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let path = dir.path().join("TokenList.json");
        fs::write(&path, "[]").unwrap();
        let settings = settings_for(&server, &path);

        let err = dump_tokens(&settings).await.unwrap_err();

        assert!(matches!(
            err,
            DumpError::Listings(ListingsError::HttpStatus { status: 403, .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_write_failure_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body(json!({ "status": { "total_count": 0 }, "data": [] }).to_string())
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("TokenList.json");
        let settings = settings_for(&server, &path);

        let err = dump_tokens(&settings).await.unwrap_err();

        assert!(matches!(err, DumpError::TokenList(TokenListError::Io { .. })));
    }
}
