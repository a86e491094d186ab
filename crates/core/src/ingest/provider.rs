use crate::config::{env_or, env_parse, Settings};
use crate::domain::stock::StockRecord;
use crate::ingest::fixture::FixtureStockSource;
use crate::ingest::types::QuoteInfo;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PATH: &str = "/v1/fundamentals";
const DEFAULT_CONCURRENCY: usize = 8;

/// Point-in-time fundamentals for one ticker. An `Err` means the symbol is unavailable; callers
/// normally go through [`fetch_record`] / [`fetch_many`], which absorb that.
#[async_trait::async_trait]
pub trait StockRecordSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn concurrency(&self) -> usize {
        DEFAULT_CONCURRENCY
    }

    async fn fetch(&self, symbol: &str) -> Result<StockRecord>;
}

/// Single attempt; failures are logged and reported as `None`.
pub async fn fetch_record(source: &dyn StockRecordSource, symbol: &str) -> Option<StockRecord> {
    match source.fetch(symbol).await {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(
                %symbol,
                source = source.name(),
                error = %format!("{err:#}"),
                "stock record unavailable"
            );
            None
        }
    }
}

/// Fetches concurrently and pairs each resolved record with the symbol it was requested under,
/// in the caller's order. Providers may echo a different spelling (`BRK-B` for `BRK.B`), so
/// lookups should go through the requested symbol, not `record.symbol`.
pub async fn fetch_keyed(
    source: &dyn StockRecordSource,
    symbols: &[String],
) -> Vec<(String, StockRecord)> {
    let limit = source.concurrency().max(1);
    let results: Vec<(String, Option<StockRecord>)> = stream::iter(symbols.iter().cloned())
        .map(move |symbol: String| async move {
            let record = fetch_record(source, &symbol).await;
            (symbol, record)
        })
        .buffered(limit)
        .collect()
        .await;

    let resolved: Vec<(String, StockRecord)> = results
        .into_iter()
        .filter_map(|(symbol, record)| record.map(|r| (symbol, r)))
        .collect();
    tracing::debug!(
        requested = symbols.len(),
        resolved = resolved.len(),
        source = source.name(),
        "fetched stock records"
    );
    resolved
}

/// Fetches concurrently, returns records in the caller's symbol order and skips unavailable ones.
pub async fn fetch_many(source: &dyn StockRecordSource, symbols: &[String]) -> Vec<StockRecord> {
    fetch_keyed(source, symbols)
        .await
        .into_iter()
        .map(|(_, record)| record)
        .collect()
}

/// Generic HTTP JSON fundamentals provider: `GET {base}{path}?symbol=SYM`.
#[derive(Debug, Clone)]
pub struct HttpJsonStockSource {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    concurrency: usize,
}

impl HttpJsonStockSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_stock_data_base_url()?;
        let timeout = Duration::from_secs(env_parse("STOCK_DATA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("build stock data http client failed")?,
            endpoint: join_endpoint(base_url, &env_or("STOCK_DATA_PATH", DEFAULT_PATH)),
            api_key: settings.stock_data_api_key.clone(),
            concurrency: env_parse("STOCK_DATA_CONCURRENCY", DEFAULT_CONCURRENCY),
        })
    }
}

fn join_endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait::async_trait]
impl StockRecordSource for HttpJsonStockSource {
    fn name(&self) -> &'static str {
        "external_http_json"
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    async fn fetch(&self, symbol: &str) -> Result<StockRecord> {
        let mut req = self.http.get(&self.endpoint).query(&[("symbol", symbol)]);
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }
        let res = req
            .send()
            .await
            .with_context(|| format!("stock data request failed for {symbol}"))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            anyhow::bail!("no data found for symbol {symbol}");
        }
        let text = res.text().await.context("read stock data response failed")?;
        if !status.is_success() {
            anyhow::bail!("stock data HTTP {status} for {symbol}: {text}");
        }

        parse_quote(&text, symbol)
    }
}

fn parse_quote(text: &str, symbol: &str) -> Result<StockRecord> {
    let info = serde_json::from_str::<QuoteInfo>(text)
        .with_context(|| format!("stock data response is not a quote payload: {text}"))?;
    anyhow::ensure!(!info.is_empty(), "no data found for symbol {symbol}");
    Ok(info.into_record(symbol))
}

/// HTTP provider when a base URL is configured, otherwise a fixture file. One of the two is
/// required.
pub fn source_from_settings(settings: &Settings) -> Result<Arc<dyn StockRecordSource>> {
    if settings.stock_data_base_url.is_some() {
        return Ok(Arc::new(HttpJsonStockSource::from_settings(settings)?));
    }
    if let Some(path) = settings.stock_data_fixtures.as_deref() {
        return Ok(Arc::new(FixtureStockSource::from_path(path)?));
    }
    anyhow::bail!("either STOCK_DATA_BASE_URL or STOCK_DATA_FIXTURES is required")
}
