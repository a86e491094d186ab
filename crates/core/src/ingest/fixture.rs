use crate::domain::stock::StockRecord;
use crate::domain::user::normalize_symbol;
use crate::ingest::provider::StockRecordSource;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// In-memory source keyed by upper-cased symbol. Backs offline development
/// (`STOCK_DATA_FIXTURES`) and tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureStockSource {
    records: HashMap<String, StockRecord>,
}

impl FixtureStockSource {
    pub fn new(records: impl IntoIterator<Item = StockRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (normalize_symbol(&r.symbol), r))
                .collect(),
        }
    }

    /// Reads a JSON array of records.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read stock fixtures at {}", path.display()))?;
        let records: Vec<StockRecord> = serde_json::from_str(&text)
            .with_context(|| format!("invalid stock fixtures JSON at {}", path.display()))?;
        tracing::info!(path = %path.display(), count = records.len(), "loaded stock fixtures");
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl StockRecordSource for FixtureStockSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch(&self, symbol: &str) -> Result<StockRecord> {
        self.records
            .get(&normalize_symbol(symbol))
            .cloned()
            .with_context(|| format!("no fixture for symbol {symbol}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::provider::fetch_many;

    #[tokio::test]
    async fn looks_up_case_insensitively() {
        let source = FixtureStockSource::new([
            StockRecord::new("JNJ", "Johnson & Johnson", "Healthcare", 155.5),
            StockRecord::new("brk-b", "Berkshire", "Financial Services", 410.0),
        ]);
        assert_eq!(source.fetch("jnj").await.unwrap().symbol, "JNJ");
        assert_eq!(source.fetch("BRK-B").await.unwrap().name, "Berkshire");
        assert!(source.fetch("MSFT").await.is_err());

        let symbols = vec!["BRK-B".to_string(), "MSFT".to_string(), "JNJ".to_string()];
        let records = fetch_many(&source, &symbols).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].symbol, "JNJ");
    }

    #[test]
    fn loads_from_json_file() {
        let path = std::env::temp_dir().join(format!("stratos-fixtures-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"symbol":"KO","name":"Coca-Cola","sector":"Consumer Defensive","price":62.8,"dividend_yield":2.9}]"#,
        )
        .unwrap();
        let source = FixtureStockSource::from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(source.len(), 1);
    }

    #[tokio::test]
    async fn bundled_fixtures_screen_with_defaults() {
        use crate::domain::stock::ScreeningCriteria;
        use crate::ingest::universe::conservative_universe;
        use crate::screening::screen;

        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/stocks.json");
        let source = FixtureStockSource::from_path(path).unwrap();
        assert_eq!(source.len(), 12);

        let records = fetch_many(&source, &conservative_universe()).await;
        assert_eq!(records.len(), 12);

        let matched = screen(&records, &ScreeningCriteria::default().with_defaults());
        let symbols: Vec<&str> = matched.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["JNJ", "DUK", "XOM"]);
    }
}
