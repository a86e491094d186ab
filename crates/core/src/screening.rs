//! Conservative screening: a pure AND of optional thresholds over [`StockRecord`]s.
//!
//! Dividend yield, P/E and market cap reject a record when the value is absent. Beta and
//! debt-to-equity only reject when the value is present and above the limit; records without
//! volatility or leverage data are kept.

use crate::domain::stock::{ScreeningCriteria, StockRecord};
use crate::domain::user::UserPreferences;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;

pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Matching records, in input order.
pub fn screen(records: &[StockRecord], criteria: &ScreeningCriteria) -> Vec<StockRecord> {
    records
        .iter()
        .filter(|r| passes(r, criteria))
        .cloned()
        .collect()
}

/// An empty sector string constrains nothing.
fn sector_constraint(criteria: &ScreeningCriteria) -> Option<&str> {
    criteria.sector.as_deref().filter(|s| !s.is_empty())
}

pub fn passes(record: &StockRecord, criteria: &ScreeningCriteria) -> bool {
    if let Some(sector) = sector_constraint(criteria) {
        if record.sector.to_lowercase() != sector.to_lowercase() {
            return false;
        }
    }

    if let Some(min) = criteria.min_dividend_yield {
        if !record.dividend_yield.is_some_and(|v| v >= min) {
            return false;
        }
    }

    if let Some(max) = criteria.max_pe_ratio {
        if !record.pe_ratio.is_some_and(|v| v <= max) {
            return false;
        }
    }

    if let Some(min) = criteria.min_market_cap {
        if !record.market_cap.is_some_and(|v| v >= min) {
            return false;
        }
    }

    if let Some(max) = criteria.max_beta {
        if record.beta.is_some_and(|v| v > max) {
            return false;
        }
    }

    if let Some(max) = criteria.max_debt_to_equity {
        if record.debt_to_equity.is_some_and(|v| v > max) {
            return false;
        }
    }

    true
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
}

/// The constraints that were actually set, in a fixed key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedFilters {
    entries: Vec<(&'static str, FilterValue)>,
}

impl AppliedFilters {
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AppliedFilters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            match value {
                FilterValue::Text(s) => map.serialize_entry(key, s)?,
                FilterValue::Number(n) => map.serialize_entry(key, n)?,
            }
        }
        map.end()
    }
}

pub fn applied_filters(criteria: &ScreeningCriteria) -> AppliedFilters {
    let mut entries = Vec::new();
    if let Some(sector) = sector_constraint(criteria) {
        entries.push(("sector", FilterValue::Text(sector.to_string())));
    }
    let numeric = [
        ("min_dividend_yield", criteria.min_dividend_yield),
        ("max_pe_ratio", criteria.max_pe_ratio),
        ("min_market_cap", criteria.min_market_cap),
        ("max_beta", criteria.max_beta),
        ("max_debt_to_equity", criteria.max_debt_to_equity),
    ];
    for (key, value) in numeric {
        if let Some(v) = value {
            entries.push((key, FilterValue::Number(v)));
        }
    }
    AppliedFilters { entries }
}

/// Sorted distinct sectors, excluding records whose sector could not be resolved.
pub fn available_sectors(records: &[StockRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.sector != UNKNOWN_SECTOR)
        .map(|r| r.sector.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl From<&UserPreferences> for ScreeningCriteria {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            sector: None,
            min_dividend_yield: prefs.min_dividend_yield,
            max_pe_ratio: prefs.max_pe_ratio,
            min_market_cap: prefs.min_market_cap,
            max_beta: prefs.max_beta,
            max_debt_to_equity: prefs.max_debt_to_equity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stock(
        symbol: &str,
        sector: &str,
        dividend_yield: f64,
        pe_ratio: f64,
        market_cap: f64,
        beta: f64,
    ) -> StockRecord {
        let mut r = StockRecord::new(symbol, symbol, sector, 100.0);
        r.dividend_yield = Some(dividend_yield);
        r.pe_ratio = Some(pe_ratio);
        r.market_cap = Some(market_cap);
        r.beta = Some(beta);
        r
    }

    fn universe() -> Vec<StockRecord> {
        vec![
            stock("JNJ", "Healthcare", 3.0, 15.2, 375.0, 0.55),
            stock("MSFT", "Technology", 0.7, 35.2, 3100.0, 0.89),
            stock("KO", "Consumer Staples", 2.9, 24.5, 270.0, 0.58),
        ]
    }

    fn symbols(records: &[StockRecord]) -> Vec<&str> {
        records.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn empty_criteria_is_identity() {
        let all = universe();
        assert_eq!(screen(&all, &ScreeningCriteria::default()), all);
        let bare = vec![StockRecord::new("X", "X", "Unknown", 0.0)];
        assert_eq!(screen(&bare, &ScreeningCriteria::default()), bare);
    }

    #[test]
    fn sector_match_is_case_insensitive() {
        let criteria = ScreeningCriteria {
            sector: Some("healthCARE".into()),
            ..Default::default()
        };
        assert_eq!(symbols(&screen(&universe(), &criteria)), vec!["JNJ"]);
    }

    #[test]
    fn empty_sector_is_not_a_constraint() {
        let criteria = ScreeningCriteria {
            sector: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(screen(&universe(), &criteria), universe());
        assert!(applied_filters(&criteria).get("sector").is_none());
        assert!(applied_filters(&criteria).is_empty());
    }

    #[test]
    fn combined_thresholds_are_anded_and_keep_order() {
        let criteria = ScreeningCriteria {
            min_dividend_yield: Some(2.0),
            ..Default::default()
        };
        assert_eq!(symbols(&screen(&universe(), &criteria)), vec!["JNJ", "KO"]);

        let criteria = ScreeningCriteria {
            min_dividend_yield: Some(2.0),
            max_pe_ratio: Some(20.0),
            ..Default::default()
        };
        assert_eq!(symbols(&screen(&universe(), &criteria)), vec!["JNJ"]);

        let criteria = ScreeningCriteria {
            max_beta: Some(0.6),
            ..Default::default()
        };
        assert_eq!(symbols(&screen(&universe(), &criteria)), vec!["JNJ", "KO"]);
    }

    #[test]
    fn absent_yield_pe_and_cap_fail_their_constraints() {
        let bare = StockRecord::new("X", "X", "Utilities", 10.0);
        for criteria in [
            ScreeningCriteria {
                min_dividend_yield: Some(0.0),
                ..Default::default()
            },
            ScreeningCriteria {
                max_pe_ratio: Some(1_000.0),
                ..Default::default()
            },
            ScreeningCriteria {
                min_market_cap: Some(0.0),
                ..Default::default()
            },
        ] {
            assert!(!passes(&bare, &criteria), "{criteria:?}");
        }
    }

    #[test]
    fn absent_beta_and_debt_pass_any_threshold() {
        let bare = StockRecord::new("X", "X", "Utilities", 10.0);
        let criteria = ScreeningCriteria {
            max_beta: Some(0.1),
            max_debt_to_equity: Some(0.0),
            ..Default::default()
        };
        assert!(passes(&bare, &criteria));

        let mut levered = bare.clone();
        levered.debt_to_equity = Some(150.0);
        assert!(!passes(&levered, &criteria));
    }

    #[test]
    fn boundaries_are_inclusive() {
        let r = stock("JNJ", "Healthcare", 3.0, 15.0, 10.0, 1.0);
        let criteria = ScreeningCriteria {
            sector: None,
            min_dividend_yield: Some(3.0),
            max_pe_ratio: Some(15.0),
            min_market_cap: Some(10.0),
            max_beta: Some(1.0),
            max_debt_to_equity: None,
        };
        assert!(passes(&r, &criteria));
    }

    #[test]
    fn tightening_a_threshold_never_admits_a_failing_record() {
        let records = universe();
        let loose = ScreeningCriteria {
            min_dividend_yield: Some(1.0),
            max_pe_ratio: Some(30.0),
            max_beta: Some(0.9),
            ..Default::default()
        };
        let tightened = [
            ScreeningCriteria {
                min_dividend_yield: Some(2.95),
                ..loose.clone()
            },
            ScreeningCriteria {
                max_pe_ratio: Some(20.0),
                ..loose.clone()
            },
            ScreeningCriteria {
                max_beta: Some(0.56),
                ..loose.clone()
            },
            ScreeningCriteria {
                min_market_cap: Some(300.0),
                ..loose.clone()
            },
        ];
        for tight in &tightened {
            for r in &records {
                if !passes(r, &loose) {
                    assert!(!passes(r, tight), "{} admitted by {tight:?}", r.symbol);
                }
            }
        }
    }

    #[test]
    fn applied_filters_echo_only_set_fields_in_fixed_order() {
        let criteria = ScreeningCriteria {
            sector: Some("Healthcare".into()),
            min_dividend_yield: Some(2.0),
            max_pe_ratio: Some(25.0),
            min_market_cap: None,
            max_beta: None,
            max_debt_to_equity: Some(80.0),
        };
        let filters = applied_filters(&criteria);
        assert_eq!(
            filters.keys(),
            vec!["sector", "min_dividend_yield", "max_pe_ratio", "max_debt_to_equity"]
        );
        assert_eq!(
            serde_json::to_string(&filters).unwrap(),
            json!({
                "sector": "Healthcare",
                "min_dividend_yield": 2.0,
                "max_pe_ratio": 25.0,
                "max_debt_to_equity": 80.0,
            })
            .to_string()
        );

        assert!(applied_filters(&ScreeningCriteria::default()).is_empty());
    }

    #[test]
    fn applied_filters_match_set_fields_for_every_combination() {
        for mask in 0u8..64 {
            let set = |bit: u8| mask & (1 << bit) != 0;
            let criteria = ScreeningCriteria {
                sector: set(0).then(|| "Energy".to_string()),
                min_dividend_yield: set(1).then_some(1.0),
                max_pe_ratio: set(2).then_some(2.0),
                min_market_cap: set(3).then_some(3.0),
                max_beta: set(4).then_some(4.0),
                max_debt_to_equity: set(5).then_some(5.0),
            };
            let filters = applied_filters(&criteria);
            assert_eq!(filters.len(), mask.count_ones() as usize);
            assert_eq!(filters.get("max_beta").is_some(), set(4));
            assert_eq!(filters.get("sector").is_some(), set(0));
        }
    }

    #[test]
    fn with_defaults_keeps_explicit_values() {
        let criteria = ScreeningCriteria {
            min_dividend_yield: Some(0.0),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(criteria.min_dividend_yield, Some(0.0));
        assert_eq!(criteria.max_pe_ratio, Some(25.0));
        assert_eq!(criteria.max_debt_to_equity, Some(100.0));
    }

    #[test]
    fn available_sectors_are_sorted_and_skip_unknown() {
        let mut records = universe();
        records.push(StockRecord::new("ZZZ", "ZZZ", UNKNOWN_SECTOR, 1.0));
        records.push(stock("PG", "Consumer Staples", 2.4, 26.0, 380.0, 0.42));
        assert_eq!(
            available_sectors(&records),
            vec!["Consumer Staples", "Healthcare", "Technology"]
        );
    }
}
