use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_PREFERENCES_NAME: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPreferences {
    pub id: Uuid,
    pub name: String,
    pub min_dividend_yield: Option<f64>,
    pub max_pe_ratio: Option<f64>,
    pub min_market_cap: Option<f64>,
    pub max_beta: Option<f64>,
    pub max_debt_to_equity: Option<f64>,
    pub preferred_sectors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreferencesInput {
    #[serde(default = "default_preferences_name")]
    pub name: String,
    #[serde(default)]
    pub min_dividend_yield: Option<f64>,
    #[serde(default)]
    pub max_pe_ratio: Option<f64>,
    #[serde(default)]
    pub min_market_cap: Option<f64>,
    #[serde(default)]
    pub max_beta: Option<f64>,
    #[serde(default)]
    pub max_debt_to_equity: Option<f64>,
    #[serde(default)]
    pub preferred_sectors: Vec<String>,
}

impl PreferencesInput {
    /// Record created on first read of an unknown name.
    pub fn defaults_for(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min_dividend_yield: Some(2.0),
            max_pe_ratio: Some(25.0),
            min_market_cap: Some(10.0),
            max_beta: Some(1.0),
            max_debt_to_equity: None,
            preferred_sectors: Vec::new(),
        }
    }

    /// Keeps first occurrence order, drops blanks and case-insensitive duplicates.
    pub fn normalized_sectors(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.preferred_sectors.len());
        for sector in &self.preferred_sectors {
            let sector = sector.trim();
            if sector.is_empty() || out.iter().any(|s| s.eq_ignore_ascii_case(sector)) {
                continue;
            }
            out.push(sector.to_string());
        }
        out
    }
}

fn default_preferences_name() -> String {
    DEFAULT_PREFERENCES_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistItem {
    pub id: Uuid,
    pub symbol: String,
    pub added_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub target_price: Option<f64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistInput {
    pub symbol: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub target_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PriceAbove,
    PriceBelow,
    PercentChange,
}

impl AlertKind {
    pub const ALL: [AlertKind; 3] = [
        AlertKind::PriceAbove,
        AlertKind::PriceBelow,
        AlertKind::PercentChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::PriceAbove => "price_above",
            AlertKind::PriceBelow => "price_below",
            AlertKind::PercentChange => "percent_change",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                anyhow::anyhow!("invalid alert_type {s:?}; must be one of {valid:?}")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub symbol: String,
    pub alert_type: AlertKind,
    pub target_value: f64,
    pub is_active: bool,
    pub is_triggered: bool,
    pub triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// `alert_type` stays a string here so an unknown kind is rejected with a 400 instead of a
/// deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertInput {
    pub symbol: String,
    pub alert_type: String,
    pub target_value: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCheck {
    pub alert: Alert,
    pub current_price: Option<f64>,
    pub should_trigger: bool,
    pub message: String,
}

/// Upper-cased, trimmed ticker used for every persisted symbol.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_alert_kinds_only() {
        assert_eq!("price_above".parse::<AlertKind>().unwrap(), AlertKind::PriceAbove);
        assert_eq!(
            "percent_change".parse::<AlertKind>().unwrap(),
            AlertKind::PercentChange
        );
        let err = "price_sideways".parse::<AlertKind>().unwrap_err();
        assert!(err.to_string().contains("price_below"));
    }

    #[test]
    fn default_preferences_use_fixed_thresholds() {
        let p = PreferencesInput::defaults_for("default");
        assert_eq!(p.min_dividend_yield, Some(2.0));
        assert_eq!(p.max_pe_ratio, Some(25.0));
        assert_eq!(p.min_market_cap, Some(10.0));
        assert_eq!(p.max_beta, Some(1.0));
        assert_eq!(p.max_debt_to_equity, None);
        assert!(p.preferred_sectors.is_empty());
    }

    #[test]
    fn normalized_sectors_keep_order_and_drop_duplicates() {
        let mut p = PreferencesInput::defaults_for("x");
        p.preferred_sectors = vec![
            "Utilities".into(),
            " healthcare ".into(),
            "utilities".into(),
            "".into(),
        ];
        assert_eq!(p.normalized_sectors(), vec!["Utilities", "healthcare"]);
    }

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize_symbol(" brk-b "), "BRK-B");
    }
}
