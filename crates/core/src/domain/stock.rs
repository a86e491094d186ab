use serde::{Deserialize, Serialize};

/// Point-in-time fundamentals snapshot for one ticker.
///
/// Every fundamental is optional: providers do not guarantee a complete snapshot, and an absent
/// value must never be confused with zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    /// Percent, e.g. 3.1 for 3.1%.
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    /// Currency billions.
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    /// Percent, e.g. 45.0 for a 0.45 ratio.
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default)]
    pub forward_pe: Option<f64>,
    /// Percent.
    #[serde(default)]
    pub payout_ratio: Option<f64>,
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    #[serde(default)]
    pub profit_margin: Option<f64>,
}

impl StockRecord {
    /// A record with only the identifying fields set. Mostly useful for tests and fixtures.
    pub fn new(symbol: &str, name: &str, sector: &str, price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
            price,
            dividend_yield: None,
            pe_ratio: None,
            market_cap: None,
            beta: None,
            debt_to_equity: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            forward_pe: None,
            payout_ratio: None,
            revenue_growth: None,
            profit_margin: None,
        }
    }
}

/// AND of optional thresholds. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCriteria {
    #[serde(default)]
    pub sector: Option<String>,
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
}

impl ScreeningCriteria {
    pub fn conservative_defaults() -> Self {
        Self {
            sector: None,
            min_dividend_yield: Some(2.0),
            max_pe_ratio: Some(25.0),
            min_market_cap: Some(10.0),
            max_beta: Some(1.0),
            max_debt_to_equity: Some(100.0),
        }
    }

    /// Fills unset thresholds from [`ScreeningCriteria::conservative_defaults`]. Explicit values
    /// (including zero) are kept.
    pub fn with_defaults(self) -> Self {
        let defaults = Self::conservative_defaults();
        Self {
            sector: self.sector,
            min_dividend_yield: self.min_dividend_yield.or(defaults.min_dividend_yield),
            max_pe_ratio: self.max_pe_ratio.or(defaults.max_pe_ratio),
            min_market_cap: self.min_market_cap.or(defaults.min_market_cap),
            max_beta: self.max_beta.or(defaults.max_beta),
            max_debt_to_equity: self.max_debt_to_equity.or(defaults.max_debt_to_equity),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
