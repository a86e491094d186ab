use crate::domain::stock::StockRecord;
use crate::screening::UNKNOWN_SECTOR;
use serde::{Deserialize, Serialize};

/// Quote-info payload as served by the fundamentals provider. Ratios arrive as fractions and
/// market cap in raw currency units; [`QuoteInfo::into_record`] normalises them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInfo {
    pub symbol: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
    pub dividend_yield: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub profit_margins: Option<f64>,
}

impl QuoteInfo {
    pub fn into_record(self, requested_symbol: &str) -> StockRecord {
        let symbol = self
            .symbol
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| requested_symbol.to_string());
        let name = self
            .short_name
            .or(self.long_name)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| symbol.clone());

        StockRecord {
            name,
            sector: self
                .sector
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SECTOR.to_string()),
            price: self
                .current_price
                .or(self.regular_market_price)
                .unwrap_or(0.0),
            dividend_yield: self.dividend_yield.map(|v| v * 100.0),
            pe_ratio: self.trailing_pe,
            market_cap: self.market_cap.map(|v| v / 1e9),
            beta: self.beta,
            debt_to_equity: self.debt_to_equity,
            fifty_two_week_high: self.fifty_two_week_high,
            fifty_two_week_low: self.fifty_two_week_low,
            forward_pe: self.forward_pe,
            payout_ratio: self.payout_ratio.map(|v| v * 100.0),
            revenue_growth: self.revenue_growth,
            profit_margin: self.profit_margins,
            symbol,
        }
    }

    /// A payload with neither a symbol nor a price is the provider's way of saying "no data".
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none() && self.current_price.is_none() && self.regular_market_price.is_none()
    }
}
