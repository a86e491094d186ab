//! Portfolio valuation and composition analytics. Pure functions over value types; prices are
//! resolved by the caller beforehand.

use crate::domain::portfolio::{
    HoldingValuation, PortfolioAnalysis, PortfolioHolding, PortfolioSummary,
};
use crate::domain::stock::StockRecord;
use std::collections::{BTreeMap, HashMap};

pub const NO_STOCKS_ASSESSMENT: &str = "No stocks in portfolio";
pub const NO_STOCKS_SUMMARY: &str = "Add stocks to your portfolio to receive analysis.";
pub const NO_STOCKS_RECOMMENDATION: &str = "Add diversified stocks to your portfolio";

pub const LOW_RISK: &str = "Low risk - Portfolio has below-market volatility";
pub const MODERATE_RISK: &str = "Moderate risk - Portfolio volatility near market average";
pub const HIGHER_RISK: &str = "Higher risk - Portfolio has above-market volatility";

pub const DIVERSIFY: &str = "Consider diversifying across more sectors";
pub const LOWER_BETA: &str = "Portfolio is more volatile than market - consider lower-beta stocks";
pub const HIGHER_YIELD: &str = "Consider adding higher dividend-yield stocks";
pub const WELL_BALANCED: &str = "Portfolio is well-balanced for conservative investing";

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Exact halves go to the even neighbour, so 6.25 scores 6.2.
fn round1(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}

/// Values one holding against an optional fresh snapshot. Without a usable price the valuation
/// fields stay `None`.
pub fn value_holding(holding: &PortfolioHolding, record: Option<&StockRecord>) -> HoldingValuation {
    let cost = holding.cost();
    let current_price = record.map(|r| r.price).filter(|p| *p > 0.0);
    let current_value = current_price.map(|p| holding.shares * p);
    let gain_loss = current_value.map(|v| v - cost);
    let gain_loss_percent = gain_loss.map(|g| percent_of(g, cost));

    HoldingValuation {
        id: holding.id,
        symbol: holding.symbol.clone(),
        name: record.map(|r| r.name.clone()),
        shares: holding.shares,
        purchase_price: holding.purchase_price,
        current_price,
        purchase_date: holding.purchase_date,
        notes: holding.notes.clone(),
        current_value,
        gain_loss,
        gain_loss_percent,
    }
}

/// `records` is keyed by symbol. Holdings whose symbol is missing still count toward
/// `total_cost` but add nothing to `total_value`.
pub fn summarize_portfolio(
    holdings: &[PortfolioHolding],
    records: &HashMap<String, StockRecord>,
) -> PortfolioSummary {
    if holdings.is_empty() {
        return PortfolioSummary::empty();
    }

    let mut total_value = 0.0;
    let mut total_cost = 0.0;
    let mut valued = Vec::with_capacity(holdings.len());

    for holding in holdings {
        total_cost += holding.cost();
        let valuation = value_holding(holding, records.get(&holding.symbol));
        if let Some(v) = valuation.current_value {
            total_value += v;
        }
        valued.push(valuation);
    }

    let total_gain_loss = total_value - total_cost;

    PortfolioSummary {
        total_value,
        total_cost,
        total_gain_loss,
        total_gain_loss_percent: percent_of(total_gain_loss, total_cost),
        holdings_count: holdings.len(),
        holdings: valued,
    }
}

pub fn analyze_portfolio(records: &[StockRecord]) -> PortfolioAnalysis {
    if records.is_empty() {
        return PortfolioAnalysis {
            overall_score: 0.0,
            diversification_score: 0.0,
            risk_assessment: NO_STOCKS_ASSESSMENT.to_string(),
            summary: NO_STOCKS_SUMMARY.to_string(),
            recommendations: vec![NO_STOCKS_RECOMMENDATION.to_string()],
            sector_allocation: BTreeMap::new(),
        };
    }

    let total = records.len() as f64;
    let mut sector_counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in records {
        *sector_counts.entry(r.sector.clone()).or_default() += 1;
    }
    let sector_allocation: BTreeMap<String, f64> = sector_counts
        .iter()
        .map(|(sector, count)| (sector.clone(), *count as f64 / total * 100.0))
        .collect();

    let sector_count = sector_counts.len();
    let diversification_score = (sector_count as f64 * 2.0).min(10.0);

    let avg_beta = mean(records.iter().filter_map(|r| r.beta)).unwrap_or(1.0);
    let avg_dividend = mean(records.iter().filter_map(|r| r.dividend_yield)).unwrap_or(0.0);

    let risk_assessment = if avg_beta < 0.8 {
        LOW_RISK
    } else if avg_beta < 1.0 {
        MODERATE_RISK
    } else {
        HIGHER_RISK
    };

    let overall_score =
        (diversification_score * 0.3 + avg_dividend * 1.5 + (5.0 - avg_beta * 2.0)).min(10.0);

    let mut recommendations = Vec::new();
    if sector_count < 3 {
        recommendations.push(DIVERSIFY.to_string());
    }
    if avg_beta > 1.0 {
        recommendations.push(LOWER_BETA.to_string());
    }
    if avg_dividend < 2.0 {
        recommendations.push(HIGHER_YIELD.to_string());
    }
    if recommendations.is_empty() {
        recommendations.push(WELL_BALANCED.to_string());
    }

    let summary = format!(
        "Portfolio contains {} stocks across {} sectors. Average portfolio beta is {:.2}.",
        records.len(),
        sector_count,
        avg_beta
    );

    PortfolioAnalysis {
        overall_score: round1(overall_score),
        diversification_score: round1(diversification_score),
        risk_assessment: risk_assessment.to_string(),
        summary,
        recommendations,
        sector_allocation,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn holding(symbol: &str, shares: f64, purchase_price: f64) -> PortfolioHolding {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        PortfolioHolding {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            shares,
            purchase_price,
            purchase_date: at,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn record(symbol: &str, sector: &str, price: f64) -> StockRecord {
        StockRecord::new(symbol, symbol, sector, price)
    }

    #[test]
    fn values_resolved_holding() {
        let h = holding("JNJ", 10.0, 100.0);
        let records = HashMap::from([("JNJ".to_string(), record("JNJ", "Healthcare", 120.0))]);
        let summary = summarize_portfolio(&[h], &records);

        let v = &summary.holdings[0];
        assert_eq!(v.current_value, Some(1200.0));
        assert_eq!(v.gain_loss, Some(200.0));
        assert_eq!(v.gain_loss_percent, Some(20.0));
        assert_eq!(v.name.as_deref(), Some("JNJ"));
        assert_eq!(summary.total_value, 1200.0);
        assert_eq!(summary.total_cost, 1000.0);
        assert_eq!(summary.total_gain_loss, 200.0);
        assert_eq!(summary.total_gain_loss_percent, 20.0);
    }

    #[test]
    fn unresolved_holding_is_null_not_zero_and_still_costed() {
        let holdings = vec![holding("JNJ", 10.0, 100.0), holding("GONE", 5.0, 50.0)];
        let records = HashMap::from([("JNJ".to_string(), record("JNJ", "Healthcare", 120.0))]);
        let summary = summarize_portfolio(&holdings, &records);

        assert_eq!(summary.holdings_count, 2);
        assert_eq!(summary.holdings.len(), 2);
        let missing = &summary.holdings[1];
        assert_eq!(missing.symbol, "GONE");
        assert_eq!(missing.current_price, None);
        assert_eq!(missing.current_value, None);
        assert_eq!(missing.gain_loss, None);
        assert_eq!(missing.gain_loss_percent, None);

        assert_eq!(summary.total_cost, 1250.0);
        assert_eq!(summary.total_value, 1200.0);
        assert_eq!(summary.total_gain_loss, -50.0);
        assert_eq!(summary.total_gain_loss_percent, -4.0);
    }

    #[test]
    fn zero_cost_holding_reports_zero_percent() {
        let h = holding("FREE", 10.0, 0.0);
        let v = value_holding(&h, Some(&record("FREE", "Energy", 5.0)));
        assert_eq!(v.gain_loss, Some(50.0));
        assert_eq!(v.gain_loss_percent, Some(0.0));
    }

    #[test]
    fn empty_portfolio_summary_is_all_zero() {
        let summary = summarize_portfolio(&[], &HashMap::new());
        assert_eq!(summary, PortfolioSummary::empty());
    }

    #[test]
    fn empty_analysis_has_fixed_message() {
        let a = analyze_portfolio(&[]);
        assert_eq!(a.overall_score, 0.0);
        assert_eq!(a.diversification_score, 0.0);
        assert!(a.sector_allocation.is_empty());
        assert_eq!(a.risk_assessment, NO_STOCKS_ASSESSMENT);
        assert_eq!(a.recommendations, vec![NO_STOCKS_RECOMMENDATION.to_string()]);
    }

    #[test]
    fn two_sectors_score_four_and_suggest_diversifying() {
        let mut a = record("JNJ", "Healthcare", 150.0);
        a.beta = Some(0.6);
        a.dividend_yield = Some(3.0);
        let mut b = record("PFE", "Healthcare", 28.0);
        b.beta = Some(0.6);
        b.dividend_yield = Some(5.0);
        let mut c = record("KO", "Consumer Defensive", 62.0);
        c.beta = Some(0.6);

        let analysis = analyze_portfolio(&[a, b, c]);
        assert_eq!(analysis.diversification_score, 4.0);
        assert_eq!(analysis.recommendations, vec![DIVERSIFY.to_string()]);
        assert_eq!(analysis.risk_assessment, LOW_RISK);

        let healthcare = analysis.sector_allocation["Healthcare"];
        assert!((healthcare - 200.0 / 3.0).abs() < 1e-9);

        // avg_dividend divides by the two stocks that report one: (3 + 5) / 2 = 4.
        // 4.0 * 0.3 + 4.0 * 1.5 + (5 - 1.2) = 11.0, capped at 10.
        assert_eq!(analysis.overall_score, 10.0);
    }

    #[test]
    fn missing_betas_and_yields_use_defaults() {
        let records = vec![
            record("A", "Energy", 1.0),
            record("B", "Utilities", 1.0),
            record("C", "Industrials", 1.0),
        ];
        let analysis = analyze_portfolio(&records);
        // avg_beta defaults to 1.0, avg_dividend to 0.
        assert_eq!(analysis.risk_assessment, HIGHER_RISK);
        assert_eq!(analysis.diversification_score, 6.0);
        assert_eq!(analysis.overall_score, 4.8);
        assert_eq!(analysis.recommendations, vec![HIGHER_YIELD.to_string()]);
        assert!(analysis.summary.ends_with("Average portfolio beta is 1.00."));
    }

    #[test]
    fn recommendation_order_and_well_balanced_fallback() {
        let mut hot = record("TSLA", "Consumer Cyclical", 1.0);
        hot.beta = Some(2.0);
        hot.dividend_yield = Some(0.5);
        let analysis = analyze_portfolio(&[hot]);
        assert_eq!(
            analysis.recommendations,
            vec![DIVERSIFY.to_string(), LOWER_BETA.to_string(), HIGHER_YIELD.to_string()]
        );

        let balanced: Vec<StockRecord> = ["Energy", "Utilities", "Healthcare"]
            .iter()
            .map(|sector| {
                let mut r = record(sector, sector, 1.0);
                r.beta = Some(0.9);
                r.dividend_yield = Some(3.0);
                r
            })
            .collect();
        let analysis = analyze_portfolio(&balanced);
        assert_eq!(analysis.recommendations, vec![WELL_BALANCED.to_string()]);
        assert_eq!(analysis.risk_assessment, MODERATE_RISK);
    }

    #[test]
    fn overall_score_rounds_half_to_even() {
        let records: Vec<StockRecord> = (0..5)
            .map(|i| {
                let mut r = record(&format!("S{i}"), &format!("Sector {i}"), 1.0);
                r.beta = Some(1.25);
                r.dividend_yield = Some(0.5);
                r
            })
            .collect();
        // 10 * 0.3 + 0.5 * 1.5 + (5 - 2.5) = 6.25 exactly.
        let analysis = analyze_portfolio(&records);
        assert_eq!(analysis.diversification_score, 10.0);
        assert_eq!(analysis.overall_score, 6.2);
    }

    #[test]
    fn diversification_caps_at_ten() {
        let records: Vec<StockRecord> = (0..7)
            .map(|i| record(&format!("S{i}"), &format!("Sector {i}"), 1.0))
            .collect();
        assert_eq!(analyze_portfolio(&records).diversification_score, 10.0);
    }
}
