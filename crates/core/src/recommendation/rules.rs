use crate::domain::recommendation::{RiskLevel, StockRecommendation, Verdict};
use crate::domain::stock::StockRecord;

const FALLBACK_PRO: &str = "Established company";
const FALLBACK_CON: &str = "Limited data available";

/// Deterministic scorer. Each present fundamental contributes independently to an integer score;
/// absent fundamentals contribute nothing.
pub fn rule_based_recommendation(stock: &StockRecord) -> StockRecommendation {
    let mut score: i32 = 0;
    let mut pros: Vec<String> = Vec::new();
    let mut cons: Vec<String> = Vec::new();

    if let Some(dy) = stock.dividend_yield {
        if dy >= 3.0 {
            score += 2;
            pros.push(format!("Strong dividend yield of {dy:.1}%"));
        } else if dy >= 2.0 {
            score += 1;
            pros.push(format!("Decent dividend yield of {dy:.1}%"));
        } else {
            cons.push(format!("Low dividend yield of {dy:.1}%"));
        }
    }

    if let Some(pe) = stock.pe_ratio {
        if pe < 15.0 {
            score += 2;
            pros.push(format!("Attractive P/E ratio of {pe:.1}"));
        } else if pe < 25.0 {
            score += 1;
            pros.push(format!("Reasonable P/E ratio of {pe:.1}"));
        } else {
            score -= 1;
            cons.push(format!("High P/E ratio of {pe:.1}"));
        }
    }

    if let Some(beta) = stock.beta {
        if beta < 0.8 {
            score += 2;
            pros.push(format!("Low volatility (beta: {beta:.2})"));
        } else if beta < 1.0 {
            score += 1;
            pros.push(format!("Below-market volatility (beta: {beta:.2})"));
        } else if beta > 1.2 {
            score -= 1;
            cons.push(format!("Higher volatility (beta: {beta:.2})"));
        }
    }

    if let Some(cap) = stock.market_cap {
        if cap >= 100.0 {
            score += 1;
            pros.push("Large-cap stability".to_string());
        } else if cap < 10.0 {
            cons.push("Smaller market cap, potentially more volatile".to_string());
        }
    }

    if let Some(de) = stock.debt_to_equity {
        if de < 50.0 {
            score += 1;
            pros.push("Low debt levels".to_string());
        } else if de > 100.0 {
            score -= 1;
            cons.push("Higher debt levels".to_string());
        }
    }

    let (recommendation, confidence) = verdict_for_score(score);

    if pros.is_empty() {
        pros.push(FALLBACK_PRO.to_string());
    }
    if cons.is_empty() {
        cons.push(FALLBACK_CON.to_string());
    }

    StockRecommendation {
        symbol: stock.symbol.clone(),
        recommendation,
        confidence,
        summary: summary_for(stock, recommendation),
        pros,
        cons,
        target_price: None,
        risk_level: risk_level_for(stock.beta),
    }
}

pub fn verdict_for_score(score: i32) -> (Verdict, f64) {
    match score {
        s if s >= 5 => (Verdict::StrongBuy, 0.85),
        s if s >= 3 => (Verdict::Buy, 0.70),
        s if s >= 1 => (Verdict::Hold, 0.60),
        s if s >= -1 => (Verdict::Sell, 0.55),
        _ => (Verdict::StrongSell, 0.50),
    }
}

pub fn risk_level_for(beta: Option<f64>) -> RiskLevel {
    match beta {
        Some(b) if b < 0.8 => RiskLevel::Low,
        Some(b) if b > 1.2 => RiskLevel::High,
        _ => RiskLevel::Medium,
    }
}

fn summary_for(stock: &StockRecord, verdict: Verdict) -> String {
    let tail = if verdict.is_buy() {
        "that shows favorable characteristics for conservative long-term investors."
    } else if verdict == Verdict::Hold {
        "with mixed metrics. Consider monitoring before making investment decisions."
    } else {
        "that may not align well with conservative investment criteria."
    };
    format!("{} is a {} stock {tail}", stock.name, stock.sector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StockRecord {
        StockRecord::new("JNJ", "Johnson & Johnson", "Healthcare", 155.5)
    }

    #[test]
    fn all_favourable_fundamentals_score_strong_buy() {
        let mut s = record();
        s.dividend_yield = Some(3.0);
        s.pe_ratio = Some(14.9);
        s.beta = Some(0.5);
        s.market_cap = Some(150.0);
        s.debt_to_equity = Some(40.0);

        let rec = rule_based_recommendation(&s);
        assert_eq!(rec.recommendation, Verdict::StrongBuy);
        assert_eq!(rec.confidence, 0.85);
        assert_eq!(rec.risk_level, RiskLevel::Low);
        assert_eq!(rec.pros.len(), 5);
        assert_eq!(rec.cons, vec![FALLBACK_CON.to_string()]);
        assert_eq!(rec.target_price, None);
        assert_eq!(rec.symbol, "JNJ");
        assert!(rec.summary.starts_with("Johnson & Johnson is a Healthcare stock that shows favorable"));
    }

    #[test]
    fn score_boundaries_map_to_verdicts() {
        assert_eq!(verdict_for_score(5), (Verdict::StrongBuy, 0.85));
        assert_eq!(verdict_for_score(4), (Verdict::Buy, 0.70));
        assert_eq!(verdict_for_score(3), (Verdict::Buy, 0.70));
        assert_eq!(verdict_for_score(1), (Verdict::Hold, 0.60));
        assert_eq!(verdict_for_score(0), (Verdict::Sell, 0.55));
        assert_eq!(verdict_for_score(-1), (Verdict::Sell, 0.55));
        assert_eq!(verdict_for_score(-2), (Verdict::StrongSell, 0.50));
    }

    #[test]
    fn no_data_yields_sell_with_generic_factors() {
        let rec = rule_based_recommendation(&record());
        assert_eq!(rec.recommendation, Verdict::Sell);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
        assert_eq!(rec.pros, vec![FALLBACK_PRO.to_string()]);
        assert_eq!(rec.cons, vec![FALLBACK_CON.to_string()]);
        assert!(rec.summary.ends_with("may not align well with conservative investment criteria."));
    }

    #[test]
    fn penalties_reach_strong_sell() {
        let mut s = record();
        s.dividend_yield = Some(0.5);
        s.pe_ratio = Some(40.0);
        s.beta = Some(1.5);
        s.market_cap = Some(5.0);
        s.debt_to_equity = Some(180.0);

        let rec = rule_based_recommendation(&s);
        assert_eq!(rec.recommendation, Verdict::StrongSell);
        assert_eq!(rec.risk_level, RiskLevel::High);
        assert_eq!(rec.cons.len(), 5);
        assert_eq!(rec.pros, vec![FALLBACK_PRO.to_string()]);
    }

    #[test]
    fn middle_bands_have_no_effect() {
        let mut s = record();
        s.beta = Some(1.1);
        s.market_cap = Some(50.0);
        s.debt_to_equity = Some(75.0);
        s.dividend_yield = Some(2.5);

        // +1 from the dividend only.
        let rec = rule_based_recommendation(&s);
        assert_eq!(rec.recommendation, Verdict::Hold);
        assert_eq!(rec.pros, vec!["Decent dividend yield of 2.5%".to_string()]);
        assert_eq!(rec.cons, vec![FALLBACK_CON.to_string()]);
        assert!(rec.summary.contains("with mixed metrics"));
    }

    #[test]
    fn zero_yield_is_a_present_low_yield() {
        let mut s = record();
        s.dividend_yield = Some(0.0);
        let rec = rule_based_recommendation(&s);
        assert_eq!(rec.cons, vec!["Low dividend yield of 0.0%".to_string()]);
    }

    #[test]
    fn risk_level_buckets() {
        assert_eq!(risk_level_for(Some(0.79)), RiskLevel::Low);
        assert_eq!(risk_level_for(Some(0.8)), RiskLevel::Medium);
        assert_eq!(risk_level_for(Some(1.2)), RiskLevel::Medium);
        assert_eq!(risk_level_for(Some(1.21)), RiskLevel::High);
        assert_eq!(risk_level_for(None), RiskLevel::Medium);
    }
}
