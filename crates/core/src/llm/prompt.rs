use crate::domain::stock::StockRecord;

pub const SYSTEM_PROMPT: &str = "You are a conservative investment analyst focusing on dividend-paying blue-chip stocks for long-term investors. Respond only with valid JSON.";

fn or_na(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map(render).unwrap_or_else(|| "N/A".to_string())
}

pub fn user_prompt(stock: &StockRecord) -> String {
    let dividend = or_na(stock.dividend_yield, |v| format!("{v:.2}%"));
    let pe = or_na(stock.pe_ratio, |v| format!("{v:.1}"));
    let cap = or_na(stock.market_cap, |v| format!("${v:.1}B"));
    let beta = or_na(stock.beta, |v| format!("{v:.2}"));
    let debt = or_na(stock.debt_to_equity, |v| format!("{v:.1}%"));
    let payout = or_na(stock.payout_ratio, |v| format!("{v:.1}%"));
    let forward_pe = or_na(stock.forward_pe, |v| format!("{v:.1}"));

    format!(
        "Analyze this stock for a conservative long-term investor (10+ year horizon):\n\n\
Stock: {symbol} - {name}\n\
Sector: {sector}\n\
Current Price: ${price:.2}\n\
Dividend Yield: {dividend}\n\
Payout Ratio: {payout}\n\
P/E Ratio: {pe}\n\
Forward P/E: {forward_pe}\n\
Market Cap: {cap}\n\
Beta: {beta}\n\
Debt/Equity: {debt}\n\n\
Provide analysis in JSON format:\n\
{{\n\
  \"recommendation\": \"strong_buy|buy|hold|sell|strong_sell\",\n\
  \"confidence\": 0.0-1.0,\n\
  \"summary\": \"2-3 sentence summary\",\n\
  \"pros\": [\"pro1\", \"pro2\", \"pro3\"],\n\
  \"cons\": [\"con1\", \"con2\"],\n\
  \"target_price\": null or number,\n\
  \"risk_level\": \"low|medium|high\"\n\
}}\n\n\
Focus on dividend stability, value metrics, and long-term growth potential for conservative investors.",
        symbol = stock.symbol,
        name = stock.name,
        sector = stock.sector,
        price = stock.price,
    )
}

/// JSON schema of the verdict, shared by tool definitions and structured-output requests.
pub fn verdict_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["recommendation", "confidence", "summary", "pros", "cons", "target_price", "risk_level"],
        "properties": {
            "recommendation": {"type": "string", "enum": ["strong_buy", "buy", "hold", "sell", "strong_sell"]},
            "confidence": {"type": "number"},
            "summary": {"type": "string"},
            "pros": {"type": "array", "items": {"type": "string"}},
            "cons": {"type": "array", "items": {"type": "string"}},
            "target_price": {"type": ["number", "null"]},
            "risk_level": {"type": "string", "enum": ["low", "medium", "high"]}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_absent_fundamentals_as_na() {
        let mut stock = StockRecord::new("KO", "Coca-Cola", "Consumer Defensive", 62.8);
        stock.dividend_yield = Some(2.9);
        let prompt = user_prompt(&stock);
        assert!(prompt.contains("Stock: KO - Coca-Cola"));
        assert!(prompt.contains("Current Price: $62.80"));
        assert!(prompt.contains("Dividend Yield: 2.90%"));
        assert!(prompt.contains("P/E Ratio: N/A"));
        assert!(prompt.contains("Beta: N/A"));
    }
}
