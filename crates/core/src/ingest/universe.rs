/// Blue-chip dividend payers screened by default.
pub const CONSERVATIVE_UNIVERSE: [&str; 36] = [
    // Healthcare
    "JNJ", "PFE", "ABBV", "MRK", "UNH",
    // Consumer staples
    "PG", "KO", "PEP", "WMT", "COST",
    // Financials
    "JPM", "BRK-B", "V", "MA", "BAC",
    // Technology (stable large caps)
    "MSFT", "AAPL", "CSCO", "IBM", "INTC",
    // Utilities
    "NEE", "DUK", "SO", "D", "AEP",
    // Industrials
    "MMM", "HON", "CAT", "UPS", "RTX",
    // Energy
    "XOM", "CVX", "COP",
    // REITs
    "O", "SPG", "AMT",
];

pub fn conservative_universe() -> Vec<String> {
    CONSERVATIVE_UNIVERSE.iter().map(|s| s.to_string()).collect()
}
