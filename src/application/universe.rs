//! Scan Universes
//!
//! Curated ticker lists. Static for now; a dynamic index-constituent
//! fetch would replace these.

/// High-beta names that move enough to trip the breakout detector
pub fn high_beta() -> Vec<String> {
    [
        "NVDA", "TSLA", "AMD", "COIN", "MSTR", "MARA", "PLTR", "NET", "ROKU", "SQ", "SHOP",
        "AFRM", "UPST",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Top Nasdaq large caps, trimmed to keep scan API usage reasonable
pub fn nasdaq_large_caps() -> Vec<String> {
    [
        "AAPL", "MSFT", "AMZN", "NVDA", "GOOGL", "META", "TSLA", "AVGO", "COST", "PEP", "CSCO",
        "TMUS", "CMCSA", "INTC", "AMD", "NFLX", "QCOM", "TXN", "HON", "AMGN",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Union of all lists, deduplicated, original order preserved
pub fn combined() -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    high_beta()
        .into_iter()
        .chain(nasdaq_large_caps())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_is_deduplicated() {
        let combined = combined();
        let unique: std::collections::HashSet<_> = combined.iter().collect();
        assert_eq!(combined.len(), unique.len());
    }

    #[test]
    fn test_combined_covers_both_lists() {
        let combined = combined();
        for symbol in high_beta().iter().chain(nasdaq_large_caps().iter()) {
            assert!(combined.contains(symbol));
        }
    }
}
