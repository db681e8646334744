//! Option Contracts and Selection
//!
//! Chain snapshot types and the affordability-aware out-of-the-money
//! contract selector. Standard equity convention: one contract controls
//! 100 shares.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shares controlled by one contract
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Call or put
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

/// Read-only snapshot of one contract from an options chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Full contract symbol (e.g. OCC-style)
    pub symbol: String,
    pub strike: f64,
    pub expiry: NaiveDate,
    pub last_price: f64,
    pub contract_type: OptionType,
    pub open_interest: u64,
    pub volume: u64,
}

impl OptionContract {
    /// Premium for one contract in dollars
    pub fn cost(&self) -> f64 {
        self.last_price * CONTRACT_MULTIPLIER
    }

    /// Whether the strike is out of the money relative to the spot price
    pub fn is_otm(&self, current_price: f64) -> bool {
        match self.contract_type {
            OptionType::Call => self.strike > current_price,
            OptionType::Put => self.strike < current_price,
        }
    }

    /// Absolute strike distance from spot
    pub fn moneyness_distance(&self, current_price: f64) -> f64 {
        (self.strike - current_price).abs()
    }
}

/// Picks the nearest-the-money OTM contract the allocation can afford
#[derive(Debug, Clone, Default)]
pub struct ContractSelector;

impl ContractSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select from a chain: filter to OTM contracts of the wanted type,
    /// walk them nearest-the-money first, and take the first whose full
    /// cost fits the allocation. Ties break on proximity, never on
    /// premium. `None` means no affordable candidate, which is a valid
    /// outcome rather than an error.
    pub fn select<'a>(
        &self,
        chain: &'a [OptionContract],
        direction: OptionType,
        current_price: f64,
        allocation: f64,
    ) -> Option<&'a OptionContract> {
        let mut candidates: Vec<&OptionContract> = chain
            .iter()
            .filter(|c| c.contract_type == direction && c.is_otm(current_price))
            .collect();

        candidates.sort_by(|a, b| {
            a.moneyness_distance(current_price)
                .partial_cmp(&b.moneyness_distance(current_price))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        candidates
            .into_iter()
            .find(|c| c.cost() > 0.0 && c.cost() <= allocation)
    }

    /// Contracts the allocation affords at the selected premium.
    /// Zero means the pick is unusable and the caller should treat it
    /// as no-trade.
    pub fn quantity(&self, contract: &OptionContract, allocation: f64) -> u32 {
        let cost = contract.cost();
        if cost <= 0.0 {
            return 0;
        }
        (allocation / cost).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(strike: f64, last_price: f64, contract_type: OptionType) -> OptionContract {
        OptionContract {
            symbol: format!("TST-{}-{:?}", strike, contract_type),
            strike,
            expiry: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            last_price,
            contract_type,
            open_interest: 500,
            volume: 100,
        }
    }

    #[test]
    fn test_otm_definition() {
        assert!(contract(110.0, 1.0, OptionType::Call).is_otm(100.0));
        assert!(!contract(90.0, 1.0, OptionType::Call).is_otm(100.0));
        assert!(contract(90.0, 1.0, OptionType::Put).is_otm(100.0));
        assert!(!contract(110.0, 1.0, OptionType::Put).is_otm(100.0));
    }

    #[test]
    fn test_selects_nearest_affordable_not_cheapest() {
        // Puts at increasing strike distance with falling premiums. The
        // two nearer-the-money candidates are too expensive for $500, so
        // the $3.00 contract wins on proximity order, not global price.
        let chain = vec![
            contract(95.0, 12.0, OptionType::Put),
            contract(90.0, 6.0, OptionType::Put),
            contract(85.0, 3.0, OptionType::Put),
        ];
        let selector = ContractSelector::new();
        let picked = selector
            .select(&chain, OptionType::Put, 100.0, 500.0)
            .unwrap();
        assert_eq!(picked.strike, 85.0);
        assert_eq!(picked.last_price, 3.0);
    }

    #[test]
    fn test_prefers_proximity_over_premium() {
        // Both affordable; nearer strike wins even though it costs more
        let chain = vec![
            contract(105.0, 4.0, OptionType::Call),
            contract(120.0, 1.0, OptionType::Call),
        ];
        let selector = ContractSelector::new();
        let picked = selector
            .select(&chain, OptionType::Call, 100.0, 500.0)
            .unwrap();
        assert_eq!(picked.strike, 105.0);
    }

    #[test]
    fn test_cost_never_exceeds_allocation() {
        let chain = vec![
            contract(101.0, 9.0, OptionType::Call),
            contract(103.0, 5.5, OptionType::Call),
            contract(107.0, 2.5, OptionType::Call),
        ];
        let selector = ContractSelector::new();
        for allocation in [100.0, 260.0, 600.0, 1000.0] {
            if let Some(picked) = selector.select(&chain, OptionType::Call, 100.0, allocation) {
                assert!(picked.cost() <= allocation);
            }
        }
    }

    #[test]
    fn test_none_when_nothing_affordable() {
        let chain = vec![contract(105.0, 20.0, OptionType::Call)];
        let selector = ContractSelector::new();
        assert!(selector
            .select(&chain, OptionType::Call, 100.0, 500.0)
            .is_none());
    }

    #[test]
    fn test_itm_contracts_filtered_out() {
        let chain = vec![
            contract(90.0, 0.5, OptionType::Call), // ITM, cheap
            contract(110.0, 2.0, OptionType::Call),
        ];
        let selector = ContractSelector::new();
        let picked = selector
            .select(&chain, OptionType::Call, 100.0, 500.0)
            .unwrap();
        assert_eq!(picked.strike, 110.0);
    }

    #[test]
    fn test_wrong_type_filtered_out() {
        let chain = vec![contract(90.0, 1.0, OptionType::Put)];
        let selector = ContractSelector::new();
        assert!(selector
            .select(&chain, OptionType::Call, 100.0, 500.0)
            .is_none());
    }

    #[test]
    fn test_quantity_floor() {
        let selector = ContractSelector::new();
        let c = contract(85.0, 3.0, OptionType::Put);
        assert_eq!(selector.quantity(&c, 500.0), 1); // 500 / 300
        assert_eq!(selector.quantity(&c, 900.0), 3);
        assert_eq!(selector.quantity(&c, 299.0), 0);
    }

    #[test]
    fn test_zero_priced_contract_never_selected() {
        let chain = vec![contract(105.0, 0.0, OptionType::Call)];
        let selector = ContractSelector::new();
        assert!(selector
            .select(&chain, OptionType::Call, 100.0, 500.0)
            .is_none());
    }
}
