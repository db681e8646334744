//! Trade Memo Writer
//!
//! Renders an emitted signal into a markdown memo for human review.
//! One file per signal: `<date>_<symbol>_<action>.md` under the
//! configured output directory.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::signal::TradeSignal;
use crate::ports::memo::{MemoContext, MemoError, MemoSink};

/// Markdown memo sink writing to the local filesystem
#[derive(Debug, Clone)]
pub struct TradeMemoWriter {
    output_dir: PathBuf,
}

impl TradeMemoWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn render(&self, signal: &TradeSignal, context: &MemoContext) -> String {
        let contract = &signal.selected_contract;
        let vol = &context.volatility;
        format!(
            "# Trade Review: {symbol} {action}\n\
             \n\
             **Date**: {date}\n\
             **Signal**: {strategy}\n\
             **Status**: PENDING REVIEW\n\
             \n\
             ---\n\
             \n\
             ## Thesis\n\
             - **Direction**: {action} ({option_type})\n\
             - **Catalyst**: volatility breakout, z-score {z:.2} against a \
             {std:.2}% daily std window\n\
             - **Market Regime**: {regime} (VIX {vix:.1}, trend {trend:+.2}%)\n\
             - **Confidence**: {confidence:.1}% (normal CDF of |z|)\n\
             \n\
             ## Instrument\n\
             - **Contract**: {expiry} ${strike:.2} {option_type}\n\
             - **Price**: ${price:.2}\n\
             - **Open Interest**: {oi}\n\
             - **Day Volume**: {volume}\n\
             \n\
             ## Risk\n\
             - **Allocation**: ${allocation:.2}\n\
             - **Position Size**: {quantity} contracts\n\
             - **Total Premium**: ${cost:.2}\n\
             - **Stop**: -50% of premium or regime change\n\
             \n\
             ---\n\
             \n\
             ## Decision\n\
             - [ ] APPROVED\n\
             - [ ] REJECTED\n\
             - [ ] MODIFY\n",
            symbol = signal.symbol,
            action = signal.action,
            date = Utc::now().format("%Y-%m-%d"),
            strategy = signal.strategy_tag,
            option_type = contract.contract_type,
            z = vol.z_score,
            std = vol.rolling_std * 100.0,
            regime = context.regime,
            vix = context.regime_inputs.vix_level,
            trend = context.regime_inputs.market_trend_return * 100.0,
            confidence = vol.confidence() * 100.0,
            expiry = contract.expiry,
            strike = contract.strike,
            price = contract.last_price,
            oi = contract.open_interest,
            volume = contract.volume,
            allocation = signal.allocation,
            quantity = signal.quantity,
            cost = signal.total_cost(),
        )
    }
}

#[async_trait]
impl MemoSink for TradeMemoWriter {
    async fn write_memo(
        &self,
        signal: &TradeSignal,
        context: &MemoContext,
    ) -> Result<String, MemoError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| MemoError::WriteFailed(e.to_string()))?;

        let filename = format!(
            "{}_{}_{}.md",
            Utc::now().format("%Y-%m-%d"),
            signal.symbol,
            signal.action
        );
        let path = self.output_dir.join(filename);
        let content = self.render(signal, context);

        std::fs::write(&path, content).map_err(|e| MemoError::WriteFailed(e.to_string()))?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{OptionContract, OptionType};
    use crate::domain::regime::{RegimeInputs, RegimeState};
    use crate::domain::signal::{TradeAction, VolatilitySignal};
    use chrono::NaiveDate;

    fn test_signal() -> TradeSignal {
        TradeSignal {
            symbol: "NVDA".to_string(),
            action: TradeAction::Buy,
            allocation: 500.0,
            selected_contract: OptionContract {
                symbol: "O:NVDA250418C00150000".to_string(),
                strike: 150.0,
                expiry: NaiveDate::from_ymd_opt(2025, 4, 18).unwrap(),
                last_price: 3.0,
                contract_type: OptionType::Call,
                open_interest: 1500,
                volume: 420,
            },
            quantity: 1,
            strategy_tag: "vol_breakout".to_string(),
        }
    }

    fn test_context() -> MemoContext {
        MemoContext {
            regime: RegimeState::Bullish,
            regime_inputs: RegimeInputs {
                vix_level: 14.2,
                market_trend_return: 0.012,
                breadth_diff: 0.004,
            },
            volatility: VolatilitySignal {
                symbol: "NVDA".to_string(),
                z_score: 2.8,
                rolling_std: 0.021,
                rolling_mean: 0.001,
                current_return: 0.06,
                is_breakout: true,
            },
        }
    }

    #[tokio::test]
    async fn test_writes_memo_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TradeMemoWriter::new(dir.path());

        let path = writer
            .write_memo(&test_signal(), &test_context())
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("NVDA BUY"));
        assert!(content.contains("$150.00 CALL"));
        assert!(content.contains("2025-04-18"));
        assert!(content.contains("1 contracts"));
        assert!(content.contains("BULLISH"));
    }

    #[tokio::test]
    async fn test_memo_includes_every_required_field() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TradeMemoWriter::new(dir.path());
        let signal = test_signal();

        let path = writer.write_memo(&signal, &test_context()).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        // strike, expiry, option price, quantity, allocation, action, type
        assert!(content.contains("150.00"));
        assert!(content.contains("2025-04-18"));
        assert!(content.contains("$3.00"));
        assert!(content.contains(&format!("{} contracts", signal.quantity)));
        assert!(content.contains("$500.00"));
        assert!(content.contains("BUY"));
        assert!(content.contains("CALL"));
    }

    #[tokio::test]
    async fn test_unwritable_directory_fails() {
        let writer = TradeMemoWriter::new("/proc/volscan-nope");
        let result = writer.write_memo(&test_signal(), &test_context()).await;
        assert!(matches!(result, Err(MemoError::WriteFailed(_))));
    }
}
