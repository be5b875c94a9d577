//! Net worth and leaderboard, marked at current quotes.
//!
//! Reads take no lock across accounts and quotes together, so a report may mix
//! a slightly older quote with a newer account state.

use crate::ledger::Ledger;
use crate::quotes::QuoteStore;
use log::warn;
use market::{Account, Holding, LeaderboardEntry, Result, Symbol, UserId};
use std::collections::HashMap;
use std::sync::Arc;

pub struct Valuation {
    ledger: Arc<Ledger>,
    quotes: Arc<QuoteStore>,
}

impl Valuation {
    pub fn new(ledger: Arc<Ledger>, quotes: Arc<QuoteStore>) -> Self {
        Self { ledger, quotes }
    }

    /// Positions of `user_id`, each marked at its current price.
    pub fn portfolio(&self, user_id: UserId) -> Result<Vec<Holding>> {
        let account = self.ledger.account(user_id)?;
        let prices = self.price_map();
        Ok(holdings(&account, &prices))
    }

    /// Market value of all positions, without cash.
    pub fn invested_assets(&self, user_id: UserId) -> Result<f64> {
        Ok(self.portfolio(user_id)?.iter().map(|h| h.market_value).sum())
    }

    /// Cash plus invested assets.
    pub fn net_worth(&self, user_id: UserId) -> Result<f64> {
        let account = self.ledger.account(user_id)?;
        let invested: f64 = holdings(&account, &self.price_map())
            .iter()
            .map(|h| h.market_value)
            .sum();
        Ok(account.balance() + invested)
    }

    /// Every account ranked by net worth, highest first. Equal net worth
    /// keeps account-opening order.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let prices = self.price_map();
        let mut rows: Vec<LeaderboardEntry> = self
            .ledger
            .accounts()
            .iter()
            .map(|account| {
                let invested: f64 = holdings(account, &prices)
                    .iter()
                    .map(|h| h.market_value)
                    .sum();
                LeaderboardEntry {
                    rank: 0,
                    username: account.username().to_string(),
                    liquid_assets: account.balance(),
                    invested_assets: invested,
                    net_worth: account.balance() + invested,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.net_worth.total_cmp(&a.net_worth));
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = i + 1;
        }
        rows
    }

    fn price_map(&self) -> HashMap<Symbol, f64> {
        self.quotes
            .list()
            .into_iter()
            .map(|s| (s.symbol().clone(), s.price()))
            .collect()
    }
}

fn holdings(account: &Account, prices: &HashMap<Symbol, f64>) -> Vec<Holding> {
    account
        .positions()
        .iter()
        .map(|(symbol, &quantity)| {
            let mark_price = prices.get(symbol).copied().unwrap_or_else(|| {
                warn!("No quote for {symbol} held by {}, marking at 0", account.username());
                0.0
            });
            Holding {
                symbol: symbol.clone(),
                quantity,
                mark_price,
                market_value: mark_price * quantity as f64,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingEngine;
    use crate::settings::PricingSettings;
    use crate::shock::mock::FixedShock;
    use crate::store::MemoryStore;
    use market::Stock;

    fn setup() -> (Valuation, Arc<Ledger>) {
        let store = Arc::new(MemoryStore::new());
        let quotes = Arc::new(QuoteStore::new(store.clone()));
        for (symbol, price) in [("ABC", 100.0), ("XYZ", 10.0)] {
            let stock =
                Stock::new(Symbol::parse(symbol).unwrap(), symbol, "energy", price, 1.0, 0.0)
                    .unwrap();
            quotes.list_stock(stock).unwrap();
        }
        let pricing = Arc::new(PricingEngine::new(
            quotes.clone(),
            PricingSettings {
                impact_coefficient: 0.0,
                ..PricingSettings::default()
            },
            Box::new(FixedShock::none()),
        ));
        let ledger = Arc::new(
            Ledger::restore(quotes.clone(), pricing, store, 1000.0, vec![], vec![]).unwrap(),
        );
        (Valuation::new(ledger.clone(), quotes), ledger)
    }

    #[test]
    fn test_marks_positions_at_current_price() {
        let (valuation, ledger) = setup();
        let user = ledger.open_account("ada").unwrap().user_id();
        ledger.buy(user, "ABC", 2).unwrap();
        ledger.buy(user, "XYZ", 5).unwrap();
        valuation
            .quotes
            .apply_price_change(&Symbol::parse("ABC").unwrap(), 150.0)
            .unwrap();

        let portfolio = valuation.portfolio(user).unwrap();
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio[0].market_value, 300.0);
        assert_eq!(portfolio[1].market_value, 50.0);
        assert_eq!(valuation.invested_assets(user).unwrap(), 350.0);
        // 1000 - 200 - 50 cash
        assert_eq!(valuation.net_worth(user).unwrap(), 1100.0);
    }

    #[test]
    fn test_leaderboard_ranks_by_net_worth_then_opening_order() {
        let (valuation, ledger) = setup();
        let ada = ledger.open_account("ada").unwrap().user_id();
        ledger.open_account("bob").unwrap();
        let cy = ledger.open_account("cy").unwrap().user_id();

        ledger.buy(ada, "ABC", 1).unwrap();
        ledger.buy(cy, "XYZ", 10).unwrap();
        valuation
            .quotes
            .apply_price_change(&Symbol::parse("XYZ").unwrap(), 20.0)
            .unwrap();

        let board = valuation.leaderboard();
        let names: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["cy", "ada", "bob"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].net_worth, 1100.0);
        assert_eq!(board[0].liquid_assets, 900.0);
        assert_eq!(board[0].invested_assets, 200.0);
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn test_unknown_user() {
        let (valuation, _) = setup();
        assert!(valuation.net_worth(UserId::generate()).is_err());
    }
}
