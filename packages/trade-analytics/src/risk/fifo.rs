//! First-in-first-out lot matching for realized P&L.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::types::{window_start, TradeSide, Transaction};

/// An open purchase waiting to be matched against later sells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuyLot {
    pub unit_price: f64,
    pub remaining: u64,
}

/// Per-item queues of open buy lots.
///
/// Transactions must be applied in chronological order; the ledger itself
/// does not sort.
#[derive(Debug, Default)]
pub struct FifoLedger {
    lots: HashMap<i64, VecDeque<BuyLot>>,
}

impl FifoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transaction.
    ///
    /// Buys open a lot and return `None`. Sells consume lots from the front of
    /// the item's queue and return the realized P&L. Units sold beyond the open
    /// lots count as pure revenue at the sale price, covering inventory bought
    /// before the transaction history begins.
    pub fn apply(&mut self, transaction: &Transaction) -> Option<f64> {
        match transaction.side {
            TradeSide::Buy => {
                if transaction.quantity > 0 {
                    self.lots
                        .entry(transaction.item_id)
                        .or_default()
                        .push_back(BuyLot {
                            unit_price: transaction.unit_price,
                            remaining: transaction.quantity,
                        });
                }
                None
            }
            TradeSide::Sell => Some(self.match_sell(transaction)),
        }
    }

    fn match_sell(&mut self, sell: &Transaction) -> f64 {
        let mut unmatched = sell.quantity;
        let mut realized = 0.0;

        if let Some(queue) = self.lots.get_mut(&sell.item_id) {
            while unmatched > 0 {
                let Some(lot) = queue.front_mut() else {
                    break;
                };

                let matched = lot.remaining.min(unmatched);
                realized += (sell.unit_price - lot.unit_price) * matched as f64;
                lot.remaining -= matched;
                unmatched -= matched;

                if lot.remaining == 0 {
                    queue.pop_front();
                }
            }
        }

        if unmatched > 0 {
            realized += sell.unit_price * unmatched as f64;
        }
        realized
    }

    /// Open lots of an item, oldest first.
    pub fn open_lots(&self, item_id: i64) -> Vec<BuyLot> {
        self.lots
            .get(&item_id)
            .map(|queue| queue.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Units still held of an item.
    pub fn open_quantity(&self, item_id: i64) -> u64 {
        self.lots
            .get(&item_id)
            .map_or(0, |queue| queue.iter().map(|lot| lot.remaining).sum())
    }
}

/// Realized P&L per calendar day, FIFO-matched across all items.
///
/// The full history feeds lot construction, but only days on or after
/// `now - window_days` are reported. Days without a sell are absent.
pub fn realized_daily_pnl(
    transactions: &[Transaction],
    now: DateTime<Utc>,
    window_days: i64,
) -> BTreeMap<NaiveDate, f64> {
    let first_day = window_start(now, window_days).date_naive();

    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut ledger = FifoLedger::new();
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut discarded = 0usize;

    for transaction in ordered {
        let Some(pnl) = ledger.apply(transaction) else {
            continue;
        };
        let day = transaction.day();
        if day < first_day {
            discarded += 1;
            continue;
        }
        *daily.entry(day).or_insert(0.0) += pnl;
    }

    debug!(
        days = daily.len(),
        discarded_sells = discarded,
        "Realized daily P&L built"
    );

    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap()
    }

    fn at(days_ago: i64, hour: i64) -> DateTime<Utc> {
        now() - Duration::days(days_ago) - Duration::hours(18) + Duration::hours(hour)
    }

    #[test]
    fn test_fifo_partial_lot() {
        let mut ledger = FifoLedger::new();
        assert_eq!(ledger.apply(&Transaction::buy(at(3, 9), 34, "Tritanium", 100.0, 10)), None);
        assert_eq!(ledger.apply(&Transaction::buy(at(2, 9), 34, "Tritanium", 110.0, 10)), None);

        let pnl = ledger
            .apply(&Transaction::sell(at(1, 9), 34, "Tritanium", 150.0, 15))
            .unwrap();

        // (150 - 100) * 10 + (150 - 110) * 5
        assert_abs_diff_eq!(pnl, 700.0, epsilon = 1e-9);
        assert_eq!(ledger.open_quantity(34), 5);
        assert_eq!(
            ledger.open_lots(34),
            vec![BuyLot {
                unit_price: 110.0,
                remaining: 5
            }]
        );
    }

    #[test]
    fn test_unmatched_sell_is_revenue() {
        let mut ledger = FifoLedger::new();
        ledger.apply(&Transaction::buy(at(3, 9), 34, "Tritanium", 10.0, 5));

        let pnl = ledger
            .apply(&Transaction::sell(at(1, 9), 34, "Tritanium", 12.0, 8))
            .unwrap();

        // 5 matched at +2, 3 unmatched at full price
        assert_abs_diff_eq!(pnl, 10.0 + 36.0, epsilon = 1e-9);
        assert_eq!(ledger.open_quantity(34), 0);
        assert!(ledger.open_lots(34).is_empty());
    }

    #[test]
    fn test_items_are_matched_independently() {
        let mut ledger = FifoLedger::new();
        ledger.apply(&Transaction::buy(at(3, 9), 34, "Tritanium", 10.0, 5));
        ledger.apply(&Transaction::buy(at(3, 9), 35, "Pyerite", 50.0, 5));

        let pnl = ledger
            .apply(&Transaction::sell(at(1, 9), 35, "Pyerite", 45.0, 5))
            .unwrap();
        assert_abs_diff_eq!(pnl, -25.0, epsilon = 1e-9);
        assert_eq!(ledger.open_quantity(34), 5);
    }

    #[test]
    fn test_daily_series_sorts_input() {
        // Supplied newest first; matching must still see the buys first
        let transactions = vec![
            Transaction::sell(at(1, 12), 34, "Tritanium", 150.0, 15),
            Transaction::buy(at(2, 9), 34, "Tritanium", 110.0, 10),
            Transaction::buy(at(3, 9), 34, "Tritanium", 100.0, 10),
        ];

        let daily = realized_daily_pnl(&transactions, now(), 180);
        assert_eq!(daily.len(), 1);
        assert_abs_diff_eq!(*daily.values().next().unwrap(), 700.0, epsilon = 1e-9);
    }

    #[test]
    fn test_daily_series_aggregates_same_day_sells() {
        let transactions = vec![
            Transaction::buy(at(5, 9), 34, "Tritanium", 10.0, 100),
            Transaction::buy(at(5, 9), 35, "Pyerite", 20.0, 100),
            Transaction::sell(at(2, 10), 34, "Tritanium", 11.0, 50),
            Transaction::sell(at(2, 15), 35, "Pyerite", 19.0, 50),
            Transaction::sell(at(1, 10), 34, "Tritanium", 13.0, 50),
        ];

        let daily = realized_daily_pnl(&transactions, now(), 180);
        let values: Vec<f64> = daily.values().copied().collect();
        assert_eq!(values.len(), 2);
        assert_abs_diff_eq!(values[0], 50.0 - 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(values[1], 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_history_before_window_builds_lots_but_is_not_reported() {
        let transactions = vec![
            Transaction::buy(at(400, 9), 34, "Tritanium", 100.0, 20),
            Transaction::sell(at(300, 9), 34, "Tritanium", 120.0, 10),
            Transaction::sell(at(10, 9), 34, "Tritanium", 130.0, 10),
        ];

        let daily = realized_daily_pnl(&transactions, now(), 180);
        assert_eq!(daily.len(), 1);
        // Second sell matches the remaining old lot at 100, not pure revenue
        assert_abs_diff_eq!(*daily.values().next().unwrap(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_history() {
        assert!(realized_daily_pnl(&[], now(), 180).is_empty());
    }

    #[test]
    fn test_oversized_window_reports_all_days() {
        let transactions = vec![
            Transaction::buy(at(500, 8), 34, "Tritanium", 5.0, 100),
            Transaction::sell(at(499, 8), 34, "Tritanium", 6.0, 100),
            Transaction::buy(at(2, 8), 34, "Tritanium", 5.0, 100),
            Transaction::sell(at(1, 8), 34, "Tritanium", 4.0, 100),
        ];
        let daily = realized_daily_pnl(&transactions, now(), i64::MAX / 2);
        assert_eq!(daily.len(), 2);
        assert_abs_diff_eq!(daily.values().sum::<f64>(), 0.0, epsilon = 1e-9);
    }
}
