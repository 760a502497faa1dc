//! Simulated stock and fund quotes.

use std::sync::Arc;

use officesbx_domain::{Fund, MarketSnapshot, Stock};

use crate::infrastructure::clock::local_timestamp;
use crate::infrastructure::ports::{uniform, ClockPort, RandomPort};

/// (code, name, price range, max absolute percent change)
const STOCKS: &[(&str, &str, (f64, f64), f64)] = &[
    ("TECH001", "科技先锋", (80.0, 120.0), 5.0),
    ("FINA002", "金融稳健", (50.0, 70.0), 3.0),
    ("CONS003", "消费龙头", (100.0, 150.0), 4.0),
];

/// (code, name, nav range, max absolute percent change)
const FUNDS: &[(&str, &str, (f64, f64), f64)] = &[
    ("FUND001", "稳健理财A", (1.0, 1.5), 1.0),
    ("FUND002", "成长优选B", (0.8, 1.2), 2.0),
];

pub struct MarketTicker {
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl MarketTicker {
    pub fn new(clock: Arc<dyn ClockPort>, random: Arc<dyn RandomPort>) -> Self {
        Self { clock, random }
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        let random = self.random.as_ref();
        let quote = |(lo, hi): (f64, f64), swing: f64| {
            (uniform(random, lo, hi), round_to(uniform(random, -swing, swing), 2))
        };

        let stocks = STOCKS
            .iter()
            .map(|&(code, name, range, swing)| {
                let (price, change) = quote(range, swing);
                Stock {
                    code: code.to_string(),
                    name: name.to_string(),
                    price: round_to(price, 2),
                    change,
                }
            })
            .collect();

        let funds = FUNDS
            .iter()
            .map(|&(code, name, range, swing)| {
                let (nav, change) = quote(range, swing);
                Fund {
                    code: code.to_string(),
                    name: name.to_string(),
                    nav: round_to(nav, 4),
                    change,
                }
            })
            .collect();

        MarketSnapshot {
            stocks,
            funds,
            timestamp: local_timestamp(self.clock.now()),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom, SeededRandom};
    use crate::infrastructure::ports::MockClockPort;
    use chrono::{Local, TimeZone};

    fn fixed_clock() -> Arc<dyn ClockPort> {
        let now = Local
            .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .unwrap();
        Arc::new(FixedClock(now))
    }

    #[test]
    fn midpoint_quotes() {
        let ticker = MarketTicker::new(fixed_clock(), Arc::new(FixedRandom(0, 0.5)));
        let snapshot = ticker.snapshot();

        assert_eq!(snapshot.stocks.len(), 3);
        assert_eq!(snapshot.funds.len(), 2);
        assert_eq!(snapshot.stocks[0].code, "TECH001");
        assert_eq!(snapshot.stocks[0].price, 100.0);
        assert_eq!(snapshot.stocks[0].change, 0.0);
        assert_eq!(snapshot.funds[1].nav, 1.0);
        assert_eq!(snapshot.timestamp, "2025-03-14T09:30:00.000000");
    }

    #[test]
    fn quotes_stay_in_range_and_are_rounded() {
        let ticker = MarketTicker::new(fixed_clock(), Arc::new(SeededRandom::new(11)));
        for _ in 0..100 {
            let snapshot = ticker.snapshot();
            for (stock, &(_, _, (lo, hi), swing)) in snapshot.stocks.iter().zip(STOCKS) {
                assert!(stock.price >= lo && stock.price <= hi);
                assert!(stock.change.abs() <= swing);
                assert_eq!(stock.price, round_to(stock.price, 2));
            }
            for (fund, &(_, _, (lo, hi), _)) in snapshot.funds.iter().zip(FUNDS) {
                assert!(fund.nav >= lo && fund.nav <= hi);
                assert_eq!(fund.nav, round_to(fund.nav, 4));
            }
        }
    }

    #[test]
    fn reads_clock_once_per_snapshot() {
        let mut clock = MockClockPort::new();
        clock.expect_now().times(1).returning(Local::now);
        MarketTicker::new(Arc::new(clock), Arc::new(FixedRandom(0, 0.0))).snapshot();
    }
}
