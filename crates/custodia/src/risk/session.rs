//! Per-account session counters
//!
//! Three running observations feed the drawdown, daily-loss, and
//! trade-frequency evaluators: a monotonic equity peak, realized PnL since
//! the session opened, and the timestamps of recently accepted orders.
//! Sessions roll at 00:00 UTC. All methods take `now` explicitly so tests
//! control the clock.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::time::Duration;

/// Mutable counters for one account, guarded by the engine's per-account
/// lock.
#[derive(Debug, Clone)]
pub struct SessionStats {
    session_date: NaiveDate,
    peak_equity: Decimal,
    realized_pnl: Decimal,
    accepted_orders: VecDeque<DateTime<Utc>>,
    orders_today: u32,
}

/// Immutable view handed to the evaluators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub peak_equity: Decimal,
    pub realized_pnl: Decimal,
    /// Accepted orders inside the rolling window.
    pub recent_orders: u32,
    /// Accepted orders since 00:00 UTC.
    pub orders_today: u32,
}

impl SessionStats {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            session_date: now.date_naive(),
            peak_equity: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            accepted_orders: VecDeque::new(),
            orders_today: 0,
        }
    }

    /// Reset daily counters when the UTC date has advanced. The rolling
    /// order window survives the roll; it is pruned by age, not by date.
    fn roll(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != self.session_date {
            self.session_date = today;
            self.realized_pnl = Decimal::ZERO;
            self.orders_today = 0;
        }
    }

    fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        let window = ChronoDuration::from_std(window).unwrap_or(ChronoDuration::zero());
        let cutoff = now - window;
        while let Some(front) = self.accepted_orders.front() {
            if *front <= cutoff {
                self.accepted_orders.pop_front();
            } else {
                break;
            }
        }
    }

    /// Raise the equity peak; it never goes back down within a process.
    pub fn observe_equity(&mut self, now: DateTime<Utc>, equity: Decimal) {
        self.roll(now);
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
    }

    pub fn record_realized_pnl(&mut self, now: DateTime<Utc>, delta: Decimal) {
        self.roll(now);
        self.realized_pnl += delta;
    }

    /// Register an accepted order in both the rolling window and the daily
    /// counter.
    pub fn record_accepted_order(&mut self, now: DateTime<Utc>) {
        self.roll(now);
        self.accepted_orders.push_back(now);
        self.orders_today = self.orders_today.saturating_add(1);
    }

    pub fn snapshot(&mut self, now: DateTime<Utc>, window: Duration) -> SessionSnapshot {
        self.roll(now);
        self.prune(now, window);
        SessionSnapshot {
            peak_equity: self.peak_equity,
            realized_pnl: self.realized_pnl,
            recent_orders: self.accepted_orders.len() as u32,
            orders_today: self.orders_today,
        }
    }
}
