//! Renderer contract and the pure row layout shared by every renderer.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::types::{Control, Indicator, PriceLevel, RefreshReason, Side, Tone, Trade};
use crate::utils;
use crate::view_state::{ExpandedKeySet, LevelKey};

/// Text shown for an empty table.
pub const EMPTY_ROW: &str = "—";
pub const BOOK_FAILED: &str = "Book snapshot failed";
pub const TRADES_FAILED: &str = "Trades snapshot failed";
/// Heading of a resting-order ladder.
pub const LADDER_HEADING: &str = "Head → Tail";

/// Outcome of one status check, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub tone: Tone,
    pub label: String,
}

impl CheckReport {
    pub fn new(tone: Tone, label: impl Into<String>) -> Self {
        Self {
            tone,
            label: label.into(),
        }
    }
}

/// Message attached to a user control after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub ok: bool,
    pub text: String,
}

impl Feedback {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: text.into(),
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: text.into(),
        }
    }

    pub fn tone(&self) -> Tone {
        if self.ok {
            Tone::Ok
        } else {
            Tone::Bad
        }
    }
}

/// Progress of a reconciliation pass.
///
/// Displays as `HH:MM:SS (reason)` while running and
/// `HH:MM:SS (reason, Nms)` once finished.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshStatus {
    pub reason: RefreshReason,
    pub at: DateTime<Local>,
    pub elapsed: Option<Duration>,
}

impl RefreshStatus {
    pub fn started(reason: RefreshReason, at: DateTime<Local>) -> Self {
        Self {
            reason,
            at,
            elapsed: None,
        }
    }

    pub fn finished(reason: RefreshReason, at: DateTime<Local>, elapsed: Duration) -> Self {
        Self {
            reason,
            at,
            elapsed: Some(elapsed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.elapsed.is_none()
    }
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = utils::clock(&self.at);
        match self.elapsed {
            None => write!(f, "{clock} ({})", self.reason),
            Some(elapsed) => write!(f, "{clock} ({}, {}ms)", self.reason, elapsed.as_millis()),
        }
    }
}

/// One row of a side table.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelRow {
    /// The side has no levels.
    Placeholder,
    /// The last book fetch failed.
    Failed,
    /// Aggregate summary of a price level.
    Level {
        key: LevelKey,
        price: f64,
        quantity: Option<f64>,
        count: Option<u64>,
    },
    /// A resting order; `rank` 1 is the head of the queue.
    Order {
        key: LevelKey,
        rank: usize,
        order_id: String,
        quantity: Option<f64>,
    },
    /// Expand/collapse control under a long ladder.
    Toggle {
        key: LevelKey,
        expanded: bool,
        hidden: usize,
    },
}

impl LevelRow {
    /// Order id for rows that offer a copy action.
    pub fn copyable_id(&self) -> Option<&str> {
        match self {
            LevelRow::Order { order_id, .. } if !order_id.is_empty() => Some(order_id),
            _ => None,
        }
    }

    pub fn toggle_label(&self) -> Option<String> {
        match self {
            LevelRow::Toggle { expanded: true, .. } => Some("Show less".to_string()),
            LevelRow::Toggle { hidden, .. } => Some(format!("Show {hidden} more")),
            _ => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, LevelRow::Toggle { .. }) || self.copyable_id().is_some()
    }
}

/// One row of the trade table.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeRow {
    Placeholder,
    Failed,
    Trade(Trade),
}

/// Display target for a live book session.
///
/// Methods are called with the board lock held and must not block.
pub trait Renderer: Send + 'static {
    fn indicator(&mut self, which: Indicator, report: &CheckReport);
    fn connected_clients(&mut self, clients: Option<u64>);
    fn last_push(&mut self, at: DateTime<Local>);
    fn refresh_status(&mut self, status: &RefreshStatus);
    fn levels(&mut self, side: Side, rows: &[LevelRow]);
    fn trades(&mut self, rows: &[TradeRow]);
    fn feedback(&mut self, control: Control, feedback: Option<&Feedback>);
    fn control_enabled(&mut self, control: Control, enabled: bool);
    fn prefill_cancel(&mut self, order_id: &str);
}

/// Lay out one side of the book.
///
/// Each level yields a summary row. Levels with resting orders follow it
/// with up to `visible` order rows in FIFO order (all of them when the level
/// is expanded) and, when the ladder is longer than `visible`, a toggle row.
pub fn layout_levels(
    side: Side,
    levels: &[PriceLevel],
    expanded: &ExpandedKeySet,
    visible: usize,
) -> Vec<LevelRow> {
    if levels.is_empty() {
        return vec![LevelRow::Placeholder];
    }

    let mut rows = Vec::with_capacity(levels.len());
    for level in levels {
        let key = LevelKey::new(side, level.price);
        rows.push(LevelRow::Level {
            key,
            price: level.price,
            quantity: level.quantity,
            count: level.count,
        });

        let ladder = level.resting();
        if ladder.is_empty() {
            continue;
        }

        let is_expanded = expanded.is_expanded(&key);
        let shown = if is_expanded {
            ladder.len()
        } else {
            ladder.len().min(visible)
        };
        rows.extend(ladder[..shown].iter().enumerate().map(|(i, order)| LevelRow::Order {
            key,
            rank: i + 1,
            order_id: order.order_id.clone(),
            quantity: order.quantity,
        }));

        if ladder.len() > visible {
            rows.push(LevelRow::Toggle {
                key,
                expanded: is_expanded,
                hidden: ladder.len() - visible,
            });
        }
    }
    rows
}

/// Lay out the trade feed, keeping at most `max` rows.
pub fn layout_trades(trades: &[Trade], max: usize) -> Vec<TradeRow> {
    if trades.is_empty() {
        return vec![TradeRow::Placeholder];
    }
    trades
        .iter()
        .take(max)
        .cloned()
        .map(TradeRow::Trade)
        .collect()
}
