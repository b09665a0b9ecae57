use serde::Deserialize;
use serde_json::Value;

use super::wire::{field, value_number, value_text};

/// An executed trade as shown in the trade feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// Raw timestamp text (RFC 3339, epoch millis, or anything else).
    pub timestamp: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    /// Free-form info / side string.
    pub info: String,
}

/// Trade list snapshot: a bare array or an object wrapping `trades`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct TradesSnapshot {
    pub trades: Vec<Trade>,
}

impl TradesSnapshot {
    /// Keep at most `max` trades, in server order.
    pub fn truncate(mut self, max: usize) -> Vec<Trade> {
        self.trades.truncate(max);
        self.trades
    }
}

impl From<Value> for TradesSnapshot {
    fn from(wire: Value) -> Self {
        let rows = match &wire {
            Value::Array(rows) => rows.as_slice(),
            other => match field(other, &["trades"], None) {
                Some(Value::Array(rows)) => rows.as_slice(),
                _ => &[],
            },
        };
        Self {
            trades: rows.iter().map(normalize_trade).collect(),
        }
    }
}

fn normalize_trade(t: &Value) -> Trade {
    Trade {
        timestamp: field(t, &["ts", "time", "timestamp"], None).map(|v| value_text(Some(v))),
        price: value_number(field(t, &["price", "p"], None)),
        quantity: value_number(field(t, &["qty", "q", "quantity"], None)),
        info: value_text(field(t, &["info", "side", "meta"], None)),
    }
}
