use serde::Deserialize;
use serde_json::Value;

use super::enums::Side;
use super::wire::{as_count, field, value_number, value_text};

/// An individual order waiting at a level.
#[derive(Debug, Clone, PartialEq)]
pub struct RestingOrder {
    pub order_id: String,
    pub quantity: Option<f64>,
}

/// An aggregated price point.
///
/// `orders`, when present, is in FIFO order: index 0 is the head (oldest).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: Option<f64>,
    /// Resting-order count; `None` when the server did not say.
    pub count: Option<u64>,
    pub orders: Option<Vec<RestingOrder>>,
}

impl PriceLevel {
    /// Resting orders, or an empty slice when the level carries none.
    pub fn resting(&self) -> &[RestingOrder] {
        self.orders.as_deref().unwrap_or(&[])
    }
}

/// Full book snapshot, normalized from any of the accepted wire shapes.
///
/// Accepted shapes: `{bids, asks}`, `{bidLevels, askLevels}`, `{buy, sell}`;
/// each level either an object (`price|p`, `qty|quantity|q`, `count`,
/// `nOrders`, `orders`) or a positional `[price, qty, count]` triple. When a
/// field is sent under several names the first present one wins. Levels
/// without a usable price are dropped; the rest of the snapshot is kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct BookSnapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl BookSnapshot {
    pub fn side(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bids => &self.bids,
            Side::Asks => &self.asks,
        }
    }

    pub fn into_sides(self) -> (Vec<PriceLevel>, Vec<PriceLevel>) {
        (self.bids, self.asks)
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

impl From<Value> for BookSnapshot {
    fn from(wire: Value) -> Self {
        Self {
            bids: normalize_levels(field(&wire, &["bids", "bidLevels", "buy"], None)),
            asks: normalize_levels(field(&wire, &["asks", "askLevels", "sell"], None)),
        }
    }
}

fn normalize_levels(levels: Option<&Value>) -> Vec<PriceLevel> {
    let Some(Value::Array(levels)) = levels else {
        return Vec::new();
    };
    levels
        .iter()
        .filter_map(|level| {
            let normalized = normalize_level(level);
            if normalized.is_none() {
                tracing::debug!(level = %level, "dropping book level without a usable price");
            }
            normalized
        })
        .collect()
}

fn normalize_level(level: &Value) -> Option<PriceLevel> {
    let price = value_number(field(level, &["price", "p"], Some(0)))?;
    let orders: Option<Vec<RestingOrder>> = match level.get("orders") {
        Some(Value::Array(orders)) => Some(orders.iter().map(normalize_order).collect()),
        _ => None,
    };
    // count, else the ladder length, else nOrders / slot 2.
    let count = match field(level, &["count"], None) {
        Some(count) => value_number(Some(count)).and_then(as_count),
        None => orders.as_ref().map(|o| o.len() as u64).or_else(|| {
            value_number(field(level, &["nOrders"], Some(2))).and_then(as_count)
        }),
    };
    Some(PriceLevel {
        price,
        quantity: value_number(field(level, &["qty", "quantity", "q"], Some(1))),
        count,
        orders,
    })
}

fn normalize_order(order: &Value) -> RestingOrder {
    RestingOrder {
        order_id: value_text(field(order, &["orderId", "id"], Some(0))),
        quantity: value_number(field(order, &["qty", "quantity", "q"], Some(1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_levels_with_orders() {
        let json = r#"{
            "bids": [
                {"price": 100.5, "qty": 12, "orders": [
                    {"orderId": "a1", "qty": 5},
                    {"orderId": "a2", "qty": 7}
                ]}
            ],
            "asks": [{"price": 101, "qty": 3, "count": 1}]
        }"#;
        let book: BookSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.bids[0].price, 100.5);
        assert_eq!(book.bids[0].count, Some(2));
        let ladder = book.bids[0].resting();
        assert_eq!(ladder[0].order_id, "a1");
        assert_eq!(ladder[1].quantity, Some(7.0));
        assert_eq!(book.asks[0].count, Some(1));
        assert!(book.asks[0].orders.is_none());
    }

    #[test]
    fn alternate_side_names() {
        let book: BookSnapshot =
            serde_json::from_str(r#"{"bidLevels": [[10, 1, 1]], "sell": [{"p": "11", "q": "2"}]}"#)
                .unwrap();
        assert_eq!(book.bids[0].price, 10.0);
        assert_eq!(book.asks[0].price, 11.0);
        assert_eq!(book.asks[0].quantity, Some(2.0));

        let book: BookSnapshot =
            serde_json::from_str(r#"{"buy": [[9, 4]], "askLevels": []}"#).unwrap();
        assert_eq!(book.bids[0].price, 9.0);
        assert_eq!(book.bids[0].count, None);
        assert!(book.asks.is_empty());
    }

    #[test]
    fn positional_triple() {
        let book: BookSnapshot = serde_json::from_str(r#"{"bids": [[10.5, 3, 2]]}"#).unwrap();
        let level = &book.bids[0];
        assert_eq!(level.price, 10.5);
        assert_eq!(level.quantity, Some(3.0));
        assert_eq!(level.count, Some(2));
        assert!(book.asks.is_empty());
    }

    #[test]
    fn count_falls_back_to_n_orders() {
        let book: BookSnapshot =
            serde_json::from_str(r#"{"bids": [{"price": 1, "quantity": 2, "nOrders": 4}]}"#).unwrap();
        assert_eq!(book.bids[0].count, Some(4));
    }

    #[test]
    fn positional_orders_and_numeric_ids() {
        let book: BookSnapshot = serde_json::from_str(
            r#"{"asks": [{"price": 5, "orders": [["x", 1], {"id": 42, "quantity": 2}]}]}"#,
        )
        .unwrap();
        let ladder = book.asks[0].resting();
        assert_eq!(ladder[0].order_id, "x");
        assert_eq!(ladder[0].quantity, Some(1.0));
        assert_eq!(ladder[1].order_id, "42");
        assert_eq!(ladder[1].quantity, Some(2.0));
    }

    #[test]
    fn levels_without_price_are_dropped() {
        let book: BookSnapshot =
            serde_json::from_str(r#"{"bids": [{"qty": 1}, {"price": 2, "qty": 1}], "asks": null}"#)
                .unwrap();
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.bids[0].price, 2.0);
        assert!(book.asks.is_empty());
    }

    #[test]
    fn fifo_order_is_preserved() {
        let book: BookSnapshot = serde_json::from_str(
            r#"{"bids": [{"price": 1, "orders": [
                {"orderId": "c", "qty": 1}, {"orderId": "a", "qty": 1}, {"orderId": "b", "qty": 1}
            ]}]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = book.bids[0].resting().iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicate_names_resolve_to_the_first_present() {
        let book: BookSnapshot = serde_json::from_str(
            r#"{"bids": [{"price": 10.5, "p": 99, "qty": 1, "q": 7, "orders": [
                {"orderId": "a", "id": "z", "qty": 1, "quantity": 4}
            ]}]}"#,
        )
        .unwrap();
        let level = &book.bids[0];
        assert_eq!(level.price, 10.5);
        assert_eq!(level.quantity, Some(1.0));
        assert_eq!(level.resting()[0].order_id, "a");
        assert_eq!(level.resting()[0].quantity, Some(1.0));
    }

    #[test]
    fn one_bad_level_keeps_the_rest() {
        let book: BookSnapshot = serde_json::from_str(
            r#"{"bids": [{"price": true, "qty": 1}, "junk", 7, {"price": 3, "qty": 1}],
                "asks": [{"price": 2, "qty": 1}]}"#,
        )
        .unwrap();
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.bids[0].price, 3.0);
        assert_eq!(book.asks.len(), 1);
        assert_eq!(book.asks[0].price, 2.0);
    }

    #[test]
    fn null_side_falls_through_to_alternate_name() {
        let book: BookSnapshot =
            serde_json::from_str(r#"{"bids": null, "bidLevels": [[4, 1]], "asks": "nope"}"#).unwrap();
        assert_eq!(book.bids[0].price, 4.0);
        assert!(book.asks.is_empty());
    }
}
