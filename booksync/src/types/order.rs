use serde::Serialize;
use serde_json::Value;

use super::enums::OrderSide;

/// Body of `POST /api/order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
}

/// Body of `POST /api/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub order_id: String,
}

/// Response to an accepted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderAck {
    /// `orderId`, else `id`.
    pub order_id: Option<String>,
    pub message: Option<String>,
}

/// Response to a processed cancel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelAck {
    pub message: Option<String>,
}

impl OrderAck {
    /// Read an acknowledgement from whatever JSON the server sent.
    /// Missing or oddly-typed fields are treated as absent.
    pub fn from_value(value: &Value) -> Self {
        Self {
            order_id: text_field(value, "orderId").or_else(|| text_field(value, "id")),
            message: text_field(value, "message"),
        }
    }
}

impl CancelAck {
    pub fn from_value(value: &Value) -> Self {
        Self {
            message: text_field(value, "message"),
        }
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
