pub mod enums;
pub mod order;
pub mod orderbook;
pub mod trade;
mod wire;

pub use enums::{ConnectionState, Control, Indicator, OrderSide, RefreshReason, Side, Tone};
pub use order::{CancelAck, CancelRequest, OrderAck, OrderRequest};
pub use orderbook::{BookSnapshot, PriceLevel, RestingOrder};
pub use trade::{Trade, TradesSnapshot};
