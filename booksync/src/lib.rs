pub mod board;
pub mod config;
pub mod error;
pub mod orders;
pub mod poller;
pub mod reconcile;
pub mod render;
pub mod rest;
pub mod scheduler;
pub mod session;
pub mod types;
pub mod utils;
pub mod view_state;
pub mod ws;

// ---- Top-level re-exports for ergonomic usage ----

// Session + config
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use session::{Clipboard, Session};

// REST client
pub use rest::{BookHttpClient, TextResponse};

// Core enums
pub use types::{ConnectionState, Control, Indicator, OrderSide, RefreshReason, Side, Tone};

// Snapshot types
pub use types::{BookSnapshot, PriceLevel, RestingOrder, Trade, TradesSnapshot};

// Order types
pub use types::{CancelAck, CancelRequest, OrderAck, OrderRequest};

// Rendering
pub use board::{Board, SharedBoard};
pub use render::{
    layout_levels, layout_trades, CheckReport, Feedback, LevelRow, RefreshStatus, Renderer,
    TradeRow,
};
pub use view_state::{ExpandedKeySet, LevelKey};

// Background pieces
pub use orders::{validate_order, OrderDesk};
pub use poller::StatusPoller;
pub use reconcile::Reconciler;
pub use scheduler::{Reconcile, RefreshScheduler};
pub use ws::{PushChannel, PushEvent, PushHandle};
