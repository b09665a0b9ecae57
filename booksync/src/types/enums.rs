use serde::{Deserialize, Serialize};

/// One side of the rendered book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bids,
    Asks,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Bids, Side::Asks];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Bids => "bids",
            Side::Asks => "asks",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a submitted order, as the order endpoint spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn flip(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" | "B" | "BID" => Ok(OrderSide::Buy),
            "SELL" | "S" | "ASK" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side: {other}")),
        }
    }
}

/// Why a reconciliation pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshReason {
    Boot,
    Poll,
    Order,
    Cancel,
    Push,
}

impl std::fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshReason::Boot => write!(f, "boot"),
            RefreshReason::Poll => write!(f, "poll"),
            RefreshReason::Order => write!(f, "order"),
            RefreshReason::Cancel => write!(f, "cancel"),
            RefreshReason::Push => write!(f, "push"),
        }
    }
}

/// Severity of an indicator: drives colour in every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Ok,
    Warn,
    Bad,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Ok => "ok",
            Tone::Warn => "warn",
            Tone::Bad => "bad",
        }
    }
}

/// Lifecycle of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    DisconnectedRetrying,
    ErrorRetrying,
    FailedNoRetry,
}

impl ConnectionState {
    pub fn tone(self) -> Tone {
        match self {
            ConnectionState::Connected => Tone::Ok,
            ConnectionState::Connecting
            | ConnectionState::DisconnectedRetrying
            | ConnectionState::ErrorRetrying => Tone::Warn,
            ConnectionState::FailedNoRetry => Tone::Bad,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting…",
            ConnectionState::Connected => "Connected",
            ConnectionState::DisconnectedRetrying => "Disconnected (retrying)",
            ConnectionState::ErrorRetrying => "Error (retrying)",
            ConnectionState::FailedNoRetry => "WS init failed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Status indicators shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Health,
    Ready,
    Push,
}

impl Indicator {
    pub fn as_str(self) -> &'static str {
        match self {
            Indicator::Health => "health",
            Indicator::Ready => "ready",
            Indicator::Push => "push",
        }
    }
}

/// User controls that carry feedback and an enabled flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Order,
    Cancel,
}

impl Control {
    pub fn as_str(self) -> &'static str {
        match self {
            Control::Order => "order",
            Control::Cancel => "cancel",
        }
    }
}
