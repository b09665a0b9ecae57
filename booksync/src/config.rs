//! Session configuration.

use std::time::Duration;

use url::Url;

use crate::error::{Result, SyncError};

/// Path of the push channel relative to the server root.
pub const PUSH_PATH: &str = "/ws";

/// All tuneable parameters for a live book session.
///
/// Use [`SyncConfig::new`] with the server base URL; every other field has
/// a default matching the stock dashboard.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the book server (e.g. `http://127.0.0.1:8080`).
    pub base_url: String,
    /// Explicit push channel URL. Derived from `base_url` when `None`.
    pub push_url: Option<String>,
    /// Interval between status checks.
    pub status_poll_interval: Duration,
    /// Debounce window for coalescing refresh requests.
    pub refresh_debounce: Duration,
    /// Maximum number of trades requested and rendered.
    pub max_trades: usize,
    /// Fixed delay before every reconnect attempt.
    pub reconnect_delay: Duration,
    /// Resting orders shown per level before the "Show N more" toggle.
    pub visible_orders: usize,
    /// Optional periodic snapshot refresh, tagged `poll`.
    pub snapshot_poll: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            push_url: None,
            status_poll_interval: Duration::from_millis(2000),
            refresh_debounce: Duration::from_millis(120),
            max_trades: 25,
            reconnect_delay: Duration::from_millis(800),
            visible_orders: 5,
            snapshot_poll: None,
        }
    }
}

impl SyncConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Resolve the push channel URL.
    ///
    /// An explicit `push_url` wins. Otherwise the base URL's scheme is mapped
    /// `http -> ws`, `https -> wss` and the path replaced with [`PUSH_PATH`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidUrl`] if the base URL does not parse or
    /// uses a scheme other than http(s)/ws(s).
    pub fn push_url(&self) -> Result<String> {
        if let Some(url) = &self.push_url {
            return Ok(url.clone());
        }

        let mut url = Url::parse(&self.base_url)?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => {
                return Err(SyncError::InvalidUrl(format!(
                    "unsupported scheme {other:?} in {}",
                    self.base_url
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| SyncError::InvalidUrl(format!("cannot rewrite scheme of {}", self.base_url)))?;
        url.set_path(PUSH_PATH);
        url.set_query(None);
        Ok(url.to_string())
    }

    /// `host[:port]` of the base URL, for display.
    pub fn host(&self) -> String {
        match Url::parse(&self.base_url) {
            Ok(url) => match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{host}:{port}"),
                (Some(host), None) => host.to_string(),
                _ => self.base_url.clone(),
            },
            Err(_) => self.base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_url_maps_http_to_ws() {
        let config = SyncConfig::new("http://localhost:8080/");
        assert_eq!(config.push_url().unwrap(), "ws://localhost:8080/ws");
    }

    #[test]
    fn push_url_maps_https_to_wss() {
        let config = SyncConfig::new("https://book.example.com/dashboard?x=1");
        assert_eq!(config.push_url().unwrap(), "wss://book.example.com/ws");
    }

    #[test]
    fn explicit_push_url_wins() {
        let mut config = SyncConfig::new("http://localhost:8080");
        config.push_url = Some("ws://elsewhere:9000/stream".into());
        assert_eq!(config.push_url().unwrap(), "ws://elsewhere:9000/stream");
    }

    #[test]
    fn push_url_rejects_unknown_scheme() {
        let config = SyncConfig::new("ftp://localhost");
        assert!(matches!(config.push_url(), Err(SyncError::InvalidUrl(_))));
    }

    #[test]
    fn host_includes_port() {
        assert_eq!(SyncConfig::new("http://127.0.0.1:8080").host(), "127.0.0.1:8080");
        assert_eq!(SyncConfig::new("https://book.example.com").host(), "book.example.com");
    }

    #[test]
    fn defaults_match_dashboard() {
        let config = SyncConfig::default();
        assert_eq!(config.status_poll_interval, Duration::from_millis(2000));
        assert_eq!(config.refresh_debounce, Duration::from_millis(120));
        assert_eq!(config.max_trades, 25);
        assert_eq!(config.reconnect_delay, Duration::from_millis(800));
        assert_eq!(config.visible_orders, 5);
        assert!(config.snapshot_poll.is_none());
    }
}
