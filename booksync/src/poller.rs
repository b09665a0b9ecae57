//! Periodic liveness, readiness and metrics checks.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::board::SharedBoard;
use crate::error::Result;
use crate::render::{CheckReport, Renderer};
use crate::rest::{BookHttpClient, TextResponse};
use crate::types::{Indicator, Tone};

/// Liveness: healthy iff the call succeeded and the trimmed body starts
/// with `O` (case-insensitive).
pub fn evaluate_liveness(outcome: &Result<TextResponse>) -> CheckReport {
    match outcome {
        Ok(resp) => {
            let text = resp.text.trim();
            if resp.ok && text.to_uppercase().starts_with('O') {
                CheckReport::new(Tone::Ok, "OK")
            } else {
                CheckReport::new(Tone::Bad, format!("FAIL ({text})"))
            }
        }
        Err(_) => CheckReport::new(Tone::Bad, "FAIL (unreachable)"),
    }
}

/// Readiness: ready iff the call succeeded and the trimmed body contains
/// `READY` (case-insensitive). `NOT_READY` therefore also counts as ready.
pub fn evaluate_readiness(outcome: &Result<TextResponse>) -> CheckReport {
    match outcome {
        Ok(resp) => {
            let text = resp.text.trim();
            if resp.ok && text.to_uppercase().contains("READY") {
                CheckReport::new(Tone::Ok, "READY")
            } else {
                CheckReport::new(Tone::Warn, text)
            }
        }
        Err(_) => CheckReport::new(Tone::Bad, "NOT READY (unreachable)"),
    }
}

/// Connected client count from a metrics scrape, if reachable and present.
pub fn evaluate_clients(outcome: &Result<TextResponse>) -> Option<u64> {
    outcome
        .as_ref()
        .ok()
        .and_then(|resp| parse_connected_clients(&resp.text))
}

/// Find the first `connected_clients <n>` line.
///
/// The metric name is matched case-insensitively, may be indented, and must
/// be followed by whitespace and a run of digits that ends the line or is
/// followed by more whitespace.
pub fn parse_connected_clients(metrics: &str) -> Option<u64> {
    const NAME: &str = "connected_clients";

    metrics.lines().find_map(|line| {
        let line = line.trim_start();
        let head = line.get(..NAME.len())?;
        if !head.eq_ignore_ascii_case(NAME) {
            return None;
        }
        let rest = &line[NAME.len()..];
        let value = rest.trim_start();
        if value.len() == rest.len() {
            return None;
        }
        let digits_end = value
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(value.len());
        if digits_end == 0 {
            return None;
        }
        let tail = &value[digits_end..];
        if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
            return None;
        }
        value[..digits_end].parse().ok()
    })
}

/// Liveness check, ready for display.
pub async fn check_health(client: &BookHttpClient) -> CheckReport {
    let outcome = client.get_health().await;
    if let Err(e) = &outcome {
        debug!("health check unreachable: {e}");
    }
    evaluate_liveness(&outcome)
}

/// Readiness check, ready for display.
pub async fn check_ready(client: &BookHttpClient) -> CheckReport {
    let outcome = client.get_ready().await;
    if let Err(e) = &outcome {
        debug!("ready check unreachable: {e}");
    }
    evaluate_readiness(&outcome)
}

/// Connected clients from `/metrics`.
pub async fn check_clients(client: &BookHttpClient) -> Option<u64> {
    let outcome = client.get_metrics().await;
    if let Err(e) = &outcome {
        debug!("metrics unreachable: {e}");
    }
    evaluate_clients(&outcome)
}

/// Runs the three status checks on a fixed interval.
pub struct StatusPoller<R> {
    client: BookHttpClient,
    board: SharedBoard<R>,
    interval: Duration,
}

impl<R: Renderer> StatusPoller<R> {
    pub fn new(client: BookHttpClient, board: SharedBoard<R>, interval: Duration) -> Self {
        Self {
            client,
            board,
            interval,
        }
    }

    /// Poll until `cancel` fires. The first round runs immediately.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("status poller stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("status poller stopped");
                    return;
                }
                _ = self.poll_once() => {}
            }
        }
    }

    /// One round of checks. Each result is rendered as soon as it arrives.
    pub async fn poll_once(&self) {
        let health = async {
            let report = check_health(&self.client).await;
            self.board
                .lock()
                .renderer_mut()
                .indicator(Indicator::Health, &report);
        };
        let ready = async {
            let report = check_ready(&self.client).await;
            self.board
                .lock()
                .renderer_mut()
                .indicator(Indicator::Ready, &report);
        };
        let clients = async {
            let clients = check_clients(&self.client).await;
            self.board.lock().renderer_mut().connected_clients(clients);
        };
        tokio::join!(health, ready, clients);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(ok: bool, body: &str) -> Result<TextResponse> {
        Ok(TextResponse {
            ok,
            status: if ok { 200 } else { 503 },
            text: body.to_string(),
        })
    }

    fn unreachable() -> Result<TextResponse> {
        Err(crate::SyncError::WebSocket("connection refused".into()))
    }

    #[test]
    fn liveness() {
        assert_eq!(evaluate_liveness(&text(true, " OK ")), CheckReport::new(Tone::Ok, "OK"));
        assert_eq!(evaluate_liveness(&text(true, "ok\n")).label, "OK");
        assert_eq!(
            evaluate_liveness(&text(true, "degraded")),
            CheckReport::new(Tone::Bad, "FAIL (degraded)")
        );
        assert_eq!(evaluate_liveness(&text(false, "OK")).label, "FAIL (OK)");
        assert_eq!(
            evaluate_liveness(&unreachable()),
            CheckReport::new(Tone::Bad, "FAIL (unreachable)")
        );
    }

    #[test]
    fn readiness() {
        assert_eq!(evaluate_readiness(&text(true, "ready")), CheckReport::new(Tone::Ok, "READY"));
        assert_eq!(
            evaluate_readiness(&text(true, " warming up ")),
            CheckReport::new(Tone::Warn, "warming up")
        );
        assert_eq!(evaluate_readiness(&text(true, "NOT_READY")).label, "READY");
        assert_eq!(evaluate_readiness(&text(false, "READY")).tone, Tone::Warn);
        assert_eq!(
            evaluate_readiness(&unreachable()),
            CheckReport::new(Tone::Bad, "NOT READY (unreachable)")
        );
    }

    #[test]
    fn connected_clients_line() {
        assert_eq!(parse_connected_clients("foo\nconnected_clients  7\nbar"), Some(7));
        assert_eq!(parse_connected_clients("  CONNECTED_CLIENTS\t12 "), Some(12));
        assert_eq!(parse_connected_clients("connected_clients 3\r\n"), Some(3));
    }

    #[test]
    fn connected_clients_no_match() {
        assert_eq!(parse_connected_clients("foo\nbar"), None);
        assert_eq!(parse_connected_clients("connected_clients7"), None);
        assert_eq!(parse_connected_clients("connected_clients 7x"), None);
        assert_eq!(parse_connected_clients("connected_clients_total 7"), None);
        assert_eq!(parse_connected_clients("connected_clients -1"), None);
        assert_eq!(parse_connected_clients("connected_clients 99999999999999999999999"), None);
    }

    #[test]
    fn first_matching_line_wins() {
        let metrics = "connected_clients x\nconnected_clients 4\nconnected_clients 9";
        assert_eq!(parse_connected_clients(metrics), Some(4));
    }

    #[test]
    fn clients_unknown_when_unreachable() {
        assert_eq!(evaluate_clients(&unreachable()), None);
        assert_eq!(evaluate_clients(&text(false, "connected_clients 2")), Some(2));
    }
}
