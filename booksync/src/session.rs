//! Session controller: wires the poller, push channel, scheduler,
//! reconciler and order desk around one shared board.

use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::board::{Board, SharedBoard};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::orders::OrderDesk;
use crate::poller::StatusPoller;
use crate::reconcile::Reconciler;
use crate::render::{CheckReport, Feedback, Renderer};
use crate::rest::BookHttpClient;
use crate::scheduler::RefreshScheduler;
use crate::types::{
    CancelAck, ConnectionState, Control, Indicator, OrderAck, OrderSide, RefreshReason,
};
use crate::view_state::LevelKey;
use crate::ws::{PushChannel, PushEvent, PushHandle};

pub const COPIED_TEXT: &str = "Order ID copied and prefilled for cancel.";

/// Destination for copied order ids.
pub trait Clipboard {
    /// Copy `text`, returning `true` on success.
    fn copy(&mut self, text: &str) -> bool;
}

/// An open push channel and the task forwarding its events.
struct PushLink {
    handle: PushHandle,
    pump: CancellationToken,
}

impl PushLink {
    fn close(&self) {
        self.handle.close();
        self.pump.cancel();
    }
}

/// A live book session around one renderer.
///
/// Cheap to clone; every clone drives the same board.
pub struct Session<R: Renderer> {
    config: Arc<SyncConfig>,
    client: BookHttpClient,
    board: SharedBoard<R>,
    reconciler: Arc<Reconciler<R>>,
    scheduler: RefreshScheduler<Reconciler<R>>,
    desk: Arc<OrderDesk<R>>,
    push: Arc<Mutex<Option<PushLink>>>,
    cancel: CancellationToken,
}

impl<R: Renderer> Clone for Session<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            client: self.client.clone(),
            board: Arc::clone(&self.board),
            reconciler: Arc::clone(&self.reconciler),
            scheduler: self.scheduler.clone(),
            desk: Arc::clone(&self.desk),
            push: Arc::clone(&self.push),
            cancel: self.cancel.clone(),
        }
    }
}

impl<R: Renderer> Session<R> {
    pub fn new(config: SyncConfig, renderer: R, cancel: CancellationToken) -> Self {
        let client = BookHttpClient::new(&config.base_url);
        let board = Board::new(renderer, config.visible_orders).shared();
        let reconciler = Arc::new(Reconciler::new(
            client.clone(),
            Arc::clone(&board),
            config.max_trades,
        ));
        let scheduler =
            RefreshScheduler::new(Arc::clone(&reconciler), config.refresh_debounce, cancel.clone());
        let desk = Arc::new(OrderDesk::new(client.clone(), Arc::clone(&reconciler)));

        Self {
            config: Arc::new(config),
            client,
            board,
            reconciler,
            scheduler,
            desk,
            push: Arc::new(Mutex::new(None)),
            cancel,
        }
    }

    /// Start every background task and the boot reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error only if the push channel cannot be constructed. The
    /// push indicator shows the failure and the other tasks keep running.
    pub fn start(&self) -> Result<()> {
        info!(base_url = %self.config.base_url, "starting book session");

        let poller = StatusPoller::new(
            self.client.clone(),
            Arc::clone(&self.board),
            self.config.status_poll_interval,
        );
        tokio::spawn(poller.run(self.cancel.clone()));

        if let Some(period) = self.config.snapshot_poll {
            let scheduler = self.scheduler.clone();
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                let start = tokio::time::Instant::now() + period;
                let mut ticker = tokio::time::interval_at(start, period);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            scheduler.request_refresh(RefreshReason::Poll);
                        }
                    }
                }
            });
        }

        let reconciler = Arc::clone(&self.reconciler);
        tokio::spawn(async move { reconciler.run(RefreshReason::Boot).await });

        self.reconnect_push()
    }

    /// Tear down the current push channel (if any) and open a fresh one.
    pub fn reconnect_push(&self) -> Result<()> {
        if let Some(old) = self.push.lock().take() {
            old.close();
        }

        let url = match self.config.push_url() {
            Ok(url) => url,
            Err(e) => {
                warn!("cannot derive push url: {e}");
                let state = ConnectionState::FailedNoRetry;
                self.board
                    .lock()
                    .renderer_mut()
                    .indicator(Indicator::Push, &CheckReport::new(state.tone(), state.label()));
                return Err(e);
            }
        };

        let (channel, events) = PushChannel::new(url, self.config.reconnect_delay);
        let pump = self.spawn_pump(events);
        let handle = channel.connect(pump.clone())?;
        *self.push.lock() = Some(PushLink { handle, pump });
        Ok(())
    }

    /// Forward `events` until the returned token (a child of the session
    /// token) is cancelled or the channel is dropped.
    fn spawn_pump(&self, events: mpsc::UnboundedReceiver<PushEvent>) -> CancellationToken {
        let cancel = self.cancel.child_token();
        tokio::spawn(pump(
            events,
            Arc::clone(&self.board),
            self.scheduler.clone(),
            cancel.clone(),
        ));
        cancel
    }

    /// Ask for a debounced reconciliation. Returns `true` if this call
    /// armed the timer.
    pub fn request_refresh(&self, reason: RefreshReason) -> bool {
        self.scheduler.request_refresh(reason)
    }

    /// Flip a level's expanded state and redraw its side.
    pub fn toggle_level(&self, key: LevelKey) -> bool {
        self.board.lock().toggle(&key)
    }

    /// Copy an order id and, on success, prefill it for cancellation.
    pub fn copy_order_id(&self, clipboard: &mut impl Clipboard, order_id: &str) -> bool {
        if order_id.is_empty() || !clipboard.copy(order_id) {
            return false;
        }
        let mut board = self.board.lock();
        let renderer = board.renderer_mut();
        renderer.prefill_cancel(order_id);
        renderer.feedback(Control::Cancel, Some(&Feedback::ok(COPIED_TEXT)));
        true
    }

    pub async fn submit_order(&self, side: OrderSide, price: &str, quantity: &str) -> Result<OrderAck> {
        self.desk.submit(side, price, quantity).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelAck> {
        self.desk.cancel(order_id).await
    }

    pub fn board(&self) -> &SharedBoard<R> {
        &self.board
    }

    pub fn client(&self) -> &BookHttpClient {
        &self.client
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Stop every background task.
    pub fn shutdown(&self) {
        debug!("book session shutting down");
        self.cancel.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Forward push events to the board and the scheduler.
async fn pump<R: Renderer>(
    mut events: mpsc::UnboundedReceiver<PushEvent>,
    board: SharedBoard<R>,
    scheduler: RefreshScheduler<Reconciler<R>>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };
        match event {
            Some(PushEvent::Status(state)) => {
                board
                    .lock()
                    .renderer_mut()
                    .indicator(Indicator::Push, &CheckReport::new(state.tone(), state.label()));
            }
            Some(PushEvent::Notified) => {
                board.lock().renderer_mut().last_push(Local::now());
                scheduler.request_refresh(RefreshReason::Push);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::DateTime;

    use crate::render::{LevelRow, RefreshStatus, TradeRow};
    use crate::types::Side;

    /// Keeps the push indicator labels, drops everything else.
    #[derive(Default)]
    struct PushLabels(Vec<String>);

    impl Renderer for PushLabels {
        fn indicator(&mut self, which: Indicator, report: &CheckReport) {
            if which == Indicator::Push {
                self.0.push(report.label.clone());
            }
        }
        fn connected_clients(&mut self, _: Option<u64>) {}
        fn last_push(&mut self, _: DateTime<Local>) {}
        fn refresh_status(&mut self, _: &RefreshStatus) {}
        fn levels(&mut self, _: Side, _: &[LevelRow]) {}
        fn trades(&mut self, _: &[TradeRow]) {}
        fn feedback(&mut self, _: Control, _: Option<&Feedback>) {}
        fn control_enabled(&mut self, _: Control, _: bool) {}
        fn prefill_cancel(&mut self, _: &str) {}
    }

    fn labels(session: &Session<PushLabels>) -> Vec<String> {
        session.board().lock().renderer().0.clone()
    }

    #[tokio::test]
    async fn cancelled_pump_drops_queued_events() {
        let config = SyncConfig::new("http://127.0.0.1:9");
        let session = Session::new(config, PushLabels::default(), CancellationToken::new());

        let (old_tx, old_rx) = mpsc::unbounded_channel();
        let old = session.spawn_pump(old_rx);
        old_tx.send(PushEvent::Status(ConnectionState::Connected)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(labels(&session), vec!["Connected"]);

        old.cancel();
        let (new_tx, new_rx) = mpsc::unbounded_channel();
        let _new = session.spawn_pump(new_rx);
        // the old channel is still open and keeps reporting
        let _ = old_tx.send(PushEvent::Status(ConnectionState::DisconnectedRetrying));
        new_tx.send(PushEvent::Status(ConnectionState::Connecting)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(labels(&session), vec!["Connected", "Connecting…"]);
        session.shutdown();
    }
}
