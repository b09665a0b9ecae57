use chrono::Local;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::board::SharedBoard;
use crate::render::{RefreshStatus, Renderer};
use crate::rest::BookHttpClient;
use crate::scheduler::Reconcile;
use crate::types::RefreshReason;

/// Fetches fresh book and trade snapshots and redraws the board.
///
/// Passes are not sequenced against each other: if two overlap, whichever
/// finishes last wins.
pub struct Reconciler<R> {
    client: BookHttpClient,
    board: SharedBoard<R>,
    max_trades: usize,
}

impl<R: Renderer> Reconciler<R> {
    pub fn new(client: BookHttpClient, board: SharedBoard<R>, max_trades: usize) -> Self {
        Self {
            client,
            board,
            max_trades,
        }
    }

    /// Run one pass. Book and trades are fetched concurrently and each
    /// outcome is applied on its own; neither failure affects the other.
    pub async fn run(&self, reason: RefreshReason) {
        let started = Instant::now();
        let at = Local::now();
        self.board
            .lock()
            .renderer_mut()
            .refresh_status(&RefreshStatus::started(reason, at));

        let book = async {
            match self.client.get_book().await {
                Ok(book) => {
                    self.board.lock().apply_book(book);
                }
                Err(e) => {
                    warn!(%reason, "book snapshot failed: {e}");
                    self.board.lock().book_failed();
                }
            }
        };
        let trades = async {
            match self.client.get_trades(self.max_trades).await {
                Ok(snapshot) => {
                    let trades = snapshot.truncate(self.max_trades);
                    self.board.lock().apply_trades(&trades, self.max_trades);
                }
                Err(e) => {
                    warn!(%reason, "trades snapshot failed: {e}");
                    self.board.lock().trades_failed();
                }
            }
        };
        tokio::join!(book, trades);

        let elapsed = started.elapsed();
        debug!(%reason, elapsed_ms = elapsed.as_millis() as u64, "reconciled");
        self.board
            .lock()
            .renderer_mut()
            .refresh_status(&RefreshStatus::finished(reason, Local::now(), elapsed));
    }

    pub fn board(&self) -> &SharedBoard<R> {
        &self.board
    }
}

impl<R: Renderer> Reconcile for Reconciler<R> {
    async fn reconcile(&self, reason: RefreshReason) {
        self.run(reason).await;
    }
}
