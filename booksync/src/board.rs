use std::sync::Arc;

use parking_lot::Mutex;

use crate::render::{layout_levels, layout_trades, LevelRow, Renderer, TradeRow};
use crate::types::{BookSnapshot, PriceLevel, Side, Trade};
use crate::view_state::{ExpandedKeySet, LevelKey};

/// Board shared between the reconciler, the push pump and the UI.
pub type SharedBoard<R> = Arc<Mutex<Board<R>>>;

/// The render target plus the state needed to redraw it.
///
/// Holds the expanded-level set and the last successfully fetched levels so
/// a single side can be re-rendered after a toggle without refetching.
#[derive(Debug)]
pub struct Board<R> {
    expanded: ExpandedKeySet,
    bids: Option<Vec<PriceLevel>>,
    asks: Option<Vec<PriceLevel>>,
    visible_orders: usize,
    renderer: R,
}

impl<R: Renderer> Board<R> {
    pub fn new(renderer: R, visible_orders: usize) -> Self {
        Self {
            expanded: ExpandedKeySet::new(),
            bids: None,
            asks: None,
            visible_orders,
            renderer,
        }
    }

    pub fn shared(self) -> SharedBoard<R> {
        Arc::new(Mutex::new(self))
    }

    /// Replace the book, prune the expanded set and redraw both sides.
    pub fn apply_book(&mut self, book: BookSnapshot) {
        self.expanded.retain_live(&book);
        let (bids, asks) = book.into_sides();
        self.bids = Some(bids);
        self.asks = Some(asks);
        for side in Side::BOTH {
            self.render_side(side);
        }
    }

    /// Show the failure row on both sides. The expanded set is left as is.
    pub fn book_failed(&mut self) {
        self.bids = None;
        self.asks = None;
        for side in Side::BOTH {
            self.renderer.levels(side, &[LevelRow::Failed]);
        }
    }

    pub fn apply_trades(&mut self, trades: &[Trade], max: usize) {
        self.renderer.trades(&layout_trades(trades, max));
    }

    pub fn trades_failed(&mut self) {
        self.renderer.trades(&[TradeRow::Failed]);
    }

    /// Flip a level's expanded flag and redraw its side only.
    ///
    /// Only levels in the last successfully fetched book can be toggled; any
    /// other key is left alone. Returns the resulting state.
    pub fn toggle(&mut self, key: &LevelKey) -> bool {
        let live = self
            .levels(key.side)
            .is_some_and(|levels| levels.iter().any(|l| LevelKey::new(key.side, l.price) == *key));
        if !live {
            return self.expanded.is_expanded(key);
        }
        let expanded = self.expanded.toggle(key);
        self.render_side(key.side);
        expanded
    }

    fn render_side(&mut self, side: Side) {
        let rows = match self.levels(side) {
            Some(levels) => layout_levels(side, levels, &self.expanded, self.visible_orders),
            None => vec![LevelRow::Failed],
        };
        self.renderer.levels(side, &rows);
    }

    pub fn expanded(&self) -> &ExpandedKeySet {
        &self.expanded
    }

    pub fn levels(&self, side: Side) -> Option<&[PriceLevel]> {
        match side {
            Side::Bids => self.bids.as_deref(),
            Side::Asks => self.asks.as_deref(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CheckReport, Feedback, RefreshStatus};
    use crate::types::{Control, Indicator};
    use chrono::{DateTime, Local};

    /// Counts level renders per side.
    #[derive(Debug, Default)]
    struct SideCounter {
        bids: usize,
        asks: usize,
    }

    impl Renderer for SideCounter {
        fn indicator(&mut self, _: Indicator, _: &CheckReport) {}
        fn connected_clients(&mut self, _: Option<u64>) {}
        fn last_push(&mut self, _: DateTime<Local>) {}
        fn refresh_status(&mut self, _: &RefreshStatus) {}
        fn levels(&mut self, side: Side, _: &[LevelRow]) {
            match side {
                Side::Bids => self.bids += 1,
                Side::Asks => self.asks += 1,
            }
        }
        fn trades(&mut self, _: &[TradeRow]) {}
        fn feedback(&mut self, _: Control, _: Option<&Feedback>) {}
        fn control_enabled(&mut self, _: Control, _: bool) {}
        fn prefill_cancel(&mut self, _: &str) {}
    }

    fn board_with_bid(price: f64) -> Board<SideCounter> {
        let mut board = Board::new(SideCounter::default(), 5);
        let book: BookSnapshot =
            serde_json::from_value(serde_json::json!({"bids": [[price, 1]], "asks": []})).unwrap();
        board.apply_book(book);
        board
    }

    #[test]
    fn toggle_flips_live_level_and_redraws_its_side() {
        let mut board = board_with_bid(10.5);
        let key = LevelKey::new(Side::Bids, 10.5);

        assert!(board.toggle(&key));
        assert!(board.expanded().is_expanded(&key));
        assert_eq!((board.renderer().bids, board.renderer().asks), (2, 1));

        assert!(!board.toggle(&key));
        assert!(board.expanded().is_empty());
    }

    #[test]
    fn toggle_ignores_levels_not_in_the_book() {
        let mut board = board_with_bid(10.5);

        assert!(!board.toggle(&LevelKey::new(Side::Asks, 99.0)));
        assert!(!board.toggle(&LevelKey::new(Side::Bids, 11.0)));
        assert!(board.expanded().is_empty());
        assert_eq!((board.renderer().bids, board.renderer().asks), (1, 1));
    }

    #[test]
    fn toggle_after_failed_fetch_is_a_no_op() {
        let mut board = board_with_bid(1.0);
        let key = LevelKey::new(Side::Bids, 1.0);
        assert!(board.toggle(&key));

        board.book_failed();
        // the failed fetch leaves the set alone, and toggles cannot change it
        assert!(board.toggle(&key));
        assert!(!board.toggle(&LevelKey::new(Side::Bids, 2.0)));
        assert_eq!(board.expanded().len(), 1);
        assert!(board.expanded().is_expanded(&key));
    }
}
