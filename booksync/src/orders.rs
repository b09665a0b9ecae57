//! Order entry and cancellation with local validation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::board::SharedBoard;
use crate::error::{Result, SyncError};
use crate::reconcile::Reconciler;
use crate::render::{Feedback, Renderer};
use crate::rest::BookHttpClient;
use crate::types::{CancelAck, Control, OrderAck, OrderRequest, OrderSide, RefreshReason};

pub const PRICE_INVALID: &str = "Price must be a positive number";
pub const QUANTITY_INVALID: &str = "Quantity must be a positive number";
pub const CANCEL_ID_MISSING: &str = "Please paste an orderId to cancel";

/// Parse and check order inputs. Both must be finite and strictly positive.
///
/// # Errors
///
/// Returns [`SyncError::Validation`] naming the first bad field.
pub fn validate_order(price: &str, quantity: &str) -> Result<(f64, f64)> {
    let price = positive(price).ok_or_else(|| SyncError::Validation(PRICE_INVALID.into()))?;
    let quantity =
        positive(quantity).ok_or_else(|| SyncError::Validation(QUANTITY_INVALID.into()))?;
    Ok((price, quantity))
}

fn positive(input: &str) -> Option<f64> {
    let value = input.trim().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Accepted-order message shown on the order control.
pub fn order_accepted_text(ack: &OrderAck) -> String {
    match &ack.order_id {
        Some(id) => format!("Order accepted. orderId={id}"),
        None => format!("Order accepted. {}", ack.message.as_deref().unwrap_or(""))
            .trim()
            .to_string(),
    }
}

/// Processed-cancel message shown on the cancel control.
pub fn cancel_processed_text(ack: &CancelAck) -> String {
    format!("Cancel processed. {}", ack.message.as_deref().unwrap_or(""))
        .trim()
        .to_string()
}

/// Disables a control and clears its feedback for as long as it lives.
struct ControlGuard<'a, R: Renderer> {
    board: &'a SharedBoard<R>,
    control: Control,
}

impl<'a, R: Renderer> ControlGuard<'a, R> {
    fn engage(board: &'a SharedBoard<R>, control: Control) -> Self {
        let mut board_ref = board.lock();
        let renderer = board_ref.renderer_mut();
        renderer.control_enabled(control, false);
        renderer.feedback(control, None);
        drop(board_ref);
        Self { board, control }
    }
}

impl<R: Renderer> Drop for ControlGuard<'_, R> {
    fn drop(&mut self) {
        self.board
            .lock()
            .renderer_mut()
            .control_enabled(self.control, true);
    }
}

/// Submits orders and cancels, then reconciles once on success.
pub struct OrderDesk<R> {
    client: BookHttpClient,
    board: SharedBoard<R>,
    reconciler: Arc<Reconciler<R>>,
}

impl<R: Renderer> OrderDesk<R> {
    pub fn new(client: BookHttpClient, reconciler: Arc<Reconciler<R>>) -> Self {
        Self {
            client,
            board: Arc::clone(reconciler.board()),
            reconciler,
        }
    }

    fn show(&self, control: Control, feedback: Feedback) {
        self.board
            .lock()
            .renderer_mut()
            .feedback(control, Some(&feedback));
    }

    /// Validate and place an order.
    ///
    /// On success the returned id (if any) is prefilled into the cancel
    /// field and one reconciliation tagged `order` runs before returning.
    /// The order control is re-enabled on every exit path.
    pub async fn submit(&self, side: OrderSide, price: &str, quantity: &str) -> Result<OrderAck> {
        let _guard = ControlGuard::engage(&self.board, Control::Order);

        let (price, quantity) = match validate_order(price, quantity) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.show(Control::Order, Feedback::failed(e.to_string()));
                return Err(e);
            }
        };

        let request = OrderRequest {
            side,
            price,
            quantity,
        };
        match self.client.place_order(&request).await {
            Ok(ack) => {
                info!(%side, price, quantity, order_id = ?ack.order_id, "order accepted");
                {
                    let mut board = self.board.lock();
                    let renderer = board.renderer_mut();
                    renderer.feedback(Control::Order, Some(&Feedback::ok(order_accepted_text(&ack))));
                    if let Some(id) = &ack.order_id {
                        renderer.prefill_cancel(id);
                    }
                }
                self.reconciler.run(RefreshReason::Order).await;
                Ok(ack)
            }
            Err(e) => {
                warn!(%side, price, quantity, "order failed: {e}");
                self.show(Control::Order, Feedback::failed(format!("Order failed: {e}")));
                Err(e)
            }
        }
    }

    /// Cancel a resting order by id.
    ///
    /// A blank id is rejected locally. On success one reconciliation tagged
    /// `cancel` runs before returning.
    pub async fn cancel(&self, order_id: &str) -> Result<CancelAck> {
        let _guard = ControlGuard::engage(&self.board, Control::Cancel);

        let order_id = order_id.trim();
        if order_id.is_empty() {
            self.show(Control::Cancel, Feedback::failed(CANCEL_ID_MISSING));
            return Err(SyncError::Validation(CANCEL_ID_MISSING.into()));
        }

        match self.client.cancel_order(order_id).await {
            Ok(ack) => {
                info!(order_id, "cancel processed");
                self.show(Control::Cancel, Feedback::ok(cancel_processed_text(&ack)));
                self.reconciler.run(RefreshReason::Cancel).await;
                Ok(ack)
            }
            Err(e) => {
                warn!(order_id, "cancel failed: {e}");
                self.show(Control::Cancel, Feedback::failed(format!("Cancel failed: {e}")));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages() {
        let err = validate_order("0", "1").unwrap_err();
        assert_eq!(err.to_string(), PRICE_INVALID);
        let err = validate_order("10", "-1").unwrap_err();
        assert_eq!(err.to_string(), QUANTITY_INVALID);
        let err = validate_order("", "1").unwrap_err();
        assert_eq!(err.to_string(), PRICE_INVALID);
        let err = validate_order("NaN", "1").unwrap_err();
        assert_eq!(err.to_string(), PRICE_INVALID);
        let err = validate_order("1", "inf").unwrap_err();
        assert_eq!(err.to_string(), QUANTITY_INVALID);
    }

    #[test]
    fn validation_accepts_padded_positive_numbers() {
        assert_eq!(validate_order(" 101.5 ", "2").unwrap(), (101.5, 2.0));
    }

    #[test]
    fn accepted_text() {
        let ack = OrderAck {
            order_id: Some("o-7".into()),
            message: Some("ignored".into()),
        };
        assert_eq!(order_accepted_text(&ack), "Order accepted. orderId=o-7");
        let ack = OrderAck {
            order_id: None,
            message: Some("queued".into()),
        };
        assert_eq!(order_accepted_text(&ack), "Order accepted. queued");
        assert_eq!(order_accepted_text(&OrderAck::default()), "Order accepted.");
    }

    #[test]
    fn cancel_text() {
        let ack = CancelAck {
            message: Some("cancelled o-7".into()),
        };
        assert_eq!(cancel_processed_text(&ack), "Cancel processed. cancelled o-7");
        assert_eq!(cancel_processed_text(&CancelAck::default()), "Cancel processed.");
    }
}
