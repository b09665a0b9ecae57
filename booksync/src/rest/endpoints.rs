use crate::error::Result;
use crate::rest::{BookHttpClient, TextResponse};
use crate::types::*;

impl BookHttpClient {
    // --- Status ---

    /// GET /health - Liveness text.
    pub async fn get_health(&self) -> Result<TextResponse> {
        self.get_text("/health").await
    }

    /// GET /ready - Readiness text.
    pub async fn get_ready(&self) -> Result<TextResponse> {
        self.get_text("/ready").await
    }

    /// GET /metrics - Plain-text metrics blob.
    pub async fn get_metrics(&self) -> Result<TextResponse> {
        self.get_text("/metrics").await
    }

    // --- Snapshots ---

    /// GET /api/book - Full book, both sides.
    pub async fn get_book(&self) -> Result<BookSnapshot> {
        self.get_json("/api/book", &[]).await
    }

    /// GET /api/trades?limit= - Recent trades, newest first.
    pub async fn get_trades(&self, limit: usize) -> Result<TradesSnapshot> {
        self.get_json("/api/trades", &[("limit", &limit.to_string())])
            .await
    }

    // --- Orders ---

    /// POST /api/order - Place a limit order.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let value = self.post_json("/api/order", order).await?;
        Ok(OrderAck::from_value(&value))
    }

    /// POST /api/cancel - Cancel a resting order by id.
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelAck> {
        let req = CancelRequest {
            order_id: order_id.to_string(),
        };
        let value = self.post_json("/api/cancel", &req).await?;
        Ok(CancelAck::from_value(&value))
    }
}
