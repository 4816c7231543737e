use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ChatTransport;
use crate::core::session::{ExchangeResult, PendingExchange};

/// Runs chat exchanges off the UI loop and hands their results back over a
/// channel. The loop passes each result to `ChatSession::complete`, which
/// decides whether it is still current.
#[derive(Clone)]
pub struct ChatService {
    tx: mpsc::UnboundedSender<ExchangeResult>,
    transport: Arc<dyn ChatTransport>,
}

impl ChatService {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
    ) -> (Self, mpsc::UnboundedReceiver<ExchangeResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, transport }, rx)
    }

    pub fn transport(&self) -> &dyn ChatTransport {
        self.transport.as_ref()
    }

    pub fn spawn_exchange(&self, pending: PendingExchange) {
        let tx = self.tx.clone();
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let result = pending.dispatch(transport.as_ref()).await;
            if tx.send(result).is_err() {
                debug!("chat loop is gone; dropping exchange result");
            }
        });
    }
}
