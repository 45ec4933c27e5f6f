//! Notifier - 申請者への DM
//!
//! ベストエフォート。失敗はログに残すだけで呼び出し側には返さない。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::UserId;
use crate::ports::{Transport, TransportError};

/// Result of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped(TransportError),
}

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn Transport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Open a DM channel and send `text`. Never fails.
    pub async fn notify(&self, user: UserId, text: &str) -> Delivery {
        match self.try_notify(user, text).await {
            Ok(()) => {
                debug!(user = %user, "direct message delivered");
                Delivery::Delivered
            }
            Err(err) => {
                warn!(user = %user, error = %err, "direct message dropped");
                Delivery::Dropped(err)
            }
        }
    }

    async fn try_notify(&self, user: UserId, text: &str) -> Result<(), TransportError> {
        let channel = self.transport.open_direct_channel(user).await?;
        self.transport.send_direct(channel, text).await
    }
}
