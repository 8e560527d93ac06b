//! Update receiver with polling.

use crate::client::HttpTransport;
use crate::types::*;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Polls the relay and yields normalised events in arrival order.
pub struct EventReceiver {
    client: HttpTransport,
    poll_interval: Duration,
}

impl EventReceiver {
    pub fn new(client: HttpTransport, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Start receiving events as an async stream.
    pub fn stream(self) -> impl Stream<Item = Event> {
        async_stream::stream! {
            let mut offset = 0i64;
            loop {
                match self.client.updates(offset).await {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            if let Some(event) = Event::from_update(&update) {
                                debug!(
                                    "Received {:?} in {} from {}",
                                    event.kind, event.chat_id, event.sender_id
                                );
                                yield event;
                            }
                        }
                    }
                    Err(e) => {
                        error!("Receive error: {}", e);
                        // Back off on error
                        sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                }

                sleep(self.poll_interval).await;
            }
        }
    }
}
