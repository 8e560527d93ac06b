//! Per-chat event queues.
//!
//! Each chat gets one queue and one worker task, so events from the same
//! chat are handled strictly in arrival order while different chats proceed
//! concurrently. A worker that sees no events for the idle timeout removes
//! its lane and exits; the next event for that chat opens a fresh one.

use crate::handler::EventHandler;
use chat_transport::{Event, PeerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default time a lane may sit empty before its worker exits.
pub const DEFAULT_LANE_IDLE: Duration = Duration::from_secs(300);

struct Lane {
    tx: mpsc::UnboundedSender<Event>,
    worker: JoinHandle<()>,
}

type LaneMap = Arc<Mutex<HashMap<PeerId, Lane>>>;

fn lock(lanes: &Mutex<HashMap<PeerId, Lane>>) -> MutexGuard<'_, HashMap<PeerId, Lane>> {
    lanes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ChatLanes {
    handler: Arc<EventHandler>,
    lanes: LaneMap,
    idle: Duration,
}

impl ChatLanes {
    pub fn new(handler: Arc<EventHandler>) -> Self {
        Self {
            handler,
            lanes: Arc::new(Mutex::new(HashMap::new())),
            idle: DEFAULT_LANE_IDLE,
        }
    }

    pub fn with_idle_timeout(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    /// Queue `event` behind earlier events of the same chat.
    pub fn submit(&self, event: Event) {
        let chat_id = event.chat_id;
        let mut lanes = lock(&self.lanes);

        let event = match lanes.get(&chat_id) {
            Some(lane) => match lane.tx.send(event) {
                Ok(()) => return,
                // Worker is gone; replace the lane below.
                Err(mpsc::error::SendError(event)) => {
                    warn!("Lane for chat {} closed, restarting", chat_id);
                    event
                }
            },
            None => event,
        };

        let lane = self.spawn_lane(chat_id);
        // A fresh receiver is alive, so this cannot fail.
        let _ = lane.tx.send(event);
        lanes.insert(chat_id, lane);
    }

    fn spawn_lane(&self, chat_id: PeerId) -> Lane {
        debug!("Opening lane for chat {}", chat_id);
        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let handler = self.handler.clone();
        let lanes = self.lanes.clone();
        let idle = self.idle;

        let worker = tokio::spawn(async move {
            loop {
                let event = match tokio::time::timeout(idle, rx.recv()).await {
                    Ok(Some(event)) => event,
                    Ok(None) => {
                        debug!("Lane for chat {} drained", chat_id);
                        break;
                    }
                    Err(_) => {
                        // `submit` sends under the map lock, so an empty queue
                        // seen here stays empty until the lane is gone.
                        let mut map = lock(&lanes);
                        match rx.try_recv() {
                            Ok(event) => event,
                            Err(_) => {
                                map.remove(&chat_id);
                                debug!("Lane for chat {} idle, closing", chat_id);
                                break;
                            }
                        }
                    }
                };
                handler.on_event(&event).await;
            }
        });

        Lane { tx, worker }
    }

    /// Number of chats with a lane.
    pub fn len(&self) -> usize {
        lock(&self.lanes).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.lanes).is_empty()
    }

    /// Stop accepting events and wait for every queued event to finish.
    pub async fn close(&self) {
        let lanes: Vec<Lane> = lock(&self.lanes).drain().map(|(_, lane)| lane).collect();
        for Lane { tx, worker } in lanes {
            drop(tx);
            if let Err(e) = worker.await {
                warn!("Lane worker ended abnormally: {}", e);
            }
        }
    }
}
