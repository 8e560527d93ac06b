//! Shared test harness: real stores, a manual clock and a recording transport.

#![allow(dead_code)]

use agent_state::{ActivityTable, Clock, ManualClock, ReminderStore, RuleStore};
use async_trait::async_trait;
use chat_transport::{Event, PeerId, SendOptions, Transport, TransportError};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use userbot::commands::{CommandRegistry, Services};
use userbot::{ChatLanes, Dispatcher, EventHandler, ReminderScheduler};

/// One message handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub peer: PeerId,
    pub text: String,
    pub options: SendOptions,
}

/// Records every send; can be switched to fail.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.text).collect()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        peer: PeerId,
        text: &str,
        options: &SendOptions,
    ) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("relay unavailable".into()));
        }
        self.sent.lock().unwrap().push(Sent {
            peer,
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(())
    }
}

/// The only sender allowed to broadcast in the harness.
pub const ADMIN: PeerId = 10;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub clock: Arc<ManualClock>,
    pub rules: RuleStore,
    pub reminders: ReminderStore,
    pub activity: ActivityTable,
    pub handler: Arc<EventHandler>,
    pub scheduler: ReminderScheduler,
}

/// Event handler wired to the given transport and stores.
pub fn pipeline(
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    rules: RuleStore,
    reminders: ReminderStore,
    activity: ActivityTable,
) -> Arc<EventHandler> {
    let services = Services {
        rules: rules.clone(),
        reminders,
        activity: activity.clone(),
        clock: clock.clone(),
        started_at: t0(),
        broadcast_allowlist: vec![ADMIN],
    };
    let registry = Arc::new(CommandRegistry::standard(&services).unwrap());
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        transport.clone(),
        Duration::from_secs(5),
        '.',
    ));
    Arc::new(EventHandler::new(dispatcher, rules, activity, transport, clock))
}

impl Harness {
    pub fn new() -> Self {
        let transport = Arc::new(RecordingTransport::default());
        let clock = Arc::new(ManualClock::new(t0()));
        let rules = RuleStore::with_defaults();
        let reminders = ReminderStore::new();
        let activity = ActivityTable::new();

        let dyn_transport: Arc<dyn Transport> = transport.clone();
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let handler = pipeline(
            dyn_transport.clone(),
            dyn_clock.clone(),
            rules.clone(),
            reminders.clone(),
            activity.clone(),
        );
        let scheduler = ReminderScheduler::new(
            reminders.clone(),
            dyn_transport,
            dyn_clock,
            Duration::from_secs(30),
        );

        Self {
            transport,
            clock,
            rules,
            reminders,
            activity,
            handler,
            scheduler,
        }
    }

    pub fn lanes(&self) -> ChatLanes {
        ChatLanes::new(self.handler.clone())
    }

    pub fn lanes_with_idle(&self, idle: Duration) -> ChatLanes {
        self.lanes().with_idle_timeout(idle)
    }

    /// A new message from `sender` in `chat`.
    pub fn message(&self, sender: PeerId, chat: PeerId, text: &str) -> Event {
        let mut event = Event::message(sender, chat, text);
        event.received_at = self.clock.now();
        event
    }
}
