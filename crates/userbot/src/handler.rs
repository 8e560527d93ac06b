//! Single entry point for inbound events.

use crate::dispatcher::{parse_invocation, CommandResult, Dispatcher};
use crate::error::ErrorKind;
use agent_state::{ActivityTable, Clock, RuleStore};
use chat_transport::{Event, EventKind, SendOptions, Transport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one inbound event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Own message, bare prefix, or nothing to act on.
    Ignored,
    /// A prefixed message went through the dispatcher.
    Command(CommandResult),
    /// Ordinary chat text.
    Chat { spam: bool, auto_replied: bool },
    /// An edited command got the edit hint.
    EditHinted,
    Welcomed,
    MemberLeft,
}

pub struct EventHandler {
    dispatcher: Arc<Dispatcher>,
    rules: RuleStore,
    activity: ActivityTable,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl EventHandler {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        rules: RuleStore,
        activity: ActivityTable,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dispatcher,
            rules,
            activity,
            transport,
            clock,
        }
    }

    pub async fn on_event(&self, event: &Event) -> EventOutcome {
        if event.outgoing {
            return EventOutcome::Ignored;
        }

        match event.kind {
            EventKind::NewMessage => self.on_message(event).await,
            EventKind::Edited => self.on_edited(event).await,
            EventKind::MemberJoined => self.on_member_joined(event).await,
            EventKind::MemberLeft => {
                info!("User {} left chat {}", event.display_name(), event.chat_id);
                EventOutcome::MemberLeft
            }
        }
    }

    async fn on_message(&self, event: &Event) -> EventOutcome {
        let prefix = self.dispatcher.prefix();
        debug!(
            "{} message from {}: {}",
            if event.is_group { "Group" } else { "Private" },
            event.display_name(),
            truncate(&event.text, 30)
        );

        self.activity
            .record_message(event.sender_id, self.clock.now())
            .await;

        if event.text.starts_with(prefix) {
            return match parse_invocation(&event.text, prefix) {
                Some(invocation) => {
                    EventOutcome::Command(self.dispatcher.dispatch(event, invocation).await)
                }
                None => EventOutcome::Ignored,
            };
        }

        if event.text.is_empty() {
            return EventOutcome::Ignored;
        }

        let spam = self.rules.spam_detection_enabled().await && self.rules.is_spam(&event.text).await;
        if spam {
            warn!(
                target: "security",
                sender = event.sender_id,
                chat = event.chat_id,
                "Spam detected from {}: {}",
                event.display_name(),
                truncate(&event.text, 30)
            );
        }

        let auto_replied = self.auto_reply(event).await;
        EventOutcome::Chat { spam, auto_replied }
    }

    async fn auto_reply(&self, event: &Event) -> bool {
        if !self.rules.auto_reply_enabled().await {
            return false;
        }
        let Some(reply) = self.rules.match_auto_reply(&event.text).await else {
            return false;
        };

        match self
            .transport
            .send(event.chat_id, &reply, &SendOptions::reply(event.message_id))
            .await
        {
            Ok(()) => {
                info!("Auto-reply sent for: {}", truncate(&event.text, 20));
                true
            }
            Err(e) => {
                warn!(
                    error = ErrorKind::DeliveryFailed.as_str(),
                    "Failed to send auto-reply to {}: {}",
                    event.chat_id,
                    e
                );
                false
            }
        }
    }

    async fn on_edited(&self, event: &Event) -> EventOutcome {
        let prefix = self.dispatcher.prefix();
        debug!(
            "Edited message from {}: {}",
            event.display_name(),
            truncate(&event.text, 30)
        );

        if !event.text.starts_with(prefix) {
            return EventOutcome::Ignored;
        }

        let hint = format!(
            "✏️ **Message Edited**\n\nI see you edited your command! Use `{}help` for available commands.",
            prefix
        );
        if let Err(e) = self
            .transport
            .send(event.chat_id, &hint, &SendOptions::reply(event.message_id))
            .await
        {
            warn!("Failed to handle edited message: {}", e);
        }
        EventOutcome::EditHinted
    }

    async fn on_member_joined(&self, event: &Event) -> EventOutcome {
        info!("User {} joined chat {}", event.display_name(), event.chat_id);
        if !event.is_group {
            return EventOutcome::Ignored;
        }

        let welcome = format!("👋 Welcome {} to the group!", event.display_name());
        if let Err(e) = self
            .transport
            .send(event.chat_id, &welcome, &SendOptions::plain())
            .await
        {
            warn!("Failed to welcome {}: {}", event.display_name(), e);
        }
        EventOutcome::Welcomed
    }
}

/// At most `max` chars, with an ellipsis when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandRegistry, Services};
    use agent_state::{ManualClock, ReminderStore};
    use chat_transport::MockTransport;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn handler(transport: MockTransport) -> (EventHandler, ActivityTable, RuleStore) {
        let clock: Arc<dyn Clock> =
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let rules = RuleStore::with_defaults();
        let activity = ActivityTable::new();
        let services = Services {
            rules: rules.clone(),
            reminders: ReminderStore::new(),
            activity: activity.clone(),
            clock: clock.clone(),
            started_at: clock.now(),
            broadcast_allowlist: Vec::new(),
        };
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let registry = Arc::new(CommandRegistry::standard(&services).unwrap());
        let dispatcher = Arc::new(Dispatcher::new(
            registry,
            transport.clone(),
            Duration::from_secs(5),
            '.',
        ));
        (
            EventHandler::new(dispatcher, rules.clone(), activity.clone(), transport, clock),
            activity,
            rules,
        )
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello...");
        assert_eq!(truncate("héllo", 2), "hé...");
    }

    #[tokio::test]
    async fn test_outgoing_is_ignored() {
        let (handler, activity, _) = handler(MockTransport::new());
        let mut event = Event::message(1, 1, "hello");
        event.outgoing = true;

        assert!(matches!(handler.on_event(&event).await, EventOutcome::Ignored));
        assert_eq!(activity.tracked_users().await, 0);
    }

    #[tokio::test]
    async fn test_bare_prefix_not_dispatched() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let (handler, activity, _) = handler(transport);

        let outcome = handler.on_event(&Event::message(1, 1, ".")).await;
        assert!(matches!(outcome, EventOutcome::Ignored));
        assert_eq!(activity.tracked_users().await, 1);
    }

    #[tokio::test]
    async fn test_auto_reply_sent() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|peer, text, _| *peer == 9 && text == "Hello there! 👋")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (handler, _, _) = handler(transport);

        let outcome = handler.on_event(&Event::message(1, 9, "well hello")).await;
        assert!(matches!(
            outcome,
            EventOutcome::Chat {
                spam: false,
                auto_replied: true
            }
        ));
    }

    #[tokio::test]
    async fn test_auto_reply_disabled() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let (handler, _, rules) = handler(transport);
        rules.set_auto_reply_enabled(false).await;

        let outcome = handler.on_event(&Event::message(1, 9, "hello")).await;
        assert!(matches!(
            outcome,
            EventOutcome::Chat {
                auto_replied: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_spam_is_flagged_not_acted_on() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let (handler, _, _) = handler(transport);

        let outcome = handler.on_event(&Event::message(1, 9, "Get a PROMOTION now")).await;
        assert!(matches!(
            outcome,
            EventOutcome::Chat {
                spam: true,
                auto_replied: false
            }
        ));
    }

    #[tokio::test]
    async fn test_prefixed_text_skips_rules() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|_, text, _| text == "📢 hello spam")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (handler, _, _) = handler(transport);

        let outcome = handler.on_event(&Event::message(1, 9, ".echo hello spam")).await;
        match outcome {
            EventOutcome::Command(result) => assert!(result.success),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_edited_command_gets_hint() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|_, text, _| text.starts_with("✏️ **Message Edited**"))
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (handler, _, _) = handler(transport);

        let mut event = Event::message(1, 9, ".ping");
        event.kind = EventKind::Edited;
        assert!(matches!(handler.on_event(&event).await, EventOutcome::EditHinted));

        event.text = "just text".into();
        assert!(matches!(handler.on_event(&event).await, EventOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_member_joined_only_welcomed_in_groups() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|peer, text, _| *peer == -100 && text == "👋 Welcome Ada to the group!")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (handler, _, _) = handler(transport);

        let mut event = Event::message(5, -100, "");
        event.kind = EventKind::MemberJoined;
        event.sender_name = Some("Ada".into());
        event.is_group = true;
        assert!(matches!(handler.on_event(&event).await, EventOutcome::Welcomed));

        event.is_group = false;
        assert!(matches!(handler.on_event(&event).await, EventOutcome::Ignored));
    }
}
