//! Chat relay transport: event model, send primitive and HTTP client.

mod client;
mod error;
mod receiver;
mod transport;
mod types;

pub use client::HttpTransport;
pub use error::TransportError;
pub use receiver::EventReceiver;
#[cfg(any(test, feature = "mock"))]
pub use transport::MockTransport;
pub use transport::Transport;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> HttpTransport {
        HttpTransport::new(mock_server.uri(), "test-token").unwrap()
    }

    fn update_json(kind: &str, text: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "updateId": 7,
            "kind": kind,
            "message": {
                "id": 101,
                "chatId": -500,
                "senderId": 42,
                "senderName": "Alice",
                "text": text,
                "out": false,
                "replyTo": null,
                "isGroup": true,
                "date": 1700000000
            }
        })
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_fetch_updates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/updates"))
            .and(query_param("offset", "7"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([update_json("message", Some("  .ping  "))])),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let updates = client.updates(7).await.unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 7);
        assert_eq!(updates[0].kind, UpdateKind::Message);
        assert_eq!(updates[0].message.sender_id, 42);
    }

    #[tokio::test]
    async fn test_fetch_updates_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/updates"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.updates(0).await;

        assert!(matches!(result, Err(TransportError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_send_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(serde_json::json!({
                "chatId": -500,
                "text": "Hello!",
                "parseMode": "markdown",
                "replyTo": 101
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.send(-500, "Hello!", &SendOptions::reply(101)).await;

        tokio_test::assert_ok!(result);
    }

    #[tokio::test]
    async fn test_send_plain_omits_reply_to() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(body_json(serde_json::json!({
                "chatId": 42,
                "text": "plain",
                "parseMode": "plain"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(client.send(42, "plain", &SendOptions::plain()).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_message_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.send(1, "Hello!", &SendOptions::default()).await;

        assert!(matches!(result, Err(TransportError::SendFailed(msg)) if msg == "chat not found"));
    }

    #[test]
    fn test_event_from_message_update() {
        let update: Update = serde_json::from_value(update_json("message", Some("  .ping  "))).unwrap();

        let event = Event::from_update(&update).unwrap();
        assert_eq!(event.kind, EventKind::NewMessage);
        assert_eq!(event.text, ".ping");
        assert_eq!(event.sender_id, 42);
        assert_eq!(event.chat_id, -500);
        assert_eq!(event.message_id, 101);
        assert!(event.is_group);
        assert!(!event.outgoing);
        assert_eq!(event.display_name(), "Alice");
        assert_eq!(event.received_at.timestamp(), 1700000000);
    }

    #[test]
    fn test_event_from_update_without_text() {
        let update: Update = serde_json::from_value(update_json("message", None)).unwrap();
        assert!(Event::from_update(&update).is_none());
    }

    #[test]
    fn test_event_from_member_joined() {
        let update: Update = serde_json::from_value(update_json("member_joined", None)).unwrap();

        let event = Event::from_update(&update).unwrap();
        assert_eq!(event.kind, EventKind::MemberJoined);
        assert!(event.text.is_empty());
    }

    #[test]
    fn test_event_from_edited_message() {
        let update: Update =
            serde_json::from_value(update_json("edited_message", Some(".help"))).unwrap();

        let event = Event::from_update(&update).unwrap();
        assert_eq!(event.kind, EventKind::Edited);
    }

    #[test]
    fn test_event_message_constructor_trims() {
        let event = Event::message(1, 2, "  hi there \n");
        assert_eq!(event.text, "hi there");
        assert_eq!(event.display_name(), "Unknown");
    }

    #[tokio::test]
    async fn test_mock_transport_records_call() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|peer, text, options| *peer == 9 && text == "hey" && options.reply_to.is_none())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let transport: &dyn Transport = &transport;
        assert!(transport.send(9, "hey", &SendOptions::plain()).await.is_ok());
    }
}
