//! Speed command - times a round trip through the transport.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::CommandOutcome;
use async_trait::async_trait;
use chat_transport::SendOptions;
use std::time::Instant;
use tracing::info;

/// Rating for a measured send latency.
pub fn performance(latency_ms: u64) -> &'static str {
    match latency_ms {
        0..=1000 => "Excellent 🚀",
        1001..=3000 => "Good 👍",
        _ => "Slow 🐢",
    }
}

pub struct SpeedHandler;

impl SpeedHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpeedHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for SpeedHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let started = Instant::now();
        ctx.transport
            .send(
                ctx.chat_id,
                "⚡ Testing speed...",
                &SendOptions::reply(ctx.event.message_id),
            )
            .await?;
        let latency_ms = started.elapsed().as_millis() as u64;
        let rating = performance(latency_ms);

        info!("Speed test completed in {}ms - {}", latency_ms, rating);

        let reply = format!(
            "⚡ **Speed Test Results**\n\n\
             **Response Time:** {}ms\n\
             **Performance:** {}",
            latency_ms, rating
        );
        Ok(CommandOutput::new(reply, "Speed test completed")
            .with_data(serde_json::json!({ "latency_ms": latency_ms, "performance": rating })))
    }
}
