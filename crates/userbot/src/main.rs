//! Chat userbot - main entry point.

use agent_state::{ActivityTable, Clock, ReminderStore, RuleStore, SystemClock};
use anyhow::Context;
use chat_transport::{EventReceiver, HttpTransport, Transport};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use userbot::commands::{CommandRegistry, Services};
use userbot::config::{BotConfig, Config};
use userbot::health::{self, AppState};
use userbot::{spawn_scheduler, AppResult, ChatLanes, Dispatcher, EventHandler, ReminderScheduler};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot);

    info!("Starting userbot...");

    let prefix = config.bot.prefix_char()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let started_at = clock.now();

    let rules = RuleStore::with_defaults();
    let reminders = ReminderStore::new();
    let activity = ActivityTable::new();

    let relay = HttpTransport::new(&config.transport.base_url, &config.transport.token)?;

    if !relay.health_check().await {
        error!("Chat relay not reachable at {}", config.transport.base_url);
        return Err(anyhow::anyhow!("Chat relay not reachable").into());
    }
    info!("Chat relay healthy");

    let transport: Arc<dyn Transport> = Arc::new(relay.clone());

    let services = Services {
        rules: rules.clone(),
        reminders: reminders.clone(),
        activity: activity.clone(),
        clock: clock.clone(),
        started_at,
        broadcast_allowlist: config.bot.broadcast_allowlist.clone(),
    };
    let registry = Arc::new(CommandRegistry::standard(&services)?);
    info!("Registered {} commands with prefix '{}'", registry.len(), prefix);

    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        transport.clone(),
        config.bot.command_timeout,
        prefix,
    ));
    let handler = Arc::new(EventHandler::new(
        dispatcher,
        rules,
        activity.clone(),
        transport.clone(),
        clock.clone(),
    ));
    let lanes = ChatLanes::new(handler).with_idle_timeout(config.bot.lane_idle_timeout);

    // Background reminder delivery
    let scheduler = Arc::new(ReminderScheduler::new(
        reminders.clone(),
        transport,
        clock.clone(),
        config.reminders.scan_interval,
    ));
    let scheduler_task = spawn_scheduler(scheduler);

    // Status server
    let server_task = if config.server.enabled {
        let addr = SocketAddr::new(
            config
                .server
                .listen_addr
                .parse()
                .unwrap_or([0, 0, 0, 0].into()),
            config.server.port,
        );
        let listener = TcpListener::bind(addr)
            .await
            .inspect_err(|e| error!("Failed to bind status server to {}: {}", addr, e))?;
        info!("Status server listening on {}", addr);

        let state = AppState {
            clock,
            started_at,
            reminders,
            activity,
        };
        Some(tokio::spawn(async move {
            if let Err(e) = health::serve(listener, state).await {
                error!("Status server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Listening for messages...");

    let receiver = EventReceiver::new(relay, config.transport.poll_interval);
    let mut stream = Box::pin(receiver.stream());

    // Main event loop
    loop {
        tokio::select! {
            Some(event) = stream.next() => {
                lanes.submit(event);
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    scheduler_task.abort();
    if let Some(task) = server_task {
        task.abort();
    }

    let open = lanes.len();
    lanes.close().await;
    info!("Drained {} chat lanes", open);

    Ok(())
}

fn init_logging(bot: &BotConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&bot.log_level));

    if bot.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
