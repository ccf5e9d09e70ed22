//! Notification delivery test harness
//!
//! Drives the subsystem end to end against the in-memory change feed:
//! subscribes a session, generates a stream of notifications, prints every
//! alert that passes the delivery filter, then acknowledges everything read.

use anyhow::Result;
use clap::Parser;
use notifeed_core::{
    init_logging, Config, InMemoryChangeFeed, MemoryCursorStore, NotificationId,
    NotificationRecord, NotificationSession, NotificationType, Timestamp, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "test-harness")]
#[command(about = "Notifeed delivery test harness", long_about = None)]
struct Args {
    /// User to subscribe as
    #[arg(long, default_value = "demo-user")]
    user: String,

    /// Number of notifications to generate
    #[arg(short, long, default_value = "5")]
    count: usize,

    /// Milliseconds between generated notifications
    #[arg(long, default_value = "200")]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let args = Args::parse();
    let user = UserId::new(args.user.clone());

    let feed = Arc::new(InMemoryChangeFeed::new());
    // A stale notification from "yesterday": cached on subscribe, never alerted
    feed.push(NotificationRecord::new(
        NotificationId::new("backlog-1"),
        user.clone(),
        "Welcome back",
        "This one predates the session",
        NotificationType::System,
        Timestamp::now().minus(Duration::from_secs(86_400)),
    ))
    .await;

    let session = NotificationSession::new(
        user.clone(),
        feed.clone(),
        Arc::new(MemoryCursorStore::new()),
        Config::from_env()?,
    );

    let subscription = session
        .subscribe(
            Arc::new(|record: &NotificationRecord| {
                println!(
                    "ALERT [{}] {} - {}",
                    record.id, record.title, record.message
                );
            }),
            Arc::new(|error| {
                eprintln!("stream failed: {error}");
            }),
        )
        .await?;

    info!(user = %user, "session subscribed, generating notifications");
    for i in 0..args.count {
        feed.push(
            NotificationRecord::new(
                NotificationId::new(format!("live-{i}")),
                user.clone(),
                format!("Notification #{i}"),
                "Generated by the harness",
                NotificationType::Community,
                Timestamp::now(),
            )
            .with_link(format!("/events/{i}")),
        )
        .await;
        tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
    }

    println!(
        "cached: {} unread: {}",
        session.get_all().await.len(),
        session.unread_count().await
    );

    session.mark_all_as_read().await;
    println!(
        "after mark_all_as_read, unread: {}",
        session.unread_count().await
    );

    subscription.cancel();
    Ok(())
}
