//! Library root for `event-bot`.
//!
//! Event-bot is a Telegram assistant for community event announcements
//! designed to:
//! - Collect event submissions from users in a guided dialogue
//! - Route every submission and edit through admin review
//! - Publish approved events to a public channel
//! - Let users search published events by day
//!
//! The bot integrates with Telegram for chat and SurrealDB for storage. The
//! architecture is built around extensible traits that allow for different
//! implementations of each service.

pub mod base;
pub mod domain;
pub mod format;
pub mod interaction;
pub mod lifecycle;
pub mod notify;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the event-bot runtime:
/// - Connects to the database and defines the schema
/// - Creates the runtime context with database and chat clients
/// - Starts the main update loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting event-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
