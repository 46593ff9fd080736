//! Runtime services and shared state for the event-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::session::SessionStore,
    service::{chat::ChatClient, db::DbClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the database client, chat client, dialogue sessions, and
/// configuration. It is designed to be trivially cloneable, allowing it to be
/// passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The suspended user dialogues.
    pub sessions: SessionStore,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Dialogue sessions live in process memory.
        let sessions = SessionStore::new();

        // Initialize the Telegram client.
        let chat = ChatClient::telegram(&config, db.clone(), sessions.clone()).await?;

        Ok(Self { config, db, chat, sessions })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
