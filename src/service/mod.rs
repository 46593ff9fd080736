//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the event-bot:
//! - Chat transport (Telegram Bot API)
//! - Database storage (SurrealDB)
//!
//! Each service module defines both a generic trait and a concrete
//! implementation, allowing for extensibility and easy testing.

pub mod chat;
pub mod db;
