//! Core components, types, and utilities for the event-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - User-facing message texts and button labels.
//! - Common types and result handling.

pub mod config;
pub mod texts;
pub mod types;
