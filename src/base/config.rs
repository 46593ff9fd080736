//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, str::FromStr, sync::Arc};

use chrono::Locale;
use chrono_tz::Tz;
use serde::Deserialize;

use super::types::Res;

/// Default timezone used for all date display and parsing.
fn default_timezone() -> String {
    "UTC".to_string()
}

/// Default date-time entry/display format (strftime).
fn default_date_format() -> String {
    "%d.%m.%Y %H:%M".to_string()
}

/// Default date-only format used by the search workflow.
fn default_date_only_format() -> String {
    "%d.%m.%Y".to_string()
}

/// Default display locale for rendered dates.
fn default_locale() -> String {
    "de".to_string()
}

/// Default database endpoint; `mem://` runs an embedded in-memory instance.
fn default_db_endpoint() -> String {
    "mem://".to_string()
}

/// Whether a strftime format string parses without error items.
fn strftime_is_valid(fmt: &str) -> bool {
    use chrono::format::{Item, StrftimeItems};

    !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

/// Configuration for the event-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Telegram bot API token (`TELEGRAM_TOKEN`).
    pub telegram_token: String,
    /// Chat ID of the admin group that reviews submissions (`ADMIN_CHAT_ID`).
    pub admin_chat_id: i64,
    /// Public channel the bot publishes to, `@name` or a numeric ID (`CHANNEL_ID`).
    pub channel_id: String,
    /// IANA timezone name for all date display and parsing (`TIMEZONE`).
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Date-time format for event start/end entry and display (`DATE_FORMAT`).
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Date-only format for the search workflow (`DATE_ONLY_FORMAT`).
    #[serde(default = "default_date_only_format")]
    pub date_only_format: String,
    /// Display locale for rendered dates, e.g. `de` or `en-US` (`LOCALE`).
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Database endpoint URL (`DB_ENDPOINT`), e.g. `ws://localhost:8000` or `mem://`.
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`), unused for `mem://`.
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (`DB_PASSWORD`), unused for `mem://`.
    #[serde(default)]
    pub db_password: Option<String>,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("EVENT_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.telegram_token.is_empty() {
            return Err(anyhow::anyhow!("Telegram token must be set."));
        }

        if result.admin_chat_id == 0 {
            return Err(anyhow::anyhow!("Admin chat ID must be set."));
        }

        if result.channel_id.is_empty() {
            return Err(anyhow::anyhow!("Channel ID must be set."));
        }

        if Tz::from_str(&result.timezone).is_err() {
            return Err(anyhow::anyhow!("Unknown timezone `{}`.", result.timezone));
        }

        // A bad strftime specifier would otherwise only blow up when the
        // first date is rendered.
        if !strftime_is_valid(&result.date_format) {
            return Err(anyhow::anyhow!("Invalid date format `{}`.", result.date_format));
        }

        if !strftime_is_valid(&result.date_only_format) {
            return Err(anyhow::anyhow!("Invalid date-only format `{}`.", result.date_only_format));
        }

        Ok(result)
    }

    /// The configured timezone, parsed.
    ///
    /// Validated in [`Config::load`], so the fallback only applies to
    /// hand-built test configs.
    pub fn tz(&self) -> Tz {
        Tz::from_str(&self.timezone).unwrap_or(Tz::UTC)
    }

    /// The configured display locale, mapped to a chrono locale.
    ///
    /// Unknown values fall back to `en_US`.
    pub fn chrono_locale(&self) -> Locale {
        match self.locale.as_str() {
            "de" | "de-DE" => Locale::de_DE,
            _ => Locale::en_US,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_strftime_formats() {
        assert!(strftime_is_valid("%d.%m.%Y %H:%M"));
        assert!(strftime_is_valid("%d.%m.%Y"));
        assert!(strftime_is_valid("%Y-%m-%dT%H:%M"));
    }

    #[test]
    fn rejects_unknown_strftime_specifiers() {
        assert!(!strftime_is_valid("%q"));
        assert!(!strftime_is_valid("%d.%m.%"));
    }
}
