//! Rendering of events for the different audiences.
//!
//! A single pure function produces the MarkdownV2 body of every outbound
//! message; the notifier only decides how to deliver it. Rendering differs
//! by audience: admins see the submitter and review context, the channel
//! sees the public card, search results carry their position and the query
//! date.

pub mod dates;
pub mod markdown;

use crate::{
    base::{config::Config, texts},
    domain::Event,
};

use markdown::{escape_text, escape_url};

/// Who the rendered message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience<'a> {
    /// The admin review chat; shows submitter identity and review context.
    Admin { is_edit: bool },
    /// The public channel post; no submitter identity.
    Channel,
    /// A search result sent to a user, with its position and the query date.
    SearchResult { index: usize, total: usize, date_label: &'a str },
}

/// Render an event as MarkdownV2 for the given audience.
pub fn render_event(event: &Event, audience: Audience<'_>, config: &Config) -> String {
    let mut lines: Vec<String> = Vec::new();

    match audience {
        Audience::Admin { is_edit } => {
            if is_edit {
                lines.push(format!("{} *Bearbeitete Veranstaltung zur Überprüfung:*", texts::ICON_EDIT));
            } else {
                lines.push("📢 *Neue Veranstaltung eingereicht:*".to_string());
            }
            lines.push(format!("*Von:* {}", escape_text(&event.submitted_by)));
        }
        Audience::SearchResult { index, total, date_label } => {
            lines.push(format!("Veranstaltungen für {}:", escape_text(date_label)));
            lines.push(format!("{} *Veranstaltung {}/{}*\n", texts::ICON_DATE, index + 1, total));
        }
        Audience::Channel => {}
    }

    lines.push(format!("{} *{}*", texts::ICON_ANNOUNCEMENT, escape_text(&event.title)));

    if !event.location.is_empty() {
        lines.push(format!("{} *Ort:* {}", texts::ICON_LOCATION, escape_text(&event.location)));
    }

    let (tz, locale) = (config.tz(), config.chrono_locale());
    let start = escape_text(&dates::format_in_tz(event.date, tz, &config.date_format, locale));
    let end = escape_text(&dates::format_in_tz(event.end_date, tz, &config.date_format, locale));

    lines.push(format!("{} *Start:* {start}", texts::ICON_DATE));
    lines.push(format!("{} *Ende:* {end}", texts::ICON_DATE));

    if !event.category.is_empty() {
        lines.push(format!("{} *Kategorie:* {}", texts::ICON_CATEGORY, escape_text(&event.category.join(", "))));
    }

    if !event.description.is_empty() {
        lines.push(format!("{} *Beschreibung:* {}", texts::ICON_DESCRIPTION, escape_text(&event.description)));
    }

    if !event.links.is_empty() {
        let links = event.links.iter().map(|link| format!("[{}]({})", escape_text(link), escape_url(link))).collect::<Vec<_>>().join("\n");
        lines.push(format!("{} *Links:*\n{links}", texts::ICON_LINKS));
    }

    lines.join("\n")
}
