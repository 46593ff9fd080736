//! Escaping for Telegram's MarkdownV2 dialect.
//!
//! Submitter-controlled text (title, description, links) must never be able
//! to break message formatting or smuggle in markup of its own, so every
//! user-supplied string passes through here before rendering.

/// Characters that MarkdownV2 treats as markup in regular text.
const TEXT_SPECIALS: &[char] = &['_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\'];

/// Escape a string for use as MarkdownV2 text.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        if TEXT_SPECIALS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }

    out
}

/// Escape a URL for use inside a MarkdownV2 inline link.
///
/// Inside `(...)` only backslash and parentheses are special.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());

    for c in url.chars() {
        if c == '\\' || c == '(' || c == ')' {
            out.push('\\');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_markup_characters() {
        assert_eq!(escape_text("a_b*c[d]e"), "a\\_b\\*c\\[d\\]e");
        assert_eq!(escape_text("1.6. 19:00!"), "1\\.6\\. 19:00\\!");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(escape_text("Jazz Night"), "Jazz Night");
    }

    #[test]
    fn url_escaping_is_minimal() {
        assert_eq!(escape_url("https://example.com/a_b.html"), "https://example.com/a_b.html");
        assert_eq!(escape_url("https://example.com/x(1)"), "https://example.com/x\\(1\\)");
    }

    #[test]
    fn injected_markup_cannot_terminate_a_link() {
        // A title like `](http://evil)` must not survive escaping intact.
        let escaped = escape_text("](http://evil)");
        assert_eq!(escaped, "\\]\\(http://evil\\)");
    }
}
