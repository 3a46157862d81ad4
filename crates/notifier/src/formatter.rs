//! Message formatting — turns a `NotificationEvent` into Telegram Markdown.
//!
//! User-supplied text is not escaped against the markup dialect. A title or
//! value containing `*` or `` ` `` will change how the message renders.

use courier_common::types::NotificationEvent;

/// Render a notification into a single Markdown text blob.
///
/// - a non-empty `message` is appended verbatim after the bold title
/// - otherwise each field becomes a `**Key**: `value`` line, in order
///
/// Field lines end with two spaces so Markdown keeps the line breaks.
pub fn format_message(title: &str, message: Option<&str>, fields: &[(String, String)]) -> String {
    let mut text = format!("**{}**\n", title);

    match message {
        Some(message) if !message.is_empty() => text.push_str(message),
        _ => {
            for (key, value) in fields {
                text.push_str(&format!("**{}**: `{}`  \n", humanize_key(key), value));
            }
        }
    }

    text
}

/// Turn an identifier-style key into a spaced title (`retry_count` → `Retry Count`).
///
/// Keys without a `_` or `-` separator are returned unchanged.
pub fn humanize_key(key: &str) -> String {
    if !key.contains(is_separator) {
        return key.to_string();
    }

    let words: Vec<String> = key
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        return key.to_string();
    }

    words.join(" ")
}

fn is_separator(c: char) -> bool {
    c == '_' || c == '-'
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Anything that can be rendered into a deliverable text body.
pub trait MessageFormat {
    fn render(&self) -> String;
}

impl MessageFormat for NotificationEvent {
    fn render(&self) -> String {
        format_message(&self.title, self.message.as_deref(), &self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_message_is_used_verbatim() {
        let text = format_message(
            "Deploy finished",
            Some("All 3 services updated"),
            &fields(&[("ignored", "x")]),
        );
        assert_eq!(text, "**Deploy finished**\nAll 3 services updated");
    }

    #[test]
    fn test_fields_rendered_in_order() {
        let text = format_message(
            "Service updated",
            None,
            &fields(&[("service_name", "web"), ("image", "nginx:1.27"), ("retry_count", "2")]),
        );
        assert_eq!(
            text,
            "**Service updated**\n\
             **Service Name**: `web`  \n\
             **image**: `nginx:1.27`  \n\
             **Retry Count**: `2`  \n"
        );
    }

    #[test]
    fn test_empty_message_falls_back_to_fields() {
        let text = format_message("Title", Some(""), &fields(&[("a_b", "1")]));
        assert_eq!(text, "**Title**\n**A B**: `1`  \n");
    }

    #[test]
    fn test_title_only() {
        assert_eq!(format_message("Ping", None, &[]), "**Ping**\n");
        assert_eq!(format_message("", None, &[]), "****\n");
    }

    #[test]
    fn test_event_render() {
        let event = NotificationEvent::new("Scaled").with_field("replica-count", "5");
        assert_eq!(event.render(), "**Scaled**\n**Replica Count**: `5`  \n");

        let event = NotificationEvent::new("Scaled").with_message("to 5 replicas");
        assert_eq!(event.render(), "**Scaled**\nto 5 replicas");
    }

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("retry_count"), "Retry Count");
        assert_eq!(humanize_key("image-digest"), "Image Digest");
        assert_eq!(humanize_key("__leading__trailing_"), "Leading Trailing");
        assert_eq!(humanize_key("HTTP_status"), "HTTP Status");
    }

    #[test]
    fn test_humanize_key_identity_without_separators() {
        for key in ["", "image", "Image", "camelCase", "ключ", "日本語", "with space"] {
            assert_eq!(humanize_key(key), key);
        }
    }

    #[test]
    fn test_humanize_key_is_total() {
        assert_eq!(humanize_key("_"), "_");
        assert_eq!(humanize_key("--"), "--");
        assert_eq!(humanize_key("über_größe"), "Über Größe");
        assert_eq!(humanize_key("ß_x"), "SS X");
        assert_eq!(humanize_key("😀_ok"), "😀 Ok");
    }
}
