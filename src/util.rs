//! Shared utility functions used across the codebase.

use std::sync::OnceLock;

use regex::Regex;

/// Parse an environment variable as a boolean, returning `default` if unset.
///
/// Recognises `1`, `true`, `yes`, `y`, `on` (case-insensitive) as `true`;
/// any other set value is `false`.
pub fn env_var_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        Err(_) => default,
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("static regex")
    })
}

/// Pull the JSON payload out of a model reply.
///
/// Models wrap JSON in Markdown fences or add prose around it. This returns
/// the first fenced block if there is one, otherwise the span from the first
/// `{`/`[` to the matching last `}`/`]`, otherwise the trimmed text.
pub fn extract_json(text: &str) -> &str {
    if let Some(caps) = fence_regex().captures(text) {
        if let Some(body) = caps.get(1) {
            return body.as_str().trim();
        }
    }

    let trimmed = text.trim();
    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    match (start, end) {
        (Some(s), Some(e)) if e > s => &trimmed[s..=e],
        _ => trimmed,
    }
}

/// Truncate to at most `max_chars` characters for log lines.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_from_fence() {
        let reply = "Here you go:\n```json\n[{\"a\": 1}]\n```\nThanks";
        assert_eq!(extract_json(reply), "[{\"a\": 1}]");
    }

    #[test]
    fn extract_json_from_bare_fence() {
        assert_eq!(extract_json("```\n{\"x\":true}\n```"), "{\"x\":true}");
    }

    #[test]
    fn extract_json_from_prose() {
        let reply = "Sure! {\"name\": \"cars\"} Hope that helps.";
        assert_eq!(extract_json(reply), "{\"name\": \"cars\"}");
    }

    #[test]
    fn extract_json_passthrough() {
        assert_eq!(extract_json("  no json here "), "no json here");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo world", 5), "héllo...");
        assert_eq!(preview("short", 10), "short");
    }

    #[test]
    fn env_var_bool_defaults() {
        assert!(env_var_bool("VIZIER_TEST_BOOL_UNSET", true));
        std::env::set_var("VIZIER_TEST_BOOL_OFF", "off");
        assert!(!env_var_bool("VIZIER_TEST_BOOL_OFF", true));
        std::env::set_var("VIZIER_TEST_BOOL_ON", "Yes");
        assert!(env_var_bool("VIZIER_TEST_BOOL_ON", false));
    }
}
