//! Plain-text rendering of conversation state

use chrono::{DateTime, Local, NaiveDateTime};

use crate::conversation::{Message, Origin, SAMPLE_PROMPTS};
use crate::crisis::CRISIS_LINES;
use crate::protocol::{page_label, ResourceBundle, SearchResults};

/// Longest search passage shown before truncation
const MAX_PASSAGE_CHARS: usize = 200;

/// Truncate to at most `max_chars` characters, never splitting a character.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// `HH:MM` in local time for RFC 3339 or naive ISO-8601 timestamps; the raw
/// string for anything else.
pub fn short_time(timestamp: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.with_timezone(&Local).format("%H:%M").to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%H:%M").to_string();
    }
    timestamp.to_string()
}

pub fn render_message(message: &Message) -> String {
    let speaker = match message.origin {
        Origin::User => "You",
        Origin::Assistant if message.is_transport_error => "Assistant (error)",
        Origin::Assistant if message.is_crisis_flagged => "Assistant (crisis)",
        Origin::Assistant => "Assistant",
    };

    let mut out = format!(
        "[{}] {}: {}",
        short_time(&message.timestamp),
        speaker,
        message.text
    );

    for source in &message.sources {
        let page = source
            .page
            .as_deref()
            .map(|p| format!(", p. {p}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "\n    source: {}{} [{}]",
            source.source_name, page, source.chunk_type
        ));
    }

    out
}

pub fn render_sample_prompts() -> String {
    let mut out = String::from("Try asking me about:");
    for (i, prompt) in SAMPLE_PROMPTS.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, prompt));
    }
    out.push_str("\n(type a number to ask one of these)");
    out
}

pub fn render_crisis_panel() -> String {
    let mut out = String::from(
        "== Crisis Support Available ==\n\
         Your safety is our priority. If you're experiencing a mental health crisis or \
         having thoughts of self-harm, please reach out to a trained crisis counselor immediately:",
    );
    for line in CRISIS_LINES {
        out.push_str(&format!("\n  * {} - {}", line.title, line.detail));
    }
    out.push_str("\nYou don't have to go through this alone. Help is available 24/7.");
    out.push_str("\n(/close-crisis to close this panel)");
    out
}

pub fn render_resources(bundle: &ResourceBundle) -> String {
    let mut out = String::from("Crisis resources:");
    for (name, value) in &bundle.crisis {
        out.push_str(&format!("\n  {name}: {value}"));
    }
    if !bundle.general.is_empty() {
        out.push_str("\nSupport resources:");
        for (name, value) in &bundle.general {
            out.push_str(&format!("\n  {name}: {value}"));
        }
    }
    out
}

pub fn render_search(results: &SearchResults) -> String {
    if results.results.is_empty() {
        return format!("No passages found for \"{}\"", results.query);
    }

    let mut out = format!(
        "{} passage(s) for \"{}\":",
        results.results.len(),
        results.query
    );
    for (i, hit) in results.results.iter().enumerate() {
        let page = hit
            .page
            .as_ref()
            .and_then(page_label)
            .map(|p| format!(", p. {p}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "\n  {}. [{}{}] {}",
            i + 1,
            hit.source,
            page,
            truncate_chars(hit.content.trim(), MAX_PASSAGE_CHARS)
        ));
    }
    out
}
