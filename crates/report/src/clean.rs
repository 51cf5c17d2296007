//! Cleaning of runner error text for display
//!
//! Runner error messages carry terminal colour codes, multi-line stacks and
//! exception-name prefixes. Reports show a single escaped line instead.

use regex::Regex;
use std::sync::OnceLock;

/// Exception-name prefixes dropped from the start of an error message. Other
/// exception names (`TypeError`, `RangeError`, ...) are kept whole.
const ERROR_PREFIXES: [&str; 3] = ["AssertionError:", "TimeoutError:", "Error:"];

/// Entities `escape_html` produces
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#039;"];

fn ansi_regex() -> &'static Regex {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    ANSI.get_or_init(|| {
        Regex::new(r"[\x1b\x{9b}][\[()#;?]*(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-ORZcf-nqry=><]")
            .expect("ANSI pattern is valid")
    })
}

fn formatting_regex() -> &'static Regex {
    static FORMATTING: OnceLock<Regex> = OnceLock::new();
    FORMATTING.get_or_init(|| Regex::new(r"\[\d+m").expect("formatting pattern is valid"))
}

/// Remove ANSI escape sequences
pub fn strip_ansi(text: &str) -> String {
    ansi_regex().replace_all(text, "").into_owned()
}

/// Remove colour codes whose escape byte was already lost (`[31m`, `[2m`, ...)
pub fn strip_formatting(text: &str) -> String {
    formatting_regex().replace_all(text, "").into_owned()
}

fn escape_char(c: char, escaped: &mut String) {
    match c {
        '&' => escaped.push_str("&amp;"),
        '<' => escaped.push_str("&lt;"),
        '>' => escaped.push_str("&gt;"),
        '"' => escaped.push_str("&quot;"),
        '\'' => escaped.push_str("&#039;"),
        _ => escaped.push(c),
    }
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        escape_char(c, &mut escaped);
    }
    escaped
}

/// Like [`escape_html`], but an `&` that already starts one of its entities is
/// kept, so escaping cleaned text again changes nothing. The price is that a
/// literal `&lt;` in an error message displays as `<`.
fn escape_keeping_entities(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if c == '&' && ENTITIES.iter().any(|e| text[i..].starts_with(e)) {
            escaped.push('&');
        } else {
            escape_char(c, &mut escaped);
        }
    }
    escaped
}

fn first_line(text: &str) -> &str {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
}

fn strip_leading_prefix(text: &str) -> &str {
    let text = text.trim_start();
    ERROR_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
}

/// One-line, escaped form of an error message for reports.
///
/// Every step only ever removes text, so the loop runs until nothing changes;
/// removing one code can otherwise expose another. The result is stable under
/// a second cleaning.
pub fn clean_error_message(message: &str) -> String {
    let mut current = message.to_string();
    loop {
        let stripped = strip_formatting(&strip_ansi(&current));
        let next = strip_leading_prefix(first_line(&stripped)).trim().to_string();
        if next == current {
            break;
        }
        current = next;
    }
    escape_keeping_entities(&current)
}
