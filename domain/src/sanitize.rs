//! Response sanitizer
//!
//! Generated persona text tends to arrive with narrated stage actions
//! (`*nods*`), boilerplate filler, and a stray `Name:` prefix. This module
//! strips all three. The transform is pure and idempotent.

/// Filler phrases removed case-insensitively wherever they appear
const FILLER_PHRASES: [&str; 3] = [
    "is reflecting on your question",
    "has something thoughtful to share",
    "is working on an answer right now",
];

/// Clean up a raw persona response.
///
/// Removes `*...*` spans (non-greedy, non-nested), the known filler
/// phrases, and a leading `{name}:` prefix in exact, lowercase, or
/// capitalized form, then trims surrounding whitespace.
pub fn sanitize(persona_name: &str, raw: &str) -> String {
    let mut cleaned = strip_asterisk_spans(raw);

    for phrase in FILLER_PHRASES {
        cleaned = strip_phrase_ci(&cleaned, phrase);
    }

    let lower = persona_name.to_lowercase();
    let capitalized = capitalize(persona_name);
    let prefixes = [
        format!("{persona_name}:"),
        format!("{lower}:"),
        format!("{capitalized}:"),
    ];

    // Stripped in a loop so a doubled prefix can't survive one pass;
    // that keeps the whole transform idempotent.
    let mut text = cleaned.trim();
    loop {
        let mut stripped = false;
        for prefix in &prefixes {
            if let Some(rest) = text.strip_prefix(prefix.as_str()) {
                text = rest.trim_start();
                stripped = true;
                break;
            }
        }
        if !stripped {
            break;
        }
    }

    text.trim().to_string()
}

/// Remove every `*span*` where the span is non-empty and asterisk-free.
///
/// Single-pass, left to right, matching non-overlapping pairs.
fn strip_asterisk_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('*') {
        let after = &rest[start + 1..];
        match after.find('*') {
            // Empty pair ("**") is not a span; keep the first asterisk
            Some(0) => {
                out.push_str(&rest[..start + 1]);
                rest = after;
            }
            Some(len) => {
                out.push_str(&rest[..start]);
                rest = &after[len + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Remove every case-insensitive occurrence of an ASCII phrase
fn strip_phrase_ci(text: &str, phrase: &str) -> String {
    let needle = phrase.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = find_ci(rest, needle) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + needle.len()..];
    }
    out.push_str(rest);
    out
}

/// Byte offset of the first case-insensitive match of an ASCII needle.
///
/// A match always starts on an ASCII byte, so the offset is a valid char
/// boundary.
fn find_ci(haystack: &str, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
