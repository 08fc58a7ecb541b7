//! Compact forward-diff encoding used by `get_original_body`'s
//! `diff_to_latest` field. Replaces the original's `diffmatchpatch` delta
//! syntax (not part of this crate's ecosystem) with a `similar`-based
//! opcode string; see DESIGN.md for the substitution rationale.

use similar::TextDiff;

/// Encodes the forward diff from `original` to `current` as a
/// semicolon-separated list of `<tag>:<old_start>-<old_end>:<new_start>-<new_end>`
/// triples, with an `=<text>` suffix on `insert`/`replace` segments carrying
/// the literal replacement text.
pub fn encode_delta(original: &str, current: &str) -> String {
    let diff = TextDiff::from_chars(original, current);
    let mut parts = Vec::new();

    for op in diff.ops() {
        let old_range = op.old_range();
        let new_range = op.new_range();
        let tag = match op.tag() {
            similar::DiffTag::Equal => "eq",
            similar::DiffTag::Delete => "del",
            similar::DiffTag::Insert => "ins",
            similar::DiffTag::Replace => "replace",
        };
        let mut part = format!(
            "{tag}:{}-{}:{}-{}",
            old_range.start, old_range.end, new_range.start, new_range.end
        );
        if matches!(op.tag(), similar::DiffTag::Insert | similar::DiffTag::Replace) {
            let text: String = current.chars().skip(new_range.start).take(new_range.len()).collect();
            part.push('=');
            part.push_str(&text);
        }
        parts.push(part);
    }

    parts.join(";")
}

/// True if applying the encoded delta's insert/replace text back over
/// `original` at the recorded ranges reproduces `current`. Used by tests
/// rather than at runtime — the gateway only ever emits deltas, it never
/// needs to apply one.
#[cfg(test)]
fn reconstructs(original: &str, current: &str, delta: &str) -> bool {
    let original_chars: Vec<char> = original.chars().collect();
    let mut out = String::new();
    for part in delta.split(';').filter(|p| !p.is_empty()) {
        let (head, text) = match part.split_once('=') {
            Some((h, t)) => (h, Some(t)),
            None => (part, None),
        };
        let mut segments = head.splitn(2, ':');
        let tag = segments.next().unwrap_or_default();
        let old_range = segments.next().unwrap_or_default();
        let (start, end) = old_range.split_once('-').unwrap_or(("0", "0"));
        let start: usize = start.parse().unwrap_or(0);
        let end: usize = end.parse().unwrap_or(0);
        match tag {
            "eq" => out.extend(&original_chars[start..end]),
            "ins" | "replace" => out.push_str(text.unwrap_or_default()),
            "del" => {}
            _ => return false,
        }
    }
    out == current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_yield_single_equal_segment() {
        let delta = encode_delta("hello world", "hello world");
        assert!(delta.starts_with("eq:"));
        assert!(reconstructs("hello world", "hello world", &delta));
    }

    #[test]
    fn appended_text_round_trips() {
        let delta = encode_delta("hello", "hello world");
        assert!(reconstructs("hello", "hello world", &delta));
    }

    #[test]
    fn replaced_word_round_trips() {
        let delta = encode_delta("the quick fox", "the slow fox");
        assert!(reconstructs("the quick fox", "the slow fox", &delta));
    }

    #[test]
    fn deleted_text_round_trips() {
        let delta = encode_delta("hello there world", "hello world");
        assert!(reconstructs("hello there world", "hello world", &delta));
    }
}
