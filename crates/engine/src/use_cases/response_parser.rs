//! Normalizes raw model replies into JSON.
//!
//! Models wrap their JSON in prose, code fences and `<think>` blocks. The
//! pipeline here is: strip reasoning and special tokens, locate the first
//! balanced JSON value with a string-aware bracket scanner, then parse.
//! Callers substitute their own defaults when nothing usable comes back.

use regex_lite::Regex;
use serde_json::Value;
use std::ops::Range;
use std::sync::LazyLock;

static THINK_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<think(?:ing)?>.*?</think(?:ing)?>").expect("valid regex")
});
static THINK_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<think(?:ing)?>").expect("valid regex"));
static THINK_STRAY_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</think(?:ing)?>").expect("valid regex"));

// <|...|> style tokens that leak through some chat templates
static SPECIAL_TOKENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|[^|>]+\|>").expect("valid regex"));

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?").expect("valid regex"));

/// Which JSON shape to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
    Any,
}

impl JsonKind {
    fn opens_with(&self, byte: u8) -> bool {
        match self {
            Self::Object => byte == b'{',
            Self::Array => byte == b'[',
            Self::Any => byte == b'{' || byte == b'[',
        }
    }
}

/// Remove reasoning blocks and chat-template tokens.
///
/// An opening `<think>` with no closing tag swallows the rest of the text.
pub fn strip_thinking(raw: &str) -> String {
    let without_blocks = THINK_BLOCK_RE.replace_all(raw, "");
    let truncated = match THINK_OPEN_RE.find(&without_blocks) {
        Some(open) => &without_blocks[..open.start()],
        None => &without_blocks[..],
    };
    let without_close = THINK_STRAY_CLOSE_RE.replace_all(truncated, "");
    SPECIAL_TOKENS_RE.replace_all(&without_close, "").into_owned()
}

/// End (exclusive) of the balanced value opening at `start`, if it closes.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Byte range of the first balanced JSON value of the requested kind that
/// also parses. Stray brackets in prose are skipped over.
pub fn find_json_span(text: &str, kind: JsonKind) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let start = cursor + bytes[cursor..].iter().position(|&b| kind.opens_with(b))?;
        if let Some(end) = balanced_end(bytes, start) {
            if serde_json::from_str::<Value>(&text[start..end]).is_ok() {
                return Some(start..end);
            }
        }
        cursor = start + 1;
    }

    None
}

/// First JSON value of `kind` in a raw model reply.
pub fn extract_json(raw: &str, kind: JsonKind) -> Option<Value> {
    let cleaned = strip_thinking(raw);
    let span = find_json_span(&cleaned, kind)?;
    serde_json::from_str(&cleaned[span]).ok()
}

/// First JSON value of any kind. Clean JSON comes back unchanged.
pub fn normalize(raw: &str) -> Option<Value> {
    extract_json(raw, JsonKind::Any)
}

/// Split a prose reply from its trailing metadata object.
///
/// Returns the prose with the JSON span and code fences removed, plus the
/// parsed object when one was found.
pub fn split_prose(raw: &str) -> (String, Option<Value>) {
    let cleaned = strip_thinking(raw);
    let (prose, meta) = match find_json_span(&cleaned, JsonKind::Object) {
        Some(span) => {
            let meta = serde_json::from_str(&cleaned[span.clone()]).ok();
            let prose = format!("{}{}", &cleaned[..span.start], &cleaned[span.end..]);
            (prose, meta)
        }
        None => (cleaned, None),
    };
    (CODE_FENCE_RE.replace_all(&prose, "").trim().to_string(), meta)
}
