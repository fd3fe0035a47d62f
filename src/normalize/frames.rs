//! Tokenizer for the agent's streaming wire format.
//!
//! A streamed body is a sequence of `<label>:<value>` frames, usually one per
//! line: `0:"text"` carries reply text, letter labels (`f:`, `e:`, `d:`, `a:`)
//! and other numeric labels (`9:`) carry step, finish, and tool metadata.
//! Tool results and partially rendered JSON also leak bare `key:value` pairs
//! (`temperature:72`) into otherwise plain text, and into text frames.
//!
//! [`tokenize`] splits any input into text to keep and metadata to discard.
//! [`strip_metadata_pairs`] applies the bare-pair rule to decoded frame text.
//! Input that contains no frames comes back as a single [`Frame::Plain`].

/// Metadata keys stripped when they appear as bare `key:value` pairs.
pub const BARE_METADATA_KEYS: &[&str] = &[
    "toolCallId",
    "isContinued",
    "temperature",
    "feelsLike",
    "humidity",
    "windSpeed",
    "windGust",
    "conditions",
    "location",
];

/// Metadata keys stripped only when their value is a `{..}` object.
pub const OBJECT_METADATA_KEYS: &[&str] = &["result"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Decoded payload of a numeric text frame such as `0:"It is sunny"`.
    Text(String),
    /// Input between frames, still raw.
    Plain(String),
    /// Discarded metadata frame or `key:value` pair.
    Metadata { label: String },
}

/// Splits `input` into frames in input order.
pub fn tokenize(input: &str) -> Vec<Frame> {
    let bytes = input.as_bytes();
    let mut frames = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if at_word_boundary(bytes, pos) {
            if let Some((frame, end)) = match_frame(input, pos) {
                push_plain(&mut frames, &input[plain_start..pos]);
                frames.push(frame);
                pos = skip_line_break(bytes, end);
                plain_start = pos;
                continue;
            }
        }
        pos += 1;
    }

    push_plain(&mut frames, &input[plain_start..]);
    frames
}

/// Blanks out bare `key:value` metadata pairs in already decoded text,
/// leaving everything else untouched.
pub fn strip_metadata_pairs(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if at_word_boundary(bytes, pos) {
            if let Some((_, end)) = match_metadata_pair(text, pos) {
                out.push_str(&text[copied..pos]);
                out.push(' ');
                pos = end;
                copied = end;
                continue;
            }
        }
        pos += 1;
    }

    out.push_str(&text[copied..]);
    out
}

fn push_plain(frames: &mut Vec<Frame>, text: &str) {
    if !text.is_empty() {
        frames.push(Frame::Plain(text.to_string()));
    }
}

fn at_word_boundary(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || !(bytes[pos - 1].is_ascii_alphanumeric() || bytes[pos - 1] == b'_')
}

fn match_frame(input: &str, pos: usize) -> Option<(Frame, usize)> {
    match_stream_frame(input, pos).or_else(|| match_metadata_pair(input, pos))
}

/// `<digits>:"..."`, `<digits>:{..}`, `<letter>:{..}`, `<letter>:".."` and the `[..]` forms.
fn match_stream_frame(input: &str, pos: usize) -> Option<(Frame, usize)> {
    let bytes = input.as_bytes();
    let digits = bytes[pos..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    let label_end = if digits > 0 {
        pos + digits
    } else if bytes[pos].is_ascii_lowercase() {
        pos + 1
    } else {
        return None;
    };

    if bytes.get(label_end) != Some(&b':') {
        return None;
    }
    let value_start = label_end + 1;
    let label = input[pos..label_end].to_string();

    match bytes.get(value_start)? {
        b'"' if digits > 0 => {
            let frame = match skip_string(bytes, value_start) {
                Some(end) => {
                    let text = serde_json::from_str::<String>(&input[value_start..end])
                        .unwrap_or_else(|_| unescape_loose(&input[value_start + 1..end - 1]));
                    (Frame::Text(text), end)
                }
                None => (
                    Frame::Text(unescape_loose(&input[value_start + 1..])),
                    bytes.len(),
                ),
            };
            Some(frame)
        }
        b'"' => {
            let end = skip_string(bytes, value_start).unwrap_or(bytes.len());
            Some((Frame::Metadata { label }, end))
        }
        b'{' | b'[' => Some((Frame::Metadata { label }, skip_balanced(bytes, value_start))),
        _ => None,
    }
}

/// `key: value` or `"key": value` for a known metadata key, plus one trailing comma.
fn match_metadata_pair(input: &str, pos: usize) -> Option<(Frame, usize)> {
    let bytes = input.as_bytes();
    let quoted = bytes[pos] == b'"';
    let key_start = if quoted { pos + 1 } else { pos };
    let key_len = bytes[key_start..]
        .iter()
        .take_while(|byte| byte.is_ascii_alphanumeric() || **byte == b'_')
        .count();
    if key_len == 0 {
        return None;
    }
    let key = &input[key_start..key_start + key_len];
    let object_only = OBJECT_METADATA_KEYS.contains(&key);
    if !object_only && !BARE_METADATA_KEYS.contains(&key) {
        return None;
    }

    let mut cursor = key_start + key_len;
    if quoted {
        if bytes.get(cursor) != Some(&b'"') {
            return None;
        }
        cursor += 1;
    }
    cursor = skip_inline_space(bytes, cursor);
    if bytes.get(cursor) != Some(&b':') {
        return None;
    }
    cursor = skip_inline_space(bytes, cursor + 1);
    if object_only && bytes.get(cursor) != Some(&b'{') {
        return None;
    }

    let mut end = match bytes.get(cursor) {
        Some(b'{' | b'[') => skip_balanced(bytes, cursor),
        Some(b'"') => skip_string(bytes, cursor).unwrap_or(bytes.len()),
        _ => {
            cursor
                + bytes[cursor..]
                    .iter()
                    .take_while(|byte| !matches!(byte, b',' | b'}' | b']' | b'\n'))
                    .count()
        }
    };
    if bytes.get(end) == Some(&b',') {
        end += 1;
    }

    Some((
        Frame::Metadata {
            label: key.to_string(),
        },
        end,
    ))
}

fn skip_inline_space(bytes: &[u8], mut pos: usize) -> usize {
    while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
        pos += 1;
    }
    pos
}

fn skip_line_break(bytes: &[u8], pos: usize) -> usize {
    match bytes.get(pos) {
        Some(b'\n') => pos + 1,
        Some(b'\r') if bytes.get(pos + 1) == Some(&b'\n') => pos + 2,
        _ => pos,
    }
}

/// Returns the index just past the closing quote of the JSON string at `start`.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return Some(pos + 1),
            _ => pos += 1,
        }
    }
    None
}

/// Returns the index just past the bracket closing the one at `start`, or the
/// input length when it never closes.
fn skip_balanced(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut pos = start;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => match skip_string(bytes, pos) {
                Some(end) => {
                    pos = end;
                    continue;
                }
                None => return bytes.len(),
            },
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return pos + 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    bytes.len()
}

/// Best-effort unescape for truncated or invalid string payloads.
pub(crate) fn unescape_loose(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
