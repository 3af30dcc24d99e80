//! Title to filename conversion (pipeline stage 3)

/// Replacement for every character that is not safe in a file name
const REPLACEMENT: char = '_';

/// Name used when a title leaves nothing usable
const FALLBACK_NAME: &str = "untitled";

/// Longest stem kept, in bytes; leaves room for an extension within the
/// 255-byte limit common to filesystems
const MAX_STEM_BYTES: usize = 200;

/// Device names Windows refuses as file stems, whatever the extension
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Turn a track title into a file stem that is safe on every supported platform
///
/// Alphanumeric characters (any script), `-`, `_`, `.`, `(` and `)` are kept;
/// everything else, including whitespace, becomes `_`. The mapping is pure,
/// so equal titles always produce equal names.
///
/// # Examples
///
/// ```
/// use track_dl::download::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("Ahsoka: End Credits!"), "Ahsoka__End_Credits_");
/// assert_eq!(sanitize_file_name("a/b\\c"), "a_b_c");
/// ```
#[must_use]
pub fn sanitize_file_name(title: &str) -> String {
    let mut out: String = title
        .chars()
        .map(|ch| if is_safe(ch) { ch } else { REPLACEMENT })
        .collect();

    truncate_at_char_boundary(&mut out, MAX_STEM_BYTES);

    if out.chars().all(|ch| ch == '.') {
        return FALLBACK_NAME.to_string();
    }

    let base_len = out.find('.').unwrap_or(out.len());
    if RESERVED_NAMES
        .iter()
        .any(|reserved| out[..base_len].eq_ignore_ascii_case(reserved))
    {
        out.insert(base_len, REPLACEMENT);
    }

    out
}

fn is_safe(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | '(' | ')')
}

fn truncate_at_char_boundary(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
