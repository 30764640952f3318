// src/sanitize.rs

/// Characters that are not allowed in a file name on common filesystems
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum length of a sanitized name, in characters
pub const MAX_FILENAME_CHARS: usize = 200;

/// Turn an arbitrary title into a filesystem-safe, length-bounded file name.
///
/// Reserved characters become `_`, every run of whitespace collapses into a
/// single `_`, and the result is cut to 200 characters. Distinct titles may
/// map to the same name.
pub fn sanitize(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if RESERVED_CHARS.contains(&c) {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    match out.char_indices().nth(MAX_FILENAME_CHARS) {
        Some((byte_idx, _)) => out[..byte_idx].to_string(),
        None => out,
    }
}
