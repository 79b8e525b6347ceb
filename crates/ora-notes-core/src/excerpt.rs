//! Rune-safe excerpt extraction shared by every index backend.
//!
//! Excerpts are computed at query time from the note content and are never
//! stored. Truncation counts `char`s (Unicode scalar values), so a
//! multi-byte code point is never split.
//!
//! # Example
//!
//! ```rust
//! use ora_notes_core::excerpt::excerpt;
//!
//! assert_eq!(excerpt("  hello world  ", 5), "hello");
//! assert_eq!(excerpt("短いメモ", 160), "短いメモ");
//! ```

/// Default excerpt length in runes.
pub const DEFAULT_EXCERPT_RUNES: usize = 160;

/// Trim `content` and keep at most `max_runes` chars of the prefix.
///
/// Empty content or `max_runes == 0` yields an empty string.
pub fn excerpt(content: &str, max_runes: usize) -> String {
    if max_runes == 0 {
        return String::new();
    }
    let trimmed = content.trim();
    match trimmed.char_indices().nth(max_runes) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

/// Like [`excerpt`], but slides the window so the first case-insensitive
/// occurrence of `keyword` sits near its middle.
///
/// Falls back to the prefix excerpt when the keyword is empty or absent.
pub fn centered_excerpt(content: &str, keyword: &str, max_runes: usize) -> String {
    if max_runes == 0 {
        return String::new();
    }
    let trimmed = content.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= max_runes {
        return trimmed.to_string();
    }

    let needle: Vec<char> = keyword.trim().to_lowercase().chars().collect();
    let Some(hit) = find_ignore_case(&chars, &needle) else {
        return excerpt(trimmed, max_runes);
    };

    let start = hit
        .saturating_sub(max_runes / 2)
        .min(chars.len() - max_runes);
    chars[start..start + max_runes].iter().collect()
}

/// Char position of the first match of an already lower-cased needle.
fn find_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    (0..haystack.len()).find(|&i| {
        let mut lowered = haystack[i..].iter().flat_map(|c| c.to_lowercase());
        needle.iter().all(|n| lowered.next() == Some(*n))
    })
}
