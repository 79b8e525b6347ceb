//! Tag normalization and parsing.
//!
//! Tags are case-insensitive labels. The canonical form is trimmed and
//! lower-cased; empty labels are dropped.

/// Canonical form of a tag.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Split a comma-separated list such as `"dev, test,,"` into tags.
pub fn parse_tag_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(normalize_tag)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Collect `#tag` words from note content.
///
/// A word is a whitespace-separated token starting with `#` and longer
/// than the `#` itself.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    content
        .split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .map(normalize_tag)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Union of two tag lists in first-seen order, without duplicates.
pub fn merge_tags(a: &[String], b: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(a.len() + b.len());
    for tag in a.iter().chain(b.iter()) {
        let t = normalize_tag(tag);
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Queried tags that the note carries, in query order and caller casing.
pub fn tag_matches(note_tags: &[String], queried: &[String]) -> Vec<String> {
    let have: Vec<String> = note_tags.iter().map(|t| normalize_tag(t)).collect();
    queried
        .iter()
        .filter(|q| have.contains(&normalize_tag(q)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tag_list_drops_blanks() {
        assert_eq!(parse_tag_list("dev, Test,,  "), vec!["dev", "test"]);
        assert!(parse_tag_list("").is_empty());
    }

    #[test]
    fn hashtags_are_extracted() {
        let tags = extract_hashtags("ship the #release today #Ops # not#tag");
        assert_eq!(tags, vec!["release", "ops"]);
    }

    #[test]
    fn merge_dedupes_case_insensitively() {
        let merged = merge_tags(
            &["Dev".to_string(), "test".to_string()],
            &["dev".to_string(), "life".to_string()],
        );
        assert_eq!(merged, vec!["dev", "test", "life"]);
    }

    #[test]
    fn tag_matches_keeps_query_casing() {
        let note = vec!["dev".to_string(), "test".to_string()];
        let got = tag_matches(&note, &["DEV".to_string(), "life".to_string()]);
        assert_eq!(got, vec!["DEV".to_string()]);
    }
}
