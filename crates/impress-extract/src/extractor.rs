// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Five independent pattern passes over message text.
//!
//! Each pass compiles its regex once, scans the whole text, and emits
//! matches on its own. Passes stay separate so each can be tested and tuned
//! in isolation; matches from different passes may overlap in the source
//! text and are all retained.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use impress_core::MentionType;
use impress_uri::ArtifactUri;

/// Context window radius in characters on each side of a match.
pub const CONTEXT_RADIUS: usize = 50;

/// Direct scheme URIs embedded in text.
static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"impress://[A-Za-z0-9][A-Za-z0-9._\-]*/[A-Za-z0-9~%][A-Za-z0-9._~/@%+=&?\-]*")
        .unwrap()
});

/// Bracketed cite keys shaped like `[Fowler2012]` or `[Knuth1974a]`.
static CITE_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Z][A-Za-z]+\d{4}[a-z]?)\]").unwrap());

/// DOIs in `doi:` or `https://doi.org/` form.
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:doi:|https?://doi\.org/)(10\.\d{4,9}/\S+)").unwrap()
});

/// New-style arXiv identifiers in `arXiv:` or `https://arxiv.org/abs/` form.
static ARXIV_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:arxiv:|https?://arxiv\.org/abs/)(\d{4}\.\d{4,5}(?:v\d+)?)").unwrap()
});

/// GitHub/GitLab repository URLs with optional commit or tree pins.
static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(github\.com|gitlab\.com)/([A-Za-z0-9_](?:[A-Za-z0-9_.\-]*[A-Za-z0-9_])?)/([A-Za-z0-9_](?:[A-Za-z0-9_.\-]*[A-Za-z0-9_])?)(?:/(?:commit|tree)/([0-9a-fA-F]{4,40}))?",
    )
    .unwrap()
});

/// Sentence punctuation that the permissive URI/DOI patterns can swallow.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '\'', '"'];

/// One reference found in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMention {
    pub uri: ArtifactUri,
    pub mention_type: MentionType,
    /// Character offset of the match span in the source text.
    pub offset: usize,
    /// Character length of the match span.
    pub length: usize,
    /// Surrounding text window, with `...` markers where truncated.
    pub context: String,
}

/// Scan `text` for artifact references.
///
/// `known_uris` holds the canonical URI strings already attached to or
/// mentioned in the conversation; it decides whether a match introduces a
/// new artifact or refers back to a known one. Output order is
/// deterministic: passes run in a fixed order, matches in text order within
/// each pass.
pub fn extract_mentions(text: &str, known_uris: &HashSet<String>) -> Vec<ExtractedMention> {
    let mut mentions = Vec::new();
    extract_direct_uris(text, known_uris, &mut mentions);
    extract_cite_keys(text, known_uris, &mut mentions);
    extract_dois(text, &mut mentions);
    extract_arxiv_ids(text, &mut mentions);
    extract_repo_links(text, known_uris, &mut mentions);
    debug!(count = mentions.len(), "extracted mentions from message text");
    mentions
}

fn extract_direct_uris(text: &str, known: &HashSet<String>, out: &mut Vec<ExtractedMention>) {
    for m in URI_PATTERN.find_iter(text) {
        let trimmed = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        let Some(uri) = ArtifactUri::parse(trimmed) else {
            continue;
        };
        let canonical = uri.to_string();
        let mention_type = if known.contains(&canonical) {
            MentionType::Referenced
        } else {
            MentionType::Introduced
        };
        push_mention(text, m.start(), m.start() + trimmed.len(), uri, mention_type, out);
    }
}

fn extract_cite_keys(text: &str, known: &HashSet<String>, out: &mut Vec<ExtractedMention>) {
    for caps in CITE_KEY_PATTERN.captures_iter(text) {
        let whole = caps.get(0).expect("match group 0 always present");
        let key = &caps[1];
        let uri = ArtifactUri::paper(key);
        let mention_type = if known.contains(&uri.to_string()) {
            MentionType::Cited
        } else {
            MentionType::Introduced
        };
        push_mention(text, whole.start(), whole.end(), uri, mention_type, out);
    }
}

fn extract_dois(text: &str, out: &mut Vec<ExtractedMention>) {
    for caps in DOI_PATTERN.captures_iter(text) {
        let whole = caps.get(0).expect("match group 0 always present");
        let raw_doi = caps.get(1).expect("DOI capture group").as_str();
        let doi = raw_doi.trim_end_matches(TRAILING_PUNCTUATION);
        let uri = ArtifactUri::new("doi", doi);
        let end = whole.end() - (raw_doi.len() - doi.len());
        // DOIs are raw identifiers, not yet resolved to a canonical
        // artifact: always a citation, never an introduction.
        push_mention(text, whole.start(), end, uri, MentionType::Cited, out);
    }
}

fn extract_arxiv_ids(text: &str, out: &mut Vec<ExtractedMention>) {
    for caps in ARXIV_PATTERN.captures_iter(text) {
        let whole = caps.get(0).expect("match group 0 always present");
        let id = &caps[1];
        let uri = ArtifactUri::new("arxiv", id);
        // Same asymmetry as DOIs: raw identifiers are always citations.
        push_mention(text, whole.start(), whole.end(), uri, MentionType::Cited, out);
    }
}

fn extract_repo_links(text: &str, known: &HashSet<String>, out: &mut Vec<ExtractedMention>) {
    for caps in REPO_PATTERN.captures_iter(text) {
        let whole = caps.get(0).expect("match group 0 always present");
        let host = &caps[1];
        let owner = &caps[2];
        let repo = &caps[3];
        let commit = caps.get(4).map(|m| m.as_str()).unwrap_or("HEAD");
        let uri = ArtifactUri::repository(host, owner, repo, Some(commit));
        let mention_type = if known.contains(&uri.to_string()) {
            MentionType::Referenced
        } else {
            MentionType::Introduced
        };
        push_mention(text, whole.start(), whole.end(), uri, mention_type, out);
    }
}

/// Convert a byte span to character coordinates, build the context window,
/// and append the mention.
fn push_mention(
    text: &str,
    byte_start: usize,
    byte_end: usize,
    uri: ArtifactUri,
    mention_type: MentionType,
    out: &mut Vec<ExtractedMention>,
) {
    let offset = text[..byte_start].chars().count();
    let length = text[byte_start..byte_end].chars().count();
    let context = context_snippet(text, offset, length);
    out.push(ExtractedMention {
        uri,
        mention_type,
        offset,
        length,
        context,
    });
}

/// Fixed-radius window around a match, with ellipsis markers where the
/// window was truncated by the string boundaries.
fn context_snippet(text: &str, offset: usize, length: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let begin = offset.saturating_sub(CONTEXT_RADIUS);
    let end = (offset + length + CONTEXT_RADIUS).min(chars.len());

    let mut snippet = String::new();
    if begin > 0 {
        snippet.push_str("...");
    }
    snippet.extend(&chars[begin..end]);
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(uris: &[&str]) -> HashSet<String> {
        uris.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bracketed_cite_key_new_is_introduced() {
        let mentions = extract_mentions("See [Fowler2012] for details.", &HashSet::new());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].uri.to_string(), "impress://imbib/papers/Fowler2012");
        assert_eq!(mentions[0].mention_type, MentionType::Introduced);
        // Span covers the brackets.
        assert_eq!(mentions[0].offset, 4);
        assert_eq!(mentions[0].length, "[Fowler2012]".chars().count());
    }

    #[test]
    fn bracketed_cite_key_known_is_cited() {
        let mentions = extract_mentions(
            "See [Fowler2012] for details.",
            &known(&["impress://imbib/papers/Fowler2012"]),
        );
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].mention_type, MentionType::Cited);
    }

    #[test]
    fn cite_key_shape_is_strict() {
        // Lowercase start, no year, too few digits: none of these match.
        let text = "[fowler2012] [Fowler] [Fo12] [F2012]";
        assert!(extract_mentions(text, &HashSet::new()).is_empty());
        // Optional lowercase disambiguation letter is accepted.
        let mentions = extract_mentions("[Knuth1974a]", &HashSet::new());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].uri.to_string(), "impress://imbib/papers/Knuth1974a");
    }

    #[test]
    fn doi_prefix_form_is_always_cited() {
        let mentions = extract_mentions("doi:10.1038/nature12373 shows...", &HashSet::new());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].uri.provider(), "doi");
        assert_eq!(mentions[0].uri.resource_path(), "10.1038/nature12373");
        assert_eq!(mentions[0].mention_type, MentionType::Cited);
    }

    #[test]
    fn doi_url_form_and_trailing_punctuation() {
        let mentions =
            extract_mentions("Read https://doi.org/10.1000/xyz123, then reply.", &HashSet::new());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].uri.resource_path(), "10.1000/xyz123");
    }

    #[test]
    fn doi_stays_cited_even_when_unknown() {
        // The asymmetry is deliberate: raw identifiers never introduce.
        let mentions = extract_mentions("doi:10.1234/abc", &HashSet::new());
        assert_eq!(mentions[0].mention_type, MentionType::Cited);
    }

    #[test]
    fn arxiv_prefix_and_url_forms() {
        let mentions = extract_mentions(
            "arXiv:2401.01234v2 and https://arxiv.org/abs/1706.03762",
            &HashSet::new(),
        );
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].uri.provider(), "arxiv");
        assert_eq!(mentions[0].uri.resource_path(), "2401.01234v2");
        assert_eq!(mentions[0].mention_type, MentionType::Cited);
        assert_eq!(mentions[1].uri.resource_path(), "1706.03762");
    }

    #[test]
    fn repo_url_without_commit_defaults_to_head() {
        let mentions =
            extract_mentions("Check https://github.com/rust-lang/regex out", &HashSet::new());
        assert_eq!(mentions.len(), 1);
        assert_eq!(
            mentions[0].uri.to_string(),
            "impress://repos/github.com/rust-lang/regex@HEAD"
        );
        assert_eq!(mentions[0].mention_type, MentionType::Introduced);
    }

    #[test]
    fn repo_url_with_commit_pin() {
        let mentions = extract_mentions(
            "https://gitlab.com/group/proj/commit/abc123def",
            &HashSet::new(),
        );
        assert_eq!(mentions.len(), 1);
        assert_eq!(
            mentions[0].uri.to_string(),
            "impress://repos/gitlab.com/group/proj@abc123def"
        );
    }

    #[test]
    fn known_repo_is_referenced() {
        let mentions = extract_mentions(
            "Again: https://github.com/foo/bar",
            &known(&["impress://repos/github.com/foo/bar@HEAD"]),
        );
        assert_eq!(mentions[0].mention_type, MentionType::Referenced);
    }

    #[test]
    fn direct_uri_new_vs_known() {
        let text = "Attach impress://imprint/documents/d1 here.";
        let fresh = extract_mentions(text, &HashSet::new());
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].uri.to_string(), "impress://imprint/documents/d1");
        assert_eq!(fresh[0].mention_type, MentionType::Introduced);

        let seen = extract_mentions(text, &known(&["impress://imprint/documents/d1"]));
        assert_eq!(seen[0].mention_type, MentionType::Referenced);
    }

    #[test]
    fn direct_uri_with_version_and_trailing_period() {
        let text = "Pinned at impress://repos/github.com/a/b@abc123.";
        let mentions = extract_mentions(text, &HashSet::new());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].uri.version(), Some("abc123"));
    }

    #[test]
    fn overlapping_matches_are_all_retained() {
        // A doi.org URL is not an impress URI, but a message can carry both
        // forms; no mutual-exclusion pass runs between the families.
        let text = "impress://imbib/papers/Fowler2012 aka [Fowler2012] aka doi:10.1000/f12";
        let mentions = extract_mentions(text, &HashSet::new());
        assert_eq!(mentions.len(), 3);
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "See [A2020] and https://github.com/x/y plus doi:10.1/z";
        let set = known(&["impress://imbib/papers/A2020"]);
        let first = extract_mentions(text, &set);
        let second = extract_mentions(text, &set);
        assert_eq!(first, second);
    }

    #[test]
    fn context_snippet_truncation_markers() {
        let padding = "x".repeat(80);
        let text = format!("{padding} [Mid2021] {padding}");
        let mentions = extract_mentions(&text, &HashSet::new());
        assert_eq!(mentions.len(), 1);
        let context = &mentions[0].context;
        assert!(context.starts_with("..."));
        assert!(context.ends_with("..."));
        assert!(context.contains("[Mid2021]"));

        // Near the string start no leading marker appears.
        let mentions = extract_mentions("[Early2020] and then some text", &HashSet::new());
        assert!(!mentions[0].context.starts_with("..."));
    }

    #[test]
    fn offsets_are_character_counts_not_bytes() {
        // Multi-byte characters before the match shift byte offsets but not
        // character offsets.
        let text = "héllo wörld [Zurich2023]";
        let mentions = extract_mentions(text, &HashSet::new());
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].offset, 12);
        assert_eq!(mentions[0].length, "[Zurich2023]".chars().count());
    }

    #[test]
    fn plain_text_yields_nothing() {
        let mentions = extract_mentions(
            "Nothing to see here, just prose about papers and repos.",
            &HashSet::new(),
        );
        assert!(mentions.is_empty());
    }
}
