// crates/geoindex-core/src/search.rs
//! Substring scoring over compiled keys.

use crate::config::DBConfig;
use crate::index::SecondaryIndex;
use crate::text::{count_occurrences, decode};

/// Phrase delimiters; every one of them splits the phrase independently.
pub const DELIMITERS: [char; 3] = [',', ' ', '.'];

/// Removes `prefix` followed by `glue` (or `prefix` alone) from the front of `s`.
pub fn strip_prefix<'a>(s: &'a str, prefix: &str, glue: &str) -> &'a str {
    if prefix.is_empty() {
        return s;
    }
    match s.strip_prefix(prefix) {
        Some("") => "",
        Some(rest) => rest.strip_prefix(glue).unwrap_or(s),
        None => s,
    }
}

/// Relevance of `candidate` for `phrase`.
///
/// For each delimiter the phrase is split into non-empty tokens and every
/// occurrence of a token inside the candidate adds one. A token that contains
/// none of the delimiters is therefore counted once per delimiter.
pub fn score(phrase: &str, candidate: &str) -> usize {
    DELIMITERS
        .iter()
        .map(|d| {
            phrase
                .split(*d)
                .filter(|token| !token.is_empty())
                .map(|token| count_occurrences(candidate, token))
                .sum::<usize>()
        })
        .sum()
}

/// Ranks the keys of `locale` (only those at `level` when given) against
/// `phrase` and returns page `page` of the result.
///
/// Equal scores keep index order: levels ascending, then keys
/// lexicographic. A page that starts at or past the end is empty.
pub fn search(
    index: &SecondaryIndex,
    config: &DBConfig,
    phrase: &str,
    page: usize,
    max_results: usize,
    locale: &str,
    level: Option<i32>,
) -> Vec<String> {
    let prefix = config.prefix_key();
    let glue = config.section_glue.as_str();
    let decoded = decode(phrase);
    let phrase = strip_prefix(&decoded, &decode(&prefix), glue);

    let mut hits: Vec<(usize, &str)> = index
        .keys(locale, level)
        .into_iter()
        .filter_map(|(_, key)| {
            let s = score(phrase, strip_prefix(key, &prefix, glue));
            (s > 0).then_some((s, key))
        })
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0));

    paginate(hits, page, max_results)
        .into_iter()
        .map(|(_, key)| key.to_string())
        .collect()
}

/// Slice `page` of `items`, or nothing when `items.len() <= page * max_results`.
pub fn paginate<T>(items: Vec<T>, page: usize, max_results: usize) -> Vec<T> {
    let start = page.saturating_mul(max_results);
    if items.len() > start {
        items.into_iter().skip(start).take(max_results).collect()
    } else {
        Vec::new()
    }
}
