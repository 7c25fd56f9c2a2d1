//! Search text tokenizer.
//!
//! Turns the free-text search box content into a keyword plus tag filters.
//! Tags are written inline as `#tag` or, when they contain spaces, as
//! `"#tag with space"` / `'#tag with space'`.
//!
//! Parsing is two sequential scans and the order matters:
//!
//! 1. the quoted scan runs first over the raw text and removes every match;
//! 2. the unquoted scan runs over what is left.
//!
//! So in `"#a b"` the quoted form wins even though `#a` alone would also be a
//! valid unquoted tag.

use crate::types::query::SearchQuery;

/// Parses a raw search string into a [`SearchQuery`].
pub fn parse(raw: &str) -> SearchQuery {
    let mut tags = Vec::new();

    let rest = extract_quoted(raw, &mut tags);
    let rest = extract_unquoted(&rest, &mut tags);

    SearchQuery {
        keyword: collapse_whitespace(&rest),
        tags,
    }
}

/// Query token for a tag name, as it would be typed into the search box.
pub fn to_query_token(tag_name: &str) -> String {
    if tag_name.chars().any(char::is_whitespace) {
        format!("\"#{}\"", tag_name)
    } else {
        format!("#{}", tag_name)
    }
}

/// Appends a tag filter to existing search text.
///
/// Returns `None` when the token already occurs in `search`.
pub fn append_tag_filter(search: &str, tag_name: &str) -> Option<String> {
    let token = to_query_token(tag_name);
    if search.contains(&token) {
        return None;
    }
    Some(format!("{} {}", search, token).trim().to_string())
}

/// Normalizes a comma separated tag list as entered in a form field.
///
/// Names are lowercased, inner whitespace runs collapse to one space and
/// empty entries are dropped.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(',')
        .map(collapse_whitespace)
        .filter(|name| !name.is_empty())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// First scan: `'#text'` or `"#text"`, where text is a non-empty run of
/// non-quote characters. Either quote character may open or close.
fn extract_quoted(input: &str, tags: &mut Vec<String>) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut rest = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if is_quote(chars[i]) && chars.get(i + 1) == Some(&'#') {
            let start = i + 2;
            let mut end = start;
            while end < chars.len() && !is_quote(chars[end]) {
                end += 1;
            }
            // `end` sits on the closing quote when one exists
            if end > start && end < chars.len() {
                tags.push(chars[start..end].iter().collect());
                i = end + 1;
                continue;
            }
        }
        rest.push(chars[i]);
        i += 1;
    }

    rest
}

/// Second scan: start of text or a whitespace run, then `#`, then a
/// non-empty run of non-whitespace. The leading whitespace is removed along
/// with the tag.
fn extract_unquoted(input: &str, tags: &mut Vec<String>) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut rest = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if let Some((start, end)) = match_unquoted(&chars, i) {
            tags.push(chars[start..end].iter().collect());
            i = end;
            continue;
        }
        rest.push(chars[i]);
        i += 1;
    }

    rest
}

/// Tries an unquoted tag match beginning exactly at `i`.
/// Returns the char range of the tag name.
fn match_unquoted(chars: &[char], i: usize) -> Option<(usize, usize)> {
    let tag_after = |hash: usize| -> Option<(usize, usize)> {
        if chars.get(hash) != Some(&'#') {
            return None;
        }
        let start = hash + 1;
        let mut end = start;
        while end < chars.len() && !chars[end].is_whitespace() {
            end += 1;
        }
        (end > start).then_some((start, end))
    };

    if i == 0 {
        if let Some(range) = tag_after(0) {
            return Some(range);
        }
    }

    let mut hash = i;
    while hash < chars.len() && chars[hash].is_whitespace() {
        hash += 1;
    }
    if hash == i {
        return None;
    }
    tag_after(hash)
}
