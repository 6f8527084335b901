use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("Invalid tag regex"));

const MARK_OPEN: &str = "<mark class=\"search-highlight\">";
const MARK_CLOSE: &str = "</mark>";

/// Wraps case-insensitive occurrences of `term` in `<mark>`.
///
/// Only text between tags is searched, entities are never split, and text
/// already inside a highlight is left alone, so highlighting twice gives
/// the same result as highlighting once.
pub fn highlight_search_term(html: &str, term: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        return html.to_string();
    }

    // The term is matched against escaped text, so escape it the same way.
    // Entities are an alternative so a match can never start inside one.
    let escaped = html_escape::encode_text(term);
    let pattern = format!(
        "(?P<term>{})|&(?:#[0-9A-Za-z]+|[A-Za-z][A-Za-z0-9]*);",
        regex::escape(&escaped)
    );
    let Ok(matcher) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        log::warn!("Could not build search pattern for {term:?}");
        return html.to_string();
    };

    let mut out = String::with_capacity(html.len());
    let mut depth = 0usize;
    let mut last = 0;

    for tag in TAG.find_iter(html) {
        out.push_str(&mark_text(&html[last..tag.start()], &matcher, depth));
        let tag_text = tag.as_str();
        if tag_text == MARK_OPEN {
            depth += 1;
        } else if tag_text == MARK_CLOSE && depth > 0 {
            depth -= 1;
        }
        out.push_str(tag_text);
        last = tag.end();
    }
    out.push_str(&mark_text(&html[last..], &matcher, depth));
    out
}

fn mark_text(text: &str, matcher: &Regex, depth: usize) -> String {
    if depth > 0 || text.is_empty() {
        return text.to_string();
    }
    matcher
        .replace_all(text, |caps: &Captures| match caps.name("term") {
            Some(found) => format!("{MARK_OPEN}{}{MARK_CLOSE}", found.as_str()),
            None => caps[0].to_string(),
        })
        .into_owned()
}
