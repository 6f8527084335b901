//! HTML escaping helpers.
//!
//! Page text may legitimately contain entity references and, when raw HTML
//! is allowed, literal tags. Escaping therefore leaves those intact and only
//! rewrites bare `&`, `<` and `>`, which also makes it idempotent.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::blocks;
use super::stash::Stash;

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<!--.*?-->|</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>|&(?:#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*);|[&<>]",
    )
    .expect("Invalid markup regex")
});

static QUOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:>[ \t]?)+").expect("Invalid quote prefix regex"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("Invalid tag regex"));

/// Escapes body text line by line, keeping blockquote markers at line start.
///
/// Allowed raw tags and comments are moved into the stash, so no later pass
/// can rewrite their attributes. Block-level tags become block tokens.
pub fn escape_text(text: &str, allow_raw_html: bool, stash: &mut Stash) -> String {
    let mut hold = |tag: &str| {
        if blocks::is_block_tag(tag) {
            stash.block(tag.to_string())
        } else {
            stash.inline(tag.to_string())
        }
    };

    text.split('\n')
        .map(|line| {
            let prefix_len = QUOTE_PREFIX.find(line).map_or(0, |m| m.end());
            let (prefix, rest) = line.split_at(prefix_len);
            format!("{prefix}{}", escape_with(rest, allow_raw_html, &mut hold))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escapes a single fragment of body text, leaving allowed tags in place.
pub fn escape_fragment(text: &str, allow_raw_html: bool) -> String {
    escape_with(text, allow_raw_html, &mut |tag: &str| tag.to_string())
}

fn escape_with(text: &str, allow_raw_html: bool, keep_tag: &mut dyn FnMut(&str) -> String) -> String {
    MARKUP
        .replace_all(text, |caps: &Captures| match &caps[0] {
            "&" => "&amp;".to_string(),
            "<" => "&lt;".to_string(),
            ">" => "&gt;".to_string(),
            entity if entity.starts_with('&') => entity.to_string(),
            tag if allow_raw_html => keep_tag(tag),
            tag => html_escape::encode_text(tag).into_owned(),
        })
        .into_owned()
}

/// Encodes a value for a quoted attribute. Already-escaped input is decoded
/// first so entities are not escaped twice.
pub fn attribute(value: &str) -> String {
    let decoded = html_escape::decode_html_entities(value);
    html_escape::encode_quoted_attribute(&decoded).into_owned()
}

/// Escapes raw code for a `<code>` element.
pub fn code(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

/// Reverses entity escaping, for values handed to collaborators.
pub fn decode(value: &str) -> String {
    html_escape::decode_html_entities(value).into_owned()
}

/// Drops tags, keeping only their text content.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a & b", "a &amp; b")]
    #[case("1 < 2 > 0", "1 &lt; 2 &gt; 0")]
    #[case("&amp; &lt; &#39; &#x27;", "&amp; &lt; &#39; &#x27;")]
    #[case("<b>bold</b>", "<b>bold</b>")]
    #[case("AT&T", "AT&amp;T")]
    fn escapes_only_bare_characters(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_fragment(input, true), expected);
    }

    #[test]
    fn escaping_is_idempotent() {
        let once = escape_fragment("x & y < z > w", true);
        assert_eq!(escape_fragment(&once, true), once);
    }

    #[test]
    fn raw_html_is_escaped_when_disallowed() {
        assert_eq!(
            escape_fragment("<script>x</script>", false),
            "&lt;script&gt;x&lt;/script&gt;"
        );
    }

    #[test]
    fn quote_markers_survive_escaping() {
        let mut stash = Stash::new();
        assert_eq!(
            escape_text("> a < b\nc > d", true, &mut stash),
            "> a &lt; b\nc &gt; d"
        );
    }

    #[test]
    fn raw_tags_are_held_out_of_the_text() {
        let mut stash = Stash::new();
        let text = escape_text(
            "<span style=\"color: #ff0000\">red</span><!--x-->",
            true,
            &mut stash,
        );
        assert!(!text.contains('#'));
        assert!(!text.contains("--"));
        assert_eq!(text.matches('\u{E000}').count(), 3);
        assert_eq!(
            stash.restore(&text),
            "<span style=\"color: #ff0000\">red</span><!--x-->"
        );
    }

    #[test]
    fn raw_block_tags_become_block_tokens() {
        let mut stash = Stash::new();
        let text = escape_text("<div class=\"box\">text</div>", true, &mut stash);
        assert!(stash.starts_with_block(&text));

        let text = escape_text("<b>bold</b> text", true, &mut stash);
        assert!(!stash.starts_with_block(&text));
    }

    #[test]
    fn attribute_does_not_double_escape() {
        assert_eq!(attribute("a &amp; \"b\""), "a &amp; &quot;b&quot;");
        assert!(!attribute("it's").contains('\''));
    }
}
