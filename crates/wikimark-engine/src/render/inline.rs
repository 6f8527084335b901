//! Categories, hashtags and emphasis.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape;
use super::stash::Stash;
use super::LinkEncoder;

/// `#tag`, where a tag is a run of word characters with single internal
/// spaces. It must start a line or follow whitespace or a closing `>`, which
/// keeps entities (`&#39;`), URL fragments and `(#anchor)` targets out.
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^|[\s>])#(\w+(?: \w+)*)").expect("Invalid hashtag regex")
});

static WIKI_BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--([^\s-](?:[^\n]*?[^\s-])?)--").expect("Invalid wiki bold regex")
});

static STRIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"~~([^\s~](?:[^\n]*?[^\s~])?)~~").expect("Invalid strikethrough regex")
});

static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*").expect("Invalid bold regex")
});

static ITALIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^\s*](?:[^\n*]*?[^\s*])?)\*").expect("Invalid italic regex")
});

/// Builds the `[[분류:Name]]` pattern for a category prefix.
pub fn category_pattern(prefix: &str) -> Regex {
    Regex::new(&format!(
        r"\[\[[ \t]*{}[ \t]*:[ \t]*([^\[\]|]+?)[ \t]*\]\]",
        regex::escape(prefix)
    ))
    .expect("Escaped category prefix always forms a valid regex")
}

/// Replaces category declarations with category links. A declaration on a
/// line of its own becomes a block; one inside running text stays inline.
pub fn categories(
    text: &str,
    pattern: &Regex,
    prefix: &str,
    links: &dyn LinkEncoder,
    stash: &mut Stash,
    found: &mut Vec<String>,
) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            let name = escape::decode(&stash.restore(&caps[1]));
            let href = links.encode(&format!("{prefix}:{name}"));
            if !found.contains(&name) {
                found.push(name);
            }
            let label = format!(
                "<span class=\"wiki-category-label\">{}</span>: \
                 <a class=\"wiki-category-link\" href=\"{}\">{}</a>",
                escape::code(prefix),
                escape::attribute(&href),
                &caps[1],
            );
            match caps.get(0) {
                Some(m) if alone_on_line(text, m.start(), m.end()) => {
                    stash.block(format!("<div class=\"wiki-category\">{label}</div>"))
                }
                _ => stash.inline(format!("<span class=\"wiki-category\">{label}</span>")),
            }
        })
        .into_owned()
}

fn alone_on_line(text: &str, start: usize, end: usize) -> bool {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    text[line_start..start].trim().is_empty() && text[end..line_end].trim().is_empty()
}

/// Turns hashtags into clickable tag spans.
pub fn hashtags(text: &str, stash: &mut Stash, found: &mut Vec<String>) -> String {
    HASHTAG
        .replace_all(text, |caps: &Captures| {
            let tag = &caps[2];
            let decoded = escape::decode(tag);
            if !found.contains(&decoded) {
                found.push(decoded);
            }
            let span = stash.inline(format!(
                "<span class=\"wiki-tag\" role=\"link\" tabindex=\"0\" data-tag=\"{}\">#{tag}</span>",
                escape::attribute(tag)
            ));
            format!("{}{span}", &caps[1])
        })
        .into_owned()
}

/// `--bold--` and `~~strike~~`, the wiki forms of emphasis.
pub fn wiki_emphasis(text: &str) -> String {
    let bold = WIKI_BOLD.replace_all(text, "<strong>$1</strong>");
    STRIKE.replace_all(&bold, "<del>$1</del>").into_owned()
}

/// `**bold**` then `*italic*`; bold goes first so paired double asterisks
/// are never read as two italics.
pub fn emphasis(text: &str) -> String {
    let bold = BOLD.replace_all(text, "<strong>$1</strong>");
    ITALIC.replace_all(&bold, "<em>$1</em>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("**bold** and *italic*", "<strong>bold</strong> and <em>italic</em>")]
    #[case("**a *b* c**", "<strong>a <em>b</em> c</strong>")]
    #[case("2 * 3 * 4", "2 * 3 * 4")]
    #[case("**unclosed", "**unclosed")]
    fn markdown_emphasis(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(emphasis(input), expected);
    }

    #[rstest]
    #[case("--bold--", "<strong>bold</strong>")]
    #[case("~~gone~~", "<del>gone</del>")]
    #[case("-----", "-----")]
    #[case("a -- b -- c", "a -- b -- c")]
    fn wiki_emphasis_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(wiki_emphasis(input), expected);
    }

    #[rstest]
    #[case("a tag #demo.", vec!["demo"])]
    #[case("#first line", vec!["first line"])]
    #[case("#a #b", vec!["a", "b"])]
    #[case("&#39; and http://x.io/#frag and (#anchor)", vec![])]
    #[case("#한글태그", vec!["한글태그"])]
    fn hashtag_boundaries(#[case] input: &str, #[case] expected: Vec<&str>) {
        let mut stash = Stash::new();
        let mut found = Vec::new();
        hashtags(input, &mut stash, &mut found);
        assert_eq!(found, expected);
    }

    #[test]
    fn hashtag_renders_clickable_span() {
        let mut stash = Stash::new();
        let mut found = Vec::new();
        let text = hashtags("see #demo.", &mut stash, &mut found);
        assert_eq!(
            stash.restore(&text),
            "see <span class=\"wiki-tag\" role=\"link\" tabindex=\"0\" data-tag=\"demo\">#demo</span>."
        );
    }

    #[test]
    fn category_becomes_block_linking_to_category_page() {
        let pattern = category_pattern("분류");
        let links = |title: &str| format!("/w/{title}");
        let mut stash = Stash::new();
        let mut found = Vec::new();
        let text = categories("[[분류:Rust]]", &pattern, "분류", &links, &mut stash, &mut found);

        assert!(stash.is_block_token(&text));
        assert_eq!(found, vec!["Rust"]);
        assert!(stash.restore(&text).contains("href=\"/w/분류:Rust\""));
    }

    #[test]
    fn category_inside_running_text_stays_inline() {
        let pattern = category_pattern("분류");
        let links = |title: &str| format!("/w/{title}");
        let mut stash = Stash::new();
        let mut found = Vec::new();
        let text = categories(
            "text [[분류:X]] more\n  [[분류:Y]]  ",
            &pattern,
            "분류",
            &links,
            &mut stash,
            &mut found,
        );

        let lines: Vec<&str> = text.split('\n').collect();
        assert!(!stash.starts_with_block(lines[0]));
        assert!(stash.restore(lines[0]).starts_with("text <span class=\"wiki-category\">"));
        assert!(stash.is_block_token(lines[1].trim()));
        assert_eq!(found, vec!["X", "Y"]);
    }
}
