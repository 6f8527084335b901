//! Wiki (`= Title =`) and ATX (`# Title`) headings, heading ids and the
//! table of contents built from them.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::stash::Stash;
use super::{code, escape, footnotes};

static WIKI_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(={1,5})[ \t]*(.+?)[ \t]*(=+)[ \t]*$").expect("Invalid wiki heading regex")
});

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.*?)[ \t]*$").expect("Invalid ATX heading regex"));

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Invalid slug filter regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static WIKI_LINK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?:[^\[\]|]*\|)?([^\[\]|]+)\]\]").expect("Invalid link text regex")
});

static MARKDOWN_LINK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]]+)\]\([^()\s]+\)").expect("Invalid link text regex")
});

static EMPHASIS_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|~~|`|--").expect("Invalid emphasis regex"));

/// One heading, as listed in a table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// 1 to 6.
    pub level: u8,
    /// Heading text with inline markup removed.
    pub text: String,
    pub anchor_id: String,
    /// Line of the heading in the source text, zero-based.
    pub source_line_index: usize,
}

/// A line recognised as a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    pub level: u8,
    pub text: &'a str,
}

impl<'a> Heading<'a> {
    /// Recognises `= Text =` (levels 1 to 5, balanced) and `# Text` (1 to 6).
    pub fn parse(line: &'a str) -> Option<Self> {
        if let Some(caps) = WIKI_HEADING.captures(line) {
            let open = caps.get(1)?.as_str().len();
            let close = caps.get(3)?.as_str().len();
            let text = caps.get(2)?.as_str().trim();
            if open == close && !text.is_empty() {
                return Some(Self {
                    level: open as u8,
                    text,
                });
            }
            return None;
        }

        let caps = ATX_HEADING.captures(line)?;
        let text = caps.get(2)?.as_str().trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            level: caps.get(1)?.as_str().len() as u8,
            text,
        })
    }
}

/// Turns heading text into an anchor id: lower-cased, characters outside
/// `[\w\s-]` dropped, trimmed, whitespace runs joined by single hyphens.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let filtered = NON_SLUG.replace_all(&lowered, "");
    WHITESPACE
        .replace_all(filtered.trim(), "-")
        .into_owned()
}

/// Hands out heading ids, suffixing repeats with `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn slug(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        match *count {
            1 => base,
            n => format!("{base}-{n}"),
        }
    }
}

/// Heading text as a reader sees it: footnotes dropped, links reduced to
/// their display text, emphasis markers and tags removed.
pub fn plain_text(raw: &str) -> String {
    let text = footnotes::strip(raw);
    let text = WIKI_LINK_TEXT.replace_all(&text, "$1");
    let text = MARKDOWN_LINK_TEXT.replace_all(&text, "$1");
    let text = EMPHASIS_MARKS.replace_all(&text, "");
    let text = escape::strip_tags(&text);
    escape::decode(text.trim())
}

/// Lists every heading outside fenced code, in source order.
pub fn table_of_contents(content: &str) -> Vec<TocEntry> {
    let fenced = code::fenced_lines(content);
    let mut slugger = Slugger::default();

    content
        .split('\n')
        .enumerate()
        .filter(|(index, _)| !fenced.contains(index))
        .filter_map(|(index, line)| {
            let heading = Heading::parse(line)?;
            let text = plain_text(heading.text);
            Some(TocEntry {
                level: heading.level,
                anchor_id: slugger.slug(&text),
                text,
                source_line_index: index,
            })
        })
        .collect()
}

/// Replaces heading lines with `<hN id>` elements, taking ids from `toc` in
/// order so rendered anchors always agree with the table of contents. The
/// id attribute is stashed; ids may contain `--`.
pub fn render(text: &str, toc: &[TocEntry], stash: &mut Stash) -> String {
    let mut entries = toc.iter();
    let mut fallback = Slugger::default();

    text.split('\n')
        .map(|line| match Heading::parse(line) {
            Some(heading) => {
                let id = match entries.next() {
                    Some(entry) => entry.anchor_id.clone(),
                    None => fallback.slug(&plain_text(heading.text)),
                };
                let id = stash.inline(format!("id=\"{}\"", escape::attribute(&id)));
                format!(
                    "<h{level} {id}>{text}</h{level}>",
                    level = heading.level,
                    text = heading.text,
                )
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The block a `[목차]` marker expands into.
pub fn toc_block(title: &str, toc: &[TocEntry]) -> String {
    let items: String = toc
        .iter()
        .map(|entry| {
            format!(
                "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
                entry.level,
                escape::attribute(&entry.anchor_id),
                escape::code(&entry.text),
            )
        })
        .collect();

    format!(
        "<div class=\"wiki-toc\"><div class=\"wiki-toc-title\">{}</div><ul>{items}</ul></div>",
        escape::code(title)
    )
}
