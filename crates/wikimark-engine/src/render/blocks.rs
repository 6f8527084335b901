//! Line-oriented passes: rules, blockquotes, lists and paragraphs.

use std::sync::LazyLock;

use regex::Regex;

use super::stash::Stash;

static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*$").expect("Invalid rule regex"));

static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:>[ \t]?)+(.*)$").expect("Invalid quote regex"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*- (.*)$").expect("Invalid bullet regex"));

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*([0-9]+)\. (.*)$").expect("Invalid numbered regex"));

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^</?(?:h[1-6]|ul|ol|li|blockquote|pre|div|hr|table|thead|tbody|tr|p|figure|section|details|summary|iframe|dl|nav|aside)\b",
    )
    .expect("Invalid block tag regex")
});

pub fn rules(text: &str) -> String {
    RULE.replace_all(text, "<hr>").into_owned()
}

/// Joins runs of `> ` lines into one blockquote, lines separated by a space.
pub fn blockquotes(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut quoted: Vec<String> = Vec::new();

    let flush = |quoted: &mut Vec<String>, out: &mut Vec<String>| {
        if !quoted.is_empty() {
            out.push(format!("<blockquote>{}</blockquote>", quoted.join(" ")));
            quoted.clear();
        }
    };

    for line in text.split('\n') {
        match QUOTE.captures(line) {
            Some(caps) => quoted.push(caps[1].trim().to_string()),
            None => {
                flush(&mut quoted, &mut out);
                out.push(line.to_string());
            }
        }
    }
    flush(&mut quoted, &mut out);
    out.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

#[derive(Debug)]
struct OpenList {
    kind: ListKind,
    start: u64,
    items: Vec<String>,
}

impl OpenList {
    fn close(self) -> String {
        let tag = self.kind.tag();
        let start = match self.kind {
            ListKind::Numbered if self.start != 1 => format!(" start=\"{}\"", self.start),
            _ => String::new(),
        };
        let items: String = self
            .items
            .iter()
            .map(|item| format!("<li>{item}</li>"))
            .collect();
        format!("<{tag}{start}>{items}</{tag}>")
    }
}

/// Coalesces `- ` and `N. ` runs into `<ul>`/`<ol>`. A change of marker or
/// any other line closes the open list.
pub fn lists(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut open: Option<OpenList> = None;

    for line in text.split('\n') {
        let item = if let Some(caps) = BULLET.captures(line) {
            Some((ListKind::Bullet, 1, caps[1].trim().to_string()))
        } else {
            NUMBERED.captures(line).map(|caps| {
                let start = caps[1].parse().unwrap_or(1);
                (ListKind::Numbered, start, caps[2].trim().to_string())
            })
        };

        match item {
            Some((kind, start, content)) => {
                if open.as_ref().is_some_and(|list| list.kind != kind) {
                    out.extend(open.take().map(OpenList::close));
                }
                open.get_or_insert_with(|| OpenList {
                    kind,
                    start,
                    items: Vec::new(),
                })
                .items
                .push(content);
            }
            None => {
                out.extend(open.take().map(OpenList::close));
                out.push(line.to_string());
            }
        }
    }
    out.extend(open.take().map(OpenList::close));
    out.join("\n")
}

/// True when `tag` opens or closes a block-level element.
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAG.is_match(tag)
}

fn is_block_line(line: &str, stash: &Stash) -> bool {
    is_block_tag(line) || stash.starts_with_block(line)
}

/// Wraps remaining text lines in `<p>`. Consecutive lines join with a
/// space; blank lines and block elements end the paragraph.
pub fn paragraphs(text: &str, stash: &Stash) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    let flush = |lines: &mut Vec<&str>, out: &mut Vec<String>| {
        if !lines.is_empty() {
            out.push(format!("<p>{}</p>", lines.join(" ")));
            lines.clear();
        }
    };

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush(&mut lines, &mut out);
        } else if is_block_line(trimmed, stash) {
            flush(&mut lines, &mut out);
            out.push(trimmed.to_string());
        } else {
            lines.push(trimmed);
        }
    }
    flush(&mut lines, &mut out);
    out.join("\n")
}
