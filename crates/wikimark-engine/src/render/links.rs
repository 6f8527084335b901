//! Wiki links (`[[target|display]]`) and markdown links (`[text](target)`).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::stash::Stash;
use super::{LinkEncoder, code, escape, media};

static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").expect("Invalid wiki link regex")
});

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]]+)\]\(([^()\s]+)\)").expect("Invalid markdown link regex")
});

static SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("Invalid scheme regex")
});

/// Where a link target points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Another page of this wiki, by title.
    Page(String),
    /// A URL with a scheme, or an in-page `#anchor`.
    External(String),
}

impl LinkTarget {
    /// Classifies a wiki link target. Video shorthand and category
    /// declarations are not links and yield `None`.
    pub fn from_wiki(target: &str, category_prefix: &str) -> Option<Self> {
        let target = target.trim();
        if target.is_empty() || target.starts_with("htp://") {
            return None;
        }
        if let Some((prefix, _)) = target.split_once(':')
            && prefix.trim() == category_prefix
        {
            return None;
        }
        if SCHEME.is_match(target) {
            return Some(Self::External(target.to_string()));
        }
        Some(Self::Page(target.to_string()))
    }

    pub fn from_markdown(target: &str) -> Self {
        if SCHEME.is_match(target) || target.starts_with('#') {
            Self::External(target.to_string())
        } else {
            Self::Page(target.to_string())
        }
    }
}

fn open_tag(target: &LinkTarget, links: &dyn LinkEncoder) -> String {
    match target {
        LinkTarget::External(url) => format!(
            "<a class=\"external-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
            escape::attribute(url)
        ),
        LinkTarget::Page(title) => format!(
            "<a class=\"wiki-link\" href=\"{}\" data-page=\"{}\">",
            escape::attribute(&links.encode(title)),
            escape::attribute(title)
        ),
    }
}

/// Holds the anchor tags in the stash and leaves `display` in the text, so
/// later inline passes format the link text but never see the target.
fn wrap(target: &LinkTarget, display: &str, links: &dyn LinkEncoder, stash: &mut Stash) -> String {
    let open = stash.inline(open_tag(target, links));
    let close = stash.inline("</a>".to_string());
    format!("{open}{display}{close}")
}

/// Replaces `[[target]]` and `[[target|display]]` with anchors.
///
/// A link without display text shows its target verbatim, so the whole
/// anchor is stashed.
pub fn wiki_links(
    text: &str,
    category_prefix: &str,
    links: &dyn LinkEncoder,
    stash: &mut Stash,
    outgoing: &mut BTreeSet<String>,
) -> String {
    WIKI_LINK
        .replace_all(text, |caps: &Captures| {
            let raw_target = escape::decode(&stash.restore(&caps[1]));
            let Some(target) = LinkTarget::from_wiki(&raw_target, category_prefix) else {
                return caps[0].to_string();
            };
            if let LinkTarget::Page(title) = &target {
                outgoing.insert(title.clone());
            }
            match caps.get(2) {
                Some(display) => wrap(&target, display.as_str().trim(), links, stash),
                None => {
                    let html = format!("{}{}</a>", open_tag(&target, links), caps[1].trim());
                    stash.inline(html)
                }
            }
        })
        .into_owned()
}

/// Replaces `[text](target)` with anchors.
pub fn markdown_links(
    text: &str,
    links: &dyn LinkEncoder,
    stash: &mut Stash,
    outgoing: &mut BTreeSet<String>,
) -> String {
    MARKDOWN_LINK
        .replace_all(text, |caps: &Captures| {
            let target = LinkTarget::from_markdown(&escape::decode(&stash.restore(&caps[2])));
            if let LinkTarget::Page(title) = &target {
                outgoing.insert(title.clone());
            }
            wrap(&target, caps[1].trim(), links, stash)
        })
        .into_owned()
}

/// Page titles referenced from `content` through either link form.
/// Code is ignored and entities decoded, as when rendering.
pub fn linked_pages(content: &str, category_prefix: &str) -> BTreeSet<String> {
    let content = media::strip_images(&code::strip(content));
    let wiki = WIKI_LINK
        .captures_iter(&content)
        .filter_map(|caps| LinkTarget::from_wiki(&escape::decode(&caps[1]), category_prefix));
    let markdown = MARKDOWN_LINK
        .captures_iter(&content)
        .map(|caps| LinkTarget::from_markdown(&escape::decode(&caps[2])));

    wiki.chain(markdown)
        .filter_map(|target| match target {
            LinkTarget::Page(title) => Some(title),
            LinkTarget::External(_) => None,
        })
        .collect()
}
