use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use super::escape;
use super::stash::Stash;

/// `anchor[* content]`. The content may hold `[[wiki links]]`.
static FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^\s\[\]]*)\[\*[ \t]*((?:[^\[\]\n]|\[\[[^\[\]\n]*\]\])+?)[ \t]*\]")
        .expect("Invalid footnote regex")
});

/// A footnote collected during one render. Ordinals start at 1 per render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footnote {
    pub ordinal_number: usize,
    /// Id of the list entry, the target of the in-text marker.
    pub anchor_id: String,
    /// Id of the in-text marker, the target of the list entry's back link.
    pub back_reference_id: String,
    /// Text run the marker was attached to.
    pub anchor_text: String,
    /// Footnote text without markup.
    pub content: String,
}

/// Replaces every footnote with its superscript marker and returns the
/// collected footnotes alongside the rewritten text.
pub fn extract(text: &str, stash: &mut Stash) -> (String, Vec<Footnote>) {
    let mut notes: Vec<(Footnote, String)> = Vec::new();

    let replaced = FOOTNOTE
        .replace_all(text, |caps: &Captures| {
            let ordinal = notes.len() + 1;
            let note = Footnote {
                ordinal_number: ordinal,
                anchor_id: format!("fn-{ordinal}"),
                back_reference_id: format!("fnref-{ordinal}"),
                anchor_text: plain(&caps[1], stash),
                content: plain(caps[2].trim(), stash),
            };
            let marker = stash.inline(format!(
                "<sup class=\"footnote-ref\" id=\"{}\"><a href=\"#{}\">[{ordinal}]</a></sup>",
                note.back_reference_id, note.anchor_id
            ));
            notes.push((note, caps[2].trim().to_string()));
            format!("{}{marker}", &caps[1])
        })
        .into_owned();

    if notes.is_empty() {
        return (replaced, Vec::new());
    }

    let items: String = notes
        .iter()
        .map(|(note, body)| {
            let back = stash.inline(format!(
                "<a class=\"footnote-backref\" href=\"#{}\">↩</a>",
                note.back_reference_id
            ));
            format!(
                "<li id=\"{}\"><span class=\"footnote-number\">{}.</span> {body} {back}</li>",
                note.anchor_id, note.ordinal_number
            )
        })
        .collect();

    // One line, so list and paragraph passes treat it as a single block
    // while inline passes still reach the footnote bodies.
    let block = format!("<div class=\"footnotes\"><hr><ol>{items}</ol></div>");
    let footnotes = notes.into_iter().map(|(note, _)| note).collect();
    (format!("{replaced}\n\n{block}"), footnotes)
}

/// Text as a reader sees it, with stashed markup put back and tags removed.
fn plain(text: &str, stash: &Stash) -> String {
    escape::decode(&escape::strip_tags(&stash.restore(text)))
}

/// Drops footnotes, keeping the text they were attached to.
pub fn strip(text: &str) -> String {
    FOOTNOTE.replace_all(text, "$1").into_owned()
}
