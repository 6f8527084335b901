use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape;
use super::stash::Stash;

/// A fenced block: an opening ```` ``` ```` line with an optional language,
/// content, and a closing ```` ``` ```` line.
pub static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^```[ \t]*([\w+#.-]*)[ \t]*\n(.*?)^```[ \t]*$").expect("Invalid fence regex")
});

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("Invalid code span regex"));

/// Lifts fenced blocks and code spans out of the text.
///
/// Runs before every other pass so that code content is escaped exactly once
/// and never picks up emphasis, links or tags.
pub fn extract(text: &str, stash: &mut Stash) -> String {
    let fenced = FENCE.replace_all(text, |caps: &Captures| {
        let content = caps[2].trim_end_matches('\n');
        let class = match &caps[1] {
            "" => String::new(),
            lang => format!(" class=\"language-{}\"", escape::attribute(lang)),
        };
        stash.block(format!(
            "<pre><code{class}>{}</code></pre>",
            escape::code(content)
        ))
    });

    CODE_SPAN
        .replace_all(&fenced, |caps: &Captures| {
            stash.inline(format!("<code>{}</code>", escape::code(&caps[1])))
        })
        .into_owned()
}

/// Removes code without keeping it, for scans that only care about markup.
pub fn strip(text: &str) -> String {
    let fenced = FENCE.replace_all(text, "");
    CODE_SPAN.replace_all(&fenced, "").into_owned()
}

/// Zero-based indices of lines that belong to fenced blocks, fences included.
pub fn fenced_lines(text: &str) -> HashSet<usize> {
    let mut lines = HashSet::new();
    for m in FENCE.find_iter(text) {
        let first = text[..m.start()].matches('\n').count();
        let last = first + m.as_str().matches('\n').count();
        lines.extend(first..=last);
    }
    lines
}
