use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Opens a stash token. Private-use code points never occur in page text
/// that survives [`Stash::scrub`].
const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").expect("Invalid token regex"));

/// Finished HTML fragments held out of the text while later passes run.
///
/// Each fragment is replaced by an opaque token; no pass pattern matches
/// the token characters, so emitted markup is never re-interpreted.
#[derive(Debug, Default)]
pub struct Stash {
    fragments: Vec<Fragment>,
}

#[derive(Debug)]
struct Fragment {
    html: String,
    block: bool,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes token delimiters from raw input so user text cannot forge tokens.
    pub fn scrub(text: &str) -> String {
        text.replace([OPEN, CLOSE], "")
    }

    /// Holds an inline fragment (a link, an image, a code span).
    pub fn inline(&mut self, html: String) -> String {
        self.push(html, false)
    }

    /// Holds a fragment that stands as its own block (a code block, an embed).
    pub fn block(&mut self, html: String) -> String {
        self.push(html, true)
    }

    fn push(&mut self, html: String, block: bool) -> String {
        let index = self.fragments.len();
        self.fragments.push(Fragment { html, block });
        format!("{OPEN}{index}{CLOSE}")
    }

    /// True when `line` is exactly one block token.
    pub fn is_block_token(&self, line: &str) -> bool {
        TOKEN
            .captures(line)
            .filter(|caps| caps[0].len() == line.len())
            .and_then(|caps| caps[1].parse::<usize>().ok())
            .and_then(|index| self.fragments.get(index))
            .is_some_and(|fragment| fragment.block)
    }

    /// True when `line` opens with a block token, such as a raw `<div>` tag.
    pub fn starts_with_block(&self, line: &str) -> bool {
        TOKEN
            .captures(line)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
            .and_then(|caps| caps[1].parse::<usize>().ok())
            .and_then(|index| self.fragments.get(index))
            .is_some_and(|fragment| fragment.block)
    }

    /// Puts every fragment back. Fragments may contain other tokens, so
    /// substitution repeats until none are left.
    pub fn restore(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..=self.fragments.len() {
            if !current.contains(OPEN) {
                break;
            }
            current = TOKEN
                .replace_all(&current, |caps: &Captures| {
                    caps[1]
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| self.fragments.get(index))
                        .map(|fragment| fragment.html.clone())
                        .unwrap_or_default()
                })
                .into_owned();
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_round_trips_nested_tokens() {
        let mut stash = Stash::new();
        let code = stash.inline("<code>x</code>".to_string());
        let link = stash.inline(format!("<a>{code}</a>"));
        let text = format!("see {link}");
        assert_eq!(stash.restore(&text), "see <a><code>x</code></a>");
    }

    #[test]
    fn block_tokens_are_recognised_only_alone() {
        let mut stash = Stash::new();
        let block = stash.block("<pre></pre>".to_string());
        let inline = stash.inline("<b></b>".to_string());
        assert!(stash.is_block_token(&block));
        assert!(!stash.is_block_token(&inline));
        assert!(!stash.is_block_token(&format!("text {block}")));
    }

    #[test]
    fn leading_block_token_marks_a_block_line() {
        let mut stash = Stash::new();
        let open = stash.block("<div>".to_string());
        let close = stash.block("</div>".to_string());
        assert!(stash.starts_with_block(&format!("{open}text{close}")));
        assert!(!stash.starts_with_block(&format!("text{close}")));
    }

    #[test]
    fn scrub_removes_forged_delimiters() {
        assert_eq!(Stash::scrub("a\u{E000}0\u{E001}b"), "a0b");
    }
}
