//! # Markup Rendering
//!
//! Converts one page of wiki markup into HTML plus the metadata callers need
//! for navigation (outgoing links, table of contents, categories, tags,
//! footnotes).
//!
//! ## Pipeline
//!
//! Rendering is a fixed sequence of text passes. Order is load-bearing:
//!
//! 1. Code blocks and code spans are lifted out (escaped once, never revisited)
//! 2. Bare `&`, `<`, `>` are escaped; allowed raw tags are lifted out
//! 3. Headings (wiki and ATX) and categories
//! 4. Video embeds, images, wiki links, then markdown links. Link targets
//!    leave the text here; explicit link text stays for the inline passes
//! 5. Hashtags and the table-of-contents marker
//! 6. Footnotes, collected into a list appended to the page
//! 7. Wiki emphasis (`--bold--`, `~~strike~~`)
//! 8. Horizontal rules
//! 9. Markdown emphasis, bold before italic
//! 10. Blockquotes
//! 11. Lists, then paragraphs
//!
//! Every fragment whose attributes carry `#`, `*`, `[`, `--` or URLs is held
//! in a [`stash::Stash`] until the end, so no later pass re-reads emitted
//! markup.

pub mod blocks;
pub mod code;
pub mod collaborators;
pub mod escape;
pub mod footnotes;
pub mod headings;
pub mod highlight;
pub mod inline;
pub mod links;
pub mod media;
pub mod stash;

use std::collections::BTreeSet;

use regex::Regex;
use serde::Serialize;

pub use collaborators::{HashLinkEncoder, ImageData, ImageLookup, LinkEncoder, NoImages};
pub use footnotes::Footnote;
pub use headings::{TocEntry, slugify};
pub use highlight::highlight_search_term;

use stash::Stash;

/// Knobs for [`MarkupRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Shown when a page has no content.
    pub empty_placeholder: String,
    /// Marker replaced in place by the table of contents.
    pub toc_marker: String,
    /// Title of the generated table of contents block.
    pub toc_title: String,
    /// Prefix of category declarations, as in `[[분류:Name]]`.
    pub category_prefix: String,
    /// When false every `<` and `>` in page text is escaped, for untrusted input.
    pub allow_raw_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            empty_placeholder: "This page is empty.".to_string(),
            toc_marker: "[목차]".to_string(),
            toc_title: "목차".to_string(),
            category_prefix: "분류".to_string(),
            allow_raw_html: true,
        }
    }
}

/// HTML for one page plus everything extracted while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderResult {
    pub html: String,
    pub outgoing_links: BTreeSet<String>,
    pub table_of_contents: Vec<TocEntry>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub footnotes: Vec<Footnote>,
}

/// Renders wiki markup to HTML.
///
/// Holds only borrowed collaborators, options and one compiled pattern, so
/// a renderer can be shared freely; every call works on its own state.
pub struct MarkupRenderer<'a> {
    images: &'a dyn ImageLookup,
    links: &'a dyn LinkEncoder,
    options: RenderOptions,
    category_pattern: Regex,
}

impl<'a> MarkupRenderer<'a> {
    pub fn new(images: &'a dyn ImageLookup, links: &'a dyn LinkEncoder) -> Self {
        Self::with_options(images, links, RenderOptions::default())
    }

    pub fn with_options(
        images: &'a dyn ImageLookup,
        links: &'a dyn LinkEncoder,
        options: RenderOptions,
    ) -> Self {
        let category_pattern = inline::category_pattern(&options.category_prefix);
        Self {
            images,
            links,
            options,
            category_pattern,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders a page to HTML. Empty or missing content yields the
    /// placeholder; no input makes this fail.
    pub fn render<'c>(&self, content: impl Into<Option<&'c str>>) -> String {
        self.render_document(content).html
    }

    /// Renders a page and returns the HTML with its extracted metadata.
    pub fn render_document<'c>(&self, content: impl Into<Option<&'c str>>) -> RenderResult {
        let Some(source) = prepare(content.into()) else {
            return RenderResult {
                html: format!(
                    "<p class=\"empty-page\">{}</p>",
                    escape::code(&self.options.empty_placeholder)
                ),
                ..RenderResult::default()
            };
        };

        let toc = headings::table_of_contents(&source);
        let mut stash = Stash::new();
        let mut result = RenderResult::default();

        let text = code::extract(&source, &mut stash);
        let text = escape::escape_text(&text, self.options.allow_raw_html, &mut stash);
        log::trace!("code and raw tags lifted, text escaped");

        let text = headings::render(&text, &toc, &mut stash);
        let text = inline::categories(
            &text,
            &self.category_pattern,
            &self.options.category_prefix,
            self.links,
            &mut stash,
            &mut result.categories,
        );

        let text = media::embeds(&text, &mut stash);
        let text = media::images(&text, self.images, &mut stash);
        let text = links::wiki_links(
            &text,
            &self.options.category_prefix,
            self.links,
            &mut stash,
            &mut result.outgoing_links,
        );
        let text = links::markdown_links(&text, self.links, &mut stash, &mut result.outgoing_links);
        log::trace!("links and media lifted");

        let text = inline::hashtags(&text, &mut stash, &mut result.tags);
        let text = self.expand_toc_marker(&text, &toc, &mut stash);

        let (text, footnotes) = footnotes::extract(&text, &mut stash);
        result.footnotes = footnotes;

        let text = inline::wiki_emphasis(&text);
        let text = blocks::rules(&text);
        let text = inline::emphasis(&text);
        let text = blocks::blockquotes(&text);
        log::trace!("inline passes done");

        let text = blocks::lists(&text);
        let text = blocks::paragraphs(&text, &stash);
        result.html = stash.restore(&text);
        result.table_of_contents = toc;

        log::debug!(
            "Rendered {} bytes into {} bytes of HTML ({} links, {} headings, {} footnotes)",
            source.len(),
            result.html.len(),
            result.outgoing_links.len(),
            result.table_of_contents.len(),
            result.footnotes.len()
        );
        result
    }

    /// Internal pages referenced by `content`, without rendering it.
    pub fn get_linked_pages<'c>(&self, content: impl Into<Option<&'c str>>) -> BTreeSet<String> {
        prepare(content.into())
            .map(|source| links::linked_pages(&source, &self.options.category_prefix))
            .unwrap_or_default()
    }

    /// Category names declared in `content`, in order of first appearance.
    pub fn get_categories<'c>(&self, content: impl Into<Option<&'c str>>) -> Vec<String> {
        let Some(source) = prepare(content.into()) else {
            return Vec::new();
        };
        let mut found: Vec<String> = Vec::new();
        for caps in self.category_pattern.captures_iter(&code::strip(&source)) {
            let name = escape::decode(&caps[1]);
            if !found.contains(&name) {
                found.push(name);
            }
        }
        found
    }

    /// Headings of `content`, without rendering it.
    pub fn generate_table_of_contents<'c>(
        &self,
        content: impl Into<Option<&'c str>>,
    ) -> Vec<TocEntry> {
        prepare(content.into())
            .map(|source| headings::table_of_contents(&source))
            .unwrap_or_default()
    }

    /// See [`highlight_search_term`].
    pub fn highlight_search_term(&self, html: &str, term: &str) -> String {
        highlight::highlight_search_term(html, term)
    }

    fn expand_toc_marker(&self, text: &str, toc: &[TocEntry], stash: &mut Stash) -> String {
        let marker = escape::escape_fragment(&self.options.toc_marker, self.options.allow_raw_html);
        if marker.is_empty() || !text.contains(&marker) {
            return text.to_string();
        }
        let block = stash.block(headings::toc_block(&self.options.toc_title, toc));
        text.replace(&marker, &block)
    }
}

/// Normalises line endings and removes stash delimiters. `None` when there
/// is nothing to render.
fn prepare(content: Option<&str>) -> Option<String> {
    let content = content?;
    if content.trim().is_empty() {
        return None;
    }
    Some(Stash::scrub(&content.replace("\r\n", "\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain_encoder(title: &str) -> String {
        format!("#/{title}")
    }

    #[test]
    fn empty_and_missing_content_render_placeholder() {
        let renderer = MarkupRenderer::new(&NoImages, &plain_encoder);
        let expected = "<p class=\"empty-page\">This page is empty.</p>";
        assert_eq!(renderer.render(""), expected);
        assert_eq!(renderer.render(None::<&str>), expected);
        assert_eq!(renderer.render("  \n\t"), expected);
    }

    #[test]
    fn toc_marker_expands_in_place() {
        let renderer = MarkupRenderer::new(&NoImages, &plain_encoder);
        let html = renderer.render("[목차]\n= First =\n== Second ==");
        assert!(html.starts_with("<div class=\"wiki-toc\">"));
        assert!(html.contains("<a href=\"#first\">First</a>"));
        assert!(html.contains("<li class=\"toc-level-2\"><a href=\"#second\">Second</a></li>"));
    }

    #[test]
    fn custom_category_prefix() {
        let options = RenderOptions {
            category_prefix: "Category".to_string(),
            ..RenderOptions::default()
        };
        let renderer = MarkupRenderer::with_options(&NoImages, &plain_encoder, options);
        assert_eq!(
            renderer.get_categories("[[Category:Tools]] [[Category:Tools]] [[분류:Other]]"),
            vec!["Tools"]
        );
    }
}
