//! Images resolved through [`ImageLookup`] and video embeds.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape;
use super::stash::Stash;
use super::ImageLookup;

/// `![name]` or `![name|caption]`.
static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\[\]|]+)(?:\|([^\[\]]*))?\]").expect("Invalid image regex")
});

/// `[[htp://yt.ID]]` and the reversed `[[htp://ID.yt]]`.
static VIDEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[[ \t]*htp://(?:yt\.([^\[\]|]*?)|([^\[\]|]*?)\.yt)[ \t]*\]\]")
        .expect("Invalid video embed regex")
});

const EMBED_BASE: &str = "https://www.youtube-nocookie.com/embed/";

/// Keeps only characters a video id can legitimately contain.
pub fn sanitize_video_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

pub fn images(text: &str, lookup: &dyn ImageLookup, stash: &mut Stash) -> String {
    IMAGE
        .replace_all(text, |caps: &Captures| {
            let shown = caps[1].trim();
            let name = escape::decode(shown);
            let caption = caps.get(2).map(|c| c.as_str().trim()).filter(|c| !c.is_empty());

            let html = match lookup.lookup(&name) {
                Some(image) => {
                    let img = format!(
                        "<img class=\"wiki-image\" src=\"{}\" alt=\"{}\" title=\"{}\" data-image-name=\"{}\" loading=\"lazy\">",
                        escape::attribute(&image.data_uri),
                        escape::attribute(shown),
                        escape::attribute(caption.unwrap_or(shown)),
                        escape::attribute(shown),
                    );
                    match caption {
                        Some(caption) => format!(
                            "<span class=\"wiki-figure\">{img}<span class=\"wiki-caption\">{caption}</span></span>"
                        ),
                        None => img,
                    }
                }
                None => {
                    log::warn!("Image not found: {name}");
                    format!(
                        "<span class=\"image-error\" data-image-name=\"{}\">Image not found: {shown}</span>",
                        escape::attribute(shown)
                    )
                }
            };
            stash.inline(html)
        })
        .into_owned()
}

/// Removes image references, for scans that only care about links.
pub fn strip_images(text: &str) -> String {
    IMAGE.replace_all(text, "").into_owned()
}

/// Replaces video shorthand with sandboxed, lazily loaded players. A token
/// that sanitizes to nothing is kept as literal text.
pub fn embeds(text: &str, stash: &mut Stash) -> String {
    VIDEO
        .replace_all(text, |caps: &Captures| {
            let raw = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            let id = sanitize_video_id(&escape::decode(raw));
            if id.is_empty() {
                log::warn!("Unsafe or empty video id: {raw:?}");
                return stash.inline(caps[0].to_string());
            }
            stash.block(format!(
                "<div class=\"video-embed\"><iframe src=\"{EMBED_BASE}{id}\" title=\"YouTube video\" \
                 loading=\"lazy\" sandbox=\"allow-scripts allow-same-origin allow-presentation allow-popups\" \
                 allow=\"encrypted-media; picture-in-picture\" allowfullscreen></iframe></div>"
            ))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ImageData, NoImages};
    use rstest::rstest;

    #[rstest]
    #[case("dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("abc\"><script>", "abcscript")]
    #[case("<>\"'", "")]
    fn video_ids_are_filtered(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_video_id(raw), expected);
    }

    #[rstest]
    #[case("[[htp://yt.dQw4w9WgXcQ]]")]
    #[case("[[htp://dQw4w9WgXcQ.yt]]")]
    fn both_embed_forms_render_players(#[case] input: &str) {
        let mut stash = Stash::new();
        let text = embeds(input, &mut stash);
        assert!(stash.is_block_token(&text));
        assert!(stash.restore(&text).contains("/embed/dQw4w9WgXcQ\""));
    }

    #[test]
    fn empty_embed_id_keeps_original_text() {
        let mut stash = Stash::new();
        let text = embeds("[[htp://yt.<>]]", &mut stash);
        assert_eq!(stash.restore(&text), "[[htp://yt.<>]]");
    }

    #[test]
    fn missing_image_renders_visible_error() {
        let mut stash = Stash::new();
        let text = images("![missing]", &NoImages, &mut stash);
        let html = stash.restore(&text);
        assert!(html.contains("Image not found: missing"));
        assert!(html.contains("data-image-name=\"missing\""));
    }

    #[test]
    fn found_image_uses_data_uri_and_caption() {
        let lookup = |name: &str| (name == "cat").then(|| ImageData::new("data:image/png;base64,AAAA"));
        let mut stash = Stash::new();
        let text = images("![cat|A cat]", &lookup, &mut stash);
        let html = stash.restore(&text);
        assert!(html.contains("src=\"data:image/png;base64,AAAA\""));
        assert!(html.contains("title=\"A cat\""));
        assert!(html.contains("<span class=\"wiki-caption\">A cat</span>"));
    }
}
