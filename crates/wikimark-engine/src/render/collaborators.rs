//! Callbacks the renderer borrows from its caller.
//!
//! The renderer never touches storage or routing. Image bytes and page URLs
//! come from these two traits, which closures implement directly:
//!
//! ```
//! use wikimark_engine::{ImageData, MarkupRenderer};
//!
//! let images = |name: &str| (name == "logo").then(|| ImageData::new("data:image/png;base64,AA=="));
//! let links = |title: &str| format!("/wiki/{title}");
//! let renderer = MarkupRenderer::new(&images, &links);
//! assert!(renderer.render("![logo]").contains("data:image/png"));
//! ```

/// A resolved image, ready to be used as an `<img src>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub data_uri: String,
}

impl ImageData {
    pub fn new(data_uri: impl Into<String>) -> Self {
        Self {
            data_uri: data_uri.into(),
        }
    }
}

/// Resolves an image name written as `![name]` in page text.
pub trait ImageLookup {
    fn lookup(&self, name: &str) -> Option<ImageData>;
}

impl<F> ImageLookup for F
where
    F: Fn(&str) -> Option<ImageData>,
{
    fn lookup(&self, name: &str) -> Option<ImageData> {
        self(name)
    }
}

/// Builds the `href` for an internal page link.
pub trait LinkEncoder {
    fn encode(&self, page_title: &str) -> String;
}

impl<F> LinkEncoder for F
where
    F: Fn(&str) -> String,
{
    fn encode(&self, page_title: &str) -> String {
        self(page_title)
    }
}

/// Image lookup with no images at all; every reference renders as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageLookup for NoImages {
    fn lookup(&self, _name: &str) -> Option<ImageData> {
        None
    }
}

/// Percent-encodes page titles behind a fixed prefix, e.g. `#/page/My%20Page`.
#[derive(Debug, Clone)]
pub struct HashLinkEncoder {
    prefix: String,
}

impl HashLinkEncoder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for HashLinkEncoder {
    fn default() -> Self {
        Self::new("#/page/")
    }
}

impl LinkEncoder for HashLinkEncoder {
    fn encode(&self, page_title: &str) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(page_title))
    }
}
