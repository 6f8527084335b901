pub mod io;
pub mod models;
pub mod render;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use io::*;
pub use models::*;
pub use render::{
    Footnote, HashLinkEncoder, ImageData, ImageLookup, LinkEncoder, MarkupRenderer, NoImages,
    RenderOptions, RenderResult, TocEntry, highlight_search_term, slugify,
};
