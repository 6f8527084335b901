use crate::models::{BacklinkIndex, PAGE_EXTENSION, Page};
use crate::render::{ImageData, ImageLookup, MarkupRenderer};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use relative_path::RelativePathBuf;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Page not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid wiki directory: {0}")]
    InvalidWikiDir(String),
}

/// Read a page's markup
pub fn read_page(page: &Page, wiki_root: &Path) -> Result<String, IoError> {
    let absolute_path = page.relative_path().to_path(wiki_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write a page's markup
pub fn write_page(page: &Page, wiki_root: &Path, content: &str) -> Result<(), IoError> {
    let absolute_path = page.relative_path().to_path(wiki_root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Scan for pages in the wiki directory
pub fn scan_pages(wiki_root: &Path) -> Result<Vec<Page>, IoError> {
    if !wiki_root.exists() {
        return Err(IoError::InvalidWikiDir(
            "wiki directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(wiki_root, &mut files)?;

    let mut pages: Vec<Page> = files
        .iter()
        .filter_map(|file| file.strip_prefix(wiki_root).ok())
        .filter_map(|relative| RelativePathBuf::from_path(relative).ok())
        .filter_map(|relative| Page::from_relative_path(&relative))
        .collect();
    pages.sort();
    Ok(pages)
}

/// Build a backlink index over every page in the wiki directory
pub fn build_backlink_index(
    wiki_root: &Path,
    renderer: &MarkupRenderer<'_>,
) -> Result<BacklinkIndex, IoError> {
    let mut index = BacklinkIndex::new();
    for page in scan_pages(wiki_root)? {
        let content = read_page(&page, wiki_root)?;
        index.update_page(page.title(), renderer.get_linked_pages(content.as_str()));
    }
    log::debug!("Indexed links of {} pages", index.len());
    Ok(index)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == PAGE_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_wiki_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidWikiDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
];

/// Serves `![name]` references from image files in one directory.
///
/// `name` may carry its extension (`cat.png`) or omit it (`cat`), in which
/// case known image extensions are tried in order.
#[derive(Debug, Clone)]
pub struct DirectoryImages {
    dir: PathBuf,
}

impl DirectoryImages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidates(&self, name: &str) -> Vec<(PathBuf, &'static str)> {
        let by_name = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| mime_for(&ext.to_lowercase()))
            .map(|mime| (self.dir.join(name), mime));

        match by_name {
            Some(candidate) => vec![candidate],
            None => IMAGE_TYPES
                .iter()
                .map(|(ext, mime)| (self.dir.join(format!("{name}.{ext}")), *mime))
                .collect(),
        }
    }
}

fn mime_for(ext: &str) -> Option<&'static str> {
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

impl ImageLookup for DirectoryImages {
    fn lookup(&self, name: &str) -> Option<ImageData> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            log::warn!("Refusing image name outside the image directory: {name:?}");
            return None;
        }

        for (path, mime) in self.candidates(name) {
            match fs::read(&path) {
                Ok(bytes) => {
                    return Some(ImageData::new(format!(
                        "data:{mime};base64,{}",
                        STANDARD.encode(bytes)
                    )));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    log::warn!("Failed to read image {}: {e}", path.display());
                    return None;
                }
            }
        }
        None
    }
}
