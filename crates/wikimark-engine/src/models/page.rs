use relative_path::{RelativePath, RelativePathBuf};

/// File extension of stored pages.
pub const PAGE_EXTENSION: &str = "wiki";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Invalid page title: {0:?}")]
    InvalidTitle(String),
}

/// A wiki page identified by title, stored at `<title>.wiki` under the wiki
/// root. Titles containing `/` live in subfolders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Page {
    title: String,
    relative_path: RelativePathBuf,
}

impl Page {
    /// Create a page from its title
    ///
    /// Titles are kept inside the wiki root: empty titles and titles with
    /// empty, `.` or `..` segments or backslashes are rejected.
    pub fn from_title(title: &str) -> Result<Self, PageError> {
        let title = title.trim().trim_matches('/');
        let escapes_root = title.is_empty()
            || title.contains('\\')
            || title
                .split('/')
                .any(|segment| matches!(segment.trim(), "" | "." | ".."));
        if escapes_root {
            return Err(PageError::InvalidTitle(title.to_string()));
        }

        Ok(Self {
            title: title.to_string(),
            relative_path: RelativePathBuf::from(format!("{title}.{PAGE_EXTENSION}")),
        })
    }

    /// Create a page from a path relative to the wiki root.
    ///
    /// Returns `None` for files that are not pages.
    pub fn from_relative_path(relative_path: &RelativePath) -> Option<Self> {
        let title = relative_path
            .as_str()
            .strip_suffix(&format!(".{PAGE_EXTENSION}"))?;
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            relative_path: relative_path.to_relative_path_buf(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }
}

impl TryFrom<&str> for Page {
    type Error = PageError;

    fn try_from(title: &str) -> Result<Self, Self::Error> {
        Self::from_title(title)
    }
}
