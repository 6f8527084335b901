use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary wiki directory for testing
pub fn create_test_wiki_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file with content
pub fn create_test_file(wiki_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = wiki_dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}
