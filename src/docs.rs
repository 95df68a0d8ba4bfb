use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Source of prose snippets attached to sections and rules.
///
/// Keys are `description`, `<section>` and `<section>/<rule>` (or `<rule>`
/// outside any section). Missing snippets are not an error.
pub trait DocStore {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// A store with no snippets at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDocs;

impl DocStore for NoDocs {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

impl DocStore for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Reads `<root>/<key>.md`.
#[derive(Debug, Clone)]
pub struct DirectoryDocs {
    root: PathBuf,
}

impl DirectoryDocs {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.md", key))
    }
}

impl DocStore for DirectoryDocs {
    fn lookup(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Skipping unreadable doc snippet {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_lookup() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("general")).unwrap();
        std::fs::write(temp_dir.path().join("general/file.md"), "Top level.").unwrap();
        std::fs::write(temp_dir.path().join("description.md"), "Notation.").unwrap();

        let docs = DirectoryDocs::new(temp_dir.path());
        assert_eq!(docs.lookup("general/file"), Some("Top level.".to_owned()));
        assert_eq!(docs.lookup("description"), Some("Notation.".to_owned()));
        assert_eq!(docs.lookup("general/missing"), None);
        assert_eq!(docs.lookup("missing/file"), None);
    }

    #[test]
    fn test_unreadable_snippet_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where a file is expected cannot be read as text.
        std::fs::create_dir(temp_dir.path().join("general.md")).unwrap();

        let docs = DirectoryDocs::new(temp_dir.path());
        assert_eq!(docs.lookup("general"), None);
    }

    #[test]
    fn test_map_and_empty_stores() {
        let mut map = HashMap::new();
        map.insert("rule".to_owned(), "Doc.".to_owned());

        assert_eq!(map.lookup("rule"), Some("Doc.".to_owned()));
        assert_eq!(map.lookup("other"), None);
        assert_eq!(NoDocs.lookup("rule"), None);
    }
}
