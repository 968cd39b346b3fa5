//! Search-path resolution of referenced filenames.
//!
//! References in LDraw files are relative names such as `3001.dat` or
//! `s\3001s01.dat`. They are looked up in an ordered list of directories;
//! the first directory containing the file wins.

use std::path::{Path, PathBuf};

/// Normalize a referenced filename into its cache key.
///
/// Backslashes become forward slashes and surrounding whitespace is dropped.
/// Case is preserved so that exact-case lookups stay possible.
pub fn canonical_name(name: &str) -> String {
    name.trim().replace('\\', "/")
}

/// Join a canonical name onto a directory, one component at a time.
fn join_name(dir: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|component| !component.is_empty())
        .fold(dir.to_path_buf(), |path, component| path.join(component))
}

/// Ordered list of directories to search. Earlier entries take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPaths {
    dirs: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a directory with the lowest precedence.
    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Locate `name` in the search directories.
    ///
    /// Each directory is tried with the name as written, then with the name
    /// lower-cased, before moving to the next directory.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let name = canonical_name(name);
        if name.is_empty() {
            return None;
        }
        let lower = name.to_lowercase();

        for dir in &self.dirs {
            let exact = join_name(dir, &name);
            if exact.is_file() {
                return Some(exact);
            }

            if lower != name {
                let folded = join_name(dir, &lower);
                if folded.is_file() {
                    log::trace!("Resolved {} case-insensitively to {:?}", name, folded);
                    return Some(folded);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name(" s\\3001s01.dat "), "s/3001s01.dat");
        assert_eq!(canonical_name("48\\4-4cyli.dat"), "48/4-4cyli.dat");
        assert_eq!(canonical_name("3001.dat"), "3001.dat");
    }

    #[test]
    fn test_resolve_first_directory_wins() {
        let d1 = tempfile::tempdir().unwrap();
        let d2 = tempfile::tempdir().unwrap();
        fs::write(d1.path().join("3001.dat"), "0 first").unwrap();
        fs::write(d2.path().join("3001.dat"), "0 second").unwrap();

        let paths = SearchPaths::new([d1.path(), d2.path()]);
        assert_eq!(paths.resolve("3001.dat"), Some(d1.path().join("3001.dat")));
    }

    #[test]
    fn test_resolve_exact_case_preferred() {
        let d1 = tempfile::tempdir().unwrap();
        let d2 = tempfile::tempdir().unwrap();
        fs::write(d1.path().join("BRICK.DAT"), "0 upper").unwrap();
        fs::write(d2.path().join("brick.dat"), "0 lower").unwrap();

        let paths = SearchPaths::new([d1.path(), d2.path()]);
        assert_eq!(paths.resolve("BRICK.DAT"), Some(d1.path().join("BRICK.DAT")));
    }

    #[test]
    fn test_resolve_lowercase_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("s")).unwrap();
        fs::write(dir.path().join("s").join("3001s01.dat"), "0 sub").unwrap();

        let paths = SearchPaths::new([dir.path()]);
        assert_eq!(
            paths.resolve("S\\3001S01.DAT"),
            Some(dir.path().join("s").join("3001s01.dat"))
        );
    }

    #[test]
    fn test_resolve_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SearchPaths::new([dir.path()]);
        assert_eq!(paths.resolve("missing.dat"), None);
        assert_eq!(paths.resolve(""), None);
        assert_eq!(SearchPaths::default().resolve("3001.dat"), None);
    }

    #[test]
    fn test_directories_are_not_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("s")).unwrap();
        let paths = SearchPaths::new([dir.path()]);
        assert_eq!(paths.resolve("s"), None);
    }
}
