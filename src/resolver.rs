//! External file resolution.
//!
//! Filenames referenced from a script resolve against the script's own
//! directory first, then each configured include directory in order. The
//! emitter treats a miss as a hard error with the filename attached.

use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct SearchPaths {
    /// Directory of the `.rc` source file.
    pub source_dir: Option<PathBuf>,
    /// Tried in order after `source_dir`.
    pub include_directories: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(source_dir: Option<PathBuf>, include_directories: Vec<PathBuf>) -> Self {
        Self {
            source_dir,
            include_directories,
        }
    }

    /// Finds `filename`, returning the first existing candidate.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let direct = Path::new(filename);
        if direct.is_absolute() {
            return direct.exists().then(|| direct.to_path_buf());
        }
        let bases = self
            .source_dir
            .iter()
            .chain(self.include_directories.iter());
        for base in bases {
            let candidate = base.join(direct);
            if candidate.exists() {
                debug!(path = %candidate.display(), "resolved resource file");
                return Some(candidate);
            }
        }
        // Fall back to the process working directory.
        direct.exists().then(|| direct.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_relative_to_source_dir_first() {
        let dir = std::env::temp_dir().join("resc-resolver-test");
        let nested = dir.join("include");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.join("data.bin"), b"a").unwrap();
        fs::write(nested.join("data.bin"), b"b").unwrap();

        let search = SearchPaths::new(Some(dir.clone()), vec![nested.clone()]);
        let found = search.resolve("data.bin").unwrap();
        assert_eq!(found, dir.join("data.bin"));

        let search = SearchPaths::new(None, vec![nested.clone()]);
        let found = search.resolve("data.bin").unwrap();
        assert_eq!(found, nested.join("data.bin"));

        let search = SearchPaths::new(Some(dir.clone()), Vec::new());
        assert!(search.resolve("missing.bin").is_none());

        fs::remove_dir_all(&dir).ok();
    }
}
