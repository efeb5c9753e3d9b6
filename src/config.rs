use std::path::{Path, PathBuf};

pub const RAW_DATA_PATH: &str = "data/raw/accidentsVelo-full.csv";
pub const CLEANED_DATA_PATH: &str = "data/cleaned/accidents_cleaned.csv";

/// Input and output locations for one cleaning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerPaths {
    pub raw: PathBuf,
    pub cleaned: PathBuf,
}

impl CleanerPaths {
    /// Conventional layout under a project root.
    pub fn from_root(root: &Path) -> Self {
        Self {
            raw: root.join(RAW_DATA_PATH),
            cleaned: root.join(CLEANED_DATA_PATH),
        }
    }

    /// Replace either path with an explicit one. Explicit paths are used as given,
    /// not joined to the root.
    pub fn with_overrides(mut self, raw: Option<PathBuf>, cleaned: Option<PathBuf>) -> Self {
        if let Some(raw) = raw {
            self.raw = raw;
        }
        if let Some(cleaned) = cleaned {
            self.cleaned = cleaned;
        }
        self
    }
}

impl Default for CleanerPaths {
    fn default() -> Self {
        Self::from_root(Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_layout_follows_data_convention() {
        let paths = CleanerPaths::from_root(Path::new("/srv/velo"));
        assert_eq!(
            paths.raw,
            PathBuf::from("/srv/velo/data/raw/accidentsVelo-full.csv")
        );
        assert_eq!(
            paths.cleaned,
            PathBuf::from("/srv/velo/data/cleaned/accidents_cleaned.csv")
        );
    }

    #[test]
    fn overrides_replace_only_given_paths() {
        let paths = CleanerPaths::from_root(Path::new("/srv/velo"))
            .with_overrides(None, Some(PathBuf::from("out.csv")));
        assert_eq!(
            paths.raw,
            PathBuf::from("/srv/velo/data/raw/accidentsVelo-full.csv")
        );
        assert_eq!(paths.cleaned, PathBuf::from("out.csv"));
    }
}
