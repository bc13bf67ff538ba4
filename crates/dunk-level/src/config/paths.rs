use std::path::PathBuf;

use directories::ProjectDirs;

/// Platform-specific config and data directories for an application.
///
/// On Linux these follow the XDG Base Directory spec
/// (`~/.config/{name}`, `~/.local/share/{name}`); macOS and
/// Windows use their native application directories.
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// Create a new ProjectPaths instance for the given application name.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn new(name: &str) -> Option<Self> {
        let dirs = ProjectDirs::from("", "", name)?;
        Some(ProjectPaths { dirs })
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> PathBuf {
        self.dirs.config_dir().to_path_buf()
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        self.dirs.data_dir().to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_contain_name() {
        if let Some(paths) = ProjectPaths::new("dunk-course") {
            assert!(paths.config_dir().to_string_lossy().contains("dunk-course"));
            assert!(paths.data_dir().to_string_lossy().contains("dunk-course"));
        }
    }
}
