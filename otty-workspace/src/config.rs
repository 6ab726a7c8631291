use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the workspace file location.
pub const WORKSPACE_FILE_ENV: &str = "OTTY_WORKSPACE_FILE";

/// Default cap on unpinned (recent) projects kept by the store.
pub const DEFAULT_MAX_RECENTS: usize = 10;

const WORKSPACE_FILE_NAME: &str = "workspace.json";

/// Configuration knobs for the workspace store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Location of the persisted workspace file.
    pub storage_path: PathBuf,
    /// Maximum number of unpinned projects kept after an add.
    pub max_recents: usize,
}

impl WorkspaceConfig {
    /// Default configuration with the storage path taken from
    /// `OTTY_WORKSPACE_FILE` when it is set and not empty.
    pub fn from_env() -> Self {
        match env::var_os(WORKSPACE_FILE_ENV) {
            Some(path) if !path.is_empty() => {
                Self::default().with_storage_path(PathBuf::from(path))
            },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    #[must_use]
    pub fn with_max_recents(mut self, max_recents: usize) -> Self {
        self.max_recents = max_recents;
        self
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            storage_path: default_workspace_path(),
            max_recents: DEFAULT_MAX_RECENTS,
        }
    }
}

/// Return the default path to the workspace JSON file.
pub fn default_workspace_path() -> PathBuf {
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("otty")
            .join(WORKSPACE_FILE_NAME);
    }

    env::temp_dir().join("otty").join(WORKSPACE_FILE_NAME)
}
