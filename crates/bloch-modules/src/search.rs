//! Search locations for imported modules.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::trace;

/// Environment variable holding extra user search directories.
pub const BLOCH_PATH_ENV: &str = "BLOCH_PATH";

/// Environment variable overriding the standard library location.
pub const BLOCH_STDLIB_PATH_ENV: &str = "BLOCH_STDLIB_PATH";

/// Directories consulted when resolving `import` declarations.
///
/// For each import the directories are tried in this order: the directory
/// of the importing file, the user paths, the current working directory,
/// then the standard library paths. The first existing file wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    user: Vec<PathBuf>,
    stdlib: Vec<PathBuf>,
}

impl SearchPaths {
    /// Empty configuration: only the importing directory and the working
    /// directory are searched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `BLOCH_PATH`, `BLOCH_STDLIB_PATH` and the fixed standard
    /// library fallbacks.
    pub fn from_env() -> Self {
        let user = std::env::var_os(BLOCH_PATH_ENV)
            .map(|v| split_path_list(&v))
            .unwrap_or_default();

        let mut stdlib = std::env::var_os(BLOCH_STDLIB_PATH_ENV)
            .map(|v| split_path_list(&v))
            .unwrap_or_default();
        stdlib.extend(default_stdlib_dirs());

        Self { user, stdlib }
    }

    /// Append a user search directory.
    #[must_use]
    pub fn with_user_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.user.push(path.into());
        self
    }

    /// Append a standard library directory.
    #[must_use]
    pub fn with_stdlib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdlib.push(path.into());
        self
    }

    pub fn user_paths(&self) -> &[PathBuf] {
        &self.user
    }

    pub fn stdlib_paths(&self) -> &[PathBuf] {
        &self.stdlib
    }

    /// Find `relative` under the search directories, in priority order.
    pub(crate) fn find(&self, importing_dir: &Path, relative: &Path) -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok();
        let bases = std::iter::once(importing_dir)
            .chain(self.user.iter().map(PathBuf::as_path))
            .chain(cwd.as_deref())
            .chain(self.stdlib.iter().map(PathBuf::as_path));

        for base in bases {
            let candidate = base.join(relative);
            trace!(candidate = %candidate.display(), "trying import candidate");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

/// Split a platform path list (`:` on Unix, `;` on Windows), dropping
/// empty entries.
fn split_path_list(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Standard library locations consulted after any explicit override.
fn default_stdlib_dirs() -> Vec<PathBuf> {
    let mut dirs_out = Vec::new();

    if let Some(dir) = option_env!("BLOCH_STDLIB_SOURCE_DIR") {
        dirs_out.push(PathBuf::from(dir));
    }
    if let Some(dir) = option_env!("BLOCH_STDLIB_INSTALL_DIR") {
        dirs_out.push(PathBuf::from(dir));
    }

    // XDG_DATA_HOME, falling back to ~/.local/share on Linux.
    if let Some(data) = dirs::data_dir() {
        dirs_out.push(data.join("bloch").join("library"));
    }

    #[cfg(unix)]
    {
        dirs_out.push(PathBuf::from("/usr/local/share/bloch/library"));
        dirs_out.push(PathBuf::from("/usr/share/bloch/library"));
    }

    dirs_out
}
