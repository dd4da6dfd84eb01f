use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::ConvertError;

/// Directory that relative paths resolve against, plus the home directory
/// used for `~`.
#[derive(Debug, Clone)]
pub struct PathContext {
    current_dir: PathBuf,
    home_dir: Option<PathBuf>,
}

impl PathContext {
    /// Takes the home directory from `HOME`, falling back to `USERPROFILE`.
    pub fn new(current_dir: impl Into<PathBuf>) -> Self {
        let home_dir = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from);

        Self {
            current_dir: current_dir.into(),
            home_dir,
        }
    }

    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    /// Context rooted at the process working directory.
    pub fn current() -> Result<Self, ConvertError> {
        let current_dir = env::current_dir().map_err(|source| ConvertError::PathResolution {
            path: ".".to_string(),
            source,
        })?;
        Ok(Self::new(current_dir))
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Resolves `path` to an absolute, lexically normalized path.
    ///
    /// `~` expands to the home directory, `.` components are dropped and `..`
    /// removes the previous component without climbing above the root. The
    /// target does not need to exist.
    pub fn normalize(&self, path: &str) -> Result<PathBuf, ConvertError> {
        if path.is_empty() {
            return Err(resolution_error(path, "path is empty"));
        }

        let joined = match self.expand_home(path)? {
            Some(expanded) => expanded,
            None => self.current_dir.join(path),
        };

        let mut normalized = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir => {
                    // `pop` refuses to remove the root itself
                    normalized.pop();
                }
                Component::Normal(part) => normalized.push(part),
            }
        }

        debug!(input = path, resolved = %normalized.display(), "normalized path");
        Ok(normalized)
    }

    fn expand_home(&self, path: &str) -> Result<Option<PathBuf>, ConvertError> {
        let rest = if path == "~" {
            ""
        } else if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
            rest
        } else {
            return Ok(None);
        };

        let home = self
            .home_dir
            .as_ref()
            .ok_or_else(|| resolution_error(path, "home directory is not set"))?;

        Ok(Some(home.join(rest)))
    }
}

fn resolution_error(path: &str, message: &str) -> ConvertError {
    ConvertError::PathResolution {
        path: path.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, message),
    }
}
