//! Well-known paths inside a git working tree.

use std::path::Path;

/// Repository markers looked up relative to a working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScmPath {
    /// The `.git` metadata directory
    GitDir,
    /// The `.gitmodules` submodule manifest
    GitModules,
}

impl ScmPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitDir => ".git",
            Self::GitModules => ".gitmodules",
        }
    }

    /// The marker as a trailing path component, e.g. `/.git`.
    pub fn as_suffix(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl AsRef<Path> for ScmPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ScmPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ScmPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_dir_suffix() {
        assert_eq!(ScmPath::GitDir.as_suffix(), "/.git");
    }
}
