//! Commit identity resolved from the caller's environment map

use std::collections::BTreeMap;

pub const GIT_AUTHOR_NAME: &str = "GIT_AUTHOR_NAME";
pub const GIT_AUTHOR_EMAIL: &str = "GIT_AUTHOR_EMAIL";
pub const GIT_COMMITTER_NAME: &str = "GIT_COMMITTER_NAME";
pub const GIT_COMMITTER_EMAIL: &str = "GIT_COMMITTER_EMAIL";

/// A name and email pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Build an identity only when both fields are non-blank.
    pub fn from_parts(name: Option<&str>, email: Option<&str>) -> Option<Self> {
        let name = name.map(str::trim).filter(|s| !s.is_empty())?;
        let email = email.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn to_signature(&self) -> std::result::Result<git2::Signature<'static>, git2::Error> {
        git2::Signature::now(&self.name, &self.email)
    }
}

/// Author and committer for one commit.
///
/// A missing half falls back to the repository's own identity resolution
/// (`user.name` / `user.email`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitIdentity {
    pub author: Option<Identity>,
    pub committer: Option<Identity>,
}

impl CommitIdentity {
    pub fn from_env(env: &BTreeMap<String, String>) -> Self {
        let lookup = |key: &str| env.get(key).map(String::as_str);
        Self {
            author: Identity::from_parts(lookup(GIT_AUTHOR_NAME), lookup(GIT_AUTHOR_EMAIL)),
            committer: Identity::from_parts(lookup(GIT_COMMITTER_NAME), lookup(GIT_COMMITTER_EMAIL)),
        }
    }

    /// Environment entries that make the `git` executable use this identity.
    pub fn to_env(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::new();
        if let Some(author) = &self.author {
            vars.push((GIT_AUTHOR_NAME, author.name.clone()));
            vars.push((GIT_AUTHOR_EMAIL, author.email.clone()));
        }
        if let Some(committer) = &self.committer {
            vars.push((GIT_COMMITTER_NAME, committer.name.clone()));
            vars.push((GIT_COMMITTER_EMAIL, committer.email.clone()));
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_identity() {
        let identity = CommitIdentity::from_env(&env(&[
            (GIT_AUTHOR_NAME, "Ann"),
            (GIT_AUTHOR_EMAIL, "ann@example.com"),
            (GIT_COMMITTER_NAME, "Ci"),
            (GIT_COMMITTER_EMAIL, "ci@example.com"),
        ]));
        assert_eq!(identity.author.unwrap().name, "Ann");
        assert_eq!(identity.committer.unwrap().email, "ci@example.com");
    }

    #[test]
    fn test_blank_field_drops_identity() {
        let identity = CommitIdentity::from_env(&env(&[
            (GIT_AUTHOR_NAME, "Ann"),
            (GIT_AUTHOR_EMAIL, "   "),
            (GIT_COMMITTER_NAME, "Ci"),
        ]));
        assert_eq!(identity, CommitIdentity::default());
        assert!(identity.to_env().is_empty());
    }
}
