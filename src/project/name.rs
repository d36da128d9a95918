// ABOUTME: Validated project names.
// ABOUTME: Restricts names to a filesystem-safe character set so derived paths never collide.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest accepted project name.
pub const MAX_LEN: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectNameError {
    #[error("project name cannot be empty")]
    Empty,

    #[error("project name exceeds maximum length of {MAX_LEN} characters")]
    TooLong,

    #[error("project name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in project name: '{0}'")]
    InvalidChar(char),
}

/// Name of a deployable project.
///
/// Only ASCII letters, digits, `.`, `_` and `-` are allowed, and the first
/// character may not be `.` or `-`. Names therefore never contain a path
/// separator and can't resolve to `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(value: &str) -> Result<Self, ProjectNameError> {
        let Some(first) = value.chars().next() else {
            return Err(ProjectNameError::Empty);
        };

        if value.len() > MAX_LEN {
            return Err(ProjectNameError::TooLong);
        }

        if first == '.' || first == '-' {
            return Err(ProjectNameError::InvalidStart(first));
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-'))
        {
            return Err(ProjectNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProjectName {
    type Err = ProjectNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        for name in ["demo", "my-app", "api_v2", "site.example.com", "App1"] {
            assert!(ProjectName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(ProjectName::new(""), Err(ProjectNameError::Empty));
    }

    #[test]
    fn rejects_path_separators() {
        assert_eq!(
            ProjectName::new("../etc"),
            Err(ProjectNameError::InvalidStart('.'))
        );
        assert_eq!(
            ProjectName::new("a/b"),
            Err(ProjectNameError::InvalidChar('/'))
        );
    }

    #[test]
    fn rejects_leading_hyphen() {
        assert_eq!(
            ProjectName::new("-rf"),
            Err(ProjectNameError::InvalidStart('-'))
        );
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert_eq!(
            ProjectName::new("demo;ls"),
            Err(ProjectNameError::InvalidChar(';'))
        );
        assert_eq!(
            ProjectName::new("it's"),
            Err(ProjectNameError::InvalidChar('\''))
        );
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "a".repeat(MAX_LEN + 1);
        assert_eq!(ProjectName::new(&long), Err(ProjectNameError::TooLong));
        assert!(ProjectName::new(&"a".repeat(MAX_LEN)).is_ok());
    }
}
