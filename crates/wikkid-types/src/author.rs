use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The person (or process) a revision is attributed to.
///
/// The store never interprets these fields; they are forwarded to the
/// backend's commit and shown back in history.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub display_name: String,
    pub email: String,
}

impl Author {
    pub fn new(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// Parse the conventional `Name <email>` form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        let (name, rest) = s
            .split_once('<')
            .ok_or_else(|| TypeError::InvalidAuthor(s.to_string()))?;
        let email = rest
            .strip_suffix('>')
            .ok_or_else(|| TypeError::InvalidAuthor(s.to_string()))?;
        if email.is_empty() || email.contains(['<', '>']) {
            return Err(TypeError::InvalidAuthor(s.to_string()));
        }
        Ok(Self::new(name.trim(), email.trim()))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "<{}>", self.email)
        } else {
            write!(f, "{} <{}>", self.display_name, self.email)
        }
    }
}

impl std::str::FromStr for Author {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_and_email() {
        let a = Author::parse("Jane Doe <jane@example.com>").unwrap();
        assert_eq!(a.display_name, "Jane Doe");
        assert_eq!(a.email, "jane@example.com");
        assert_eq!(a.to_string(), "Jane Doe <jane@example.com>");
    }

    #[test]
    fn parse_email_only() {
        let a = Author::parse("<bot@example.com>").unwrap();
        assert!(a.display_name.is_empty());
        assert_eq!(a.to_string(), "<bot@example.com>");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(Author::parse("no email here").is_err());
        assert!(Author::parse("Name <unterminated").is_err());
        assert!(Author::parse("Name <>").is_err());
    }
}
