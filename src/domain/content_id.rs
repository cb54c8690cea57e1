use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// A stable identifier for a content record.
///
/// Identifiers are lowercase kebab-case: one or more segments of ASCII
/// lowercase letters and digits, separated by single dashes.
///
/// Identifiers are the target of cross-references, so once a record is
/// published its identifier should never change.
///
/// # Examples
///
/// ```
/// use primer::ContentId;
///
/// let id: ContentId = "topic-medication-acetaminophen".parse().unwrap();
/// assert_eq!(id.slug_after("topic-medication-"), Some("acetaminophen"));
/// assert!("Topic-Medication".parse::<ContentId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(NonEmptyString);

/// Errors that can occur when parsing a [`ContentId`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The identifier was empty.
    #[error("content id must not be empty")]
    Empty,

    /// The identifier contained a character outside `[a-z0-9-]`.
    #[error("invalid character '{character}' in content id '{id}'")]
    Character {
        /// The rejected identifier.
        id: String,
        /// The first offending character.
        character: char,
    },

    /// The identifier had a leading, trailing or doubled dash.
    #[error("malformed segment in content id '{0}': segments must be non-empty")]
    Segment(String),
}

impl ContentId {
    /// Creates a new `ContentId`, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, contains characters other
    /// than lowercase ASCII letters, digits and dashes, or has an empty
    /// segment.
    pub fn new(s: String) -> Result<Self, Error> {
        if let Some(character) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(Error::Character { id: s, character });
        }

        if !s.is_empty() && s.split('-').any(str::is_empty) {
            return Err(Error::Segment(s));
        }

        NonEmptyString::new(s).map(Self).map_err(|_| Error::Empty)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the dash-separated segments of the identifier.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.as_str().split('-')
    }

    /// Returns the remainder of the identifier after `prefix`, if the
    /// identifier starts with it and the remainder is non-empty.
    #[must_use]
    pub fn slug_after(&self, prefix: &str) -> Option<&str> {
        self.as_str()
            .strip_prefix(prefix)
            .filter(|slug| !slug.is_empty())
    }
}

impl TryFrom<String> for ContentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ContentId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.as_str().to_owned()
    }
}

impl FromStr for ContentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for ContentId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
