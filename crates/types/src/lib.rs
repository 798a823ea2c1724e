//! Validated name types shared across the Depot crates.
//!
//! Every stored file is a single entry in a flat directory. Its on-disk name (the *stored name*)
//! is `<stamp>-<original name>`, and the original name can always be recovered from it by taking
//! everything after the first [`NAME_SEPARATOR`].

use std::fmt;

/// Separator between the stamp prefix and the original name inside a stored name.
pub const NAME_SEPARATOR: char = '-';

/// Errors that can occur when validating entry names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The input was empty
    #[error("Name cannot be empty")]
    Empty,

    /// The input is `.` or `..`
    #[error("Name is reserved: {0}")]
    Reserved(String),

    /// The input contains a path separator or NUL byte and would not be a single entry
    #[error("Name must be a single path component: {0}")]
    NotSingleComponent(String),
}

/// Checks that `input` can name exactly one entry inside a directory.
///
/// This only rejects what the filesystem itself could never hold as a single entry name.
/// Whitespace, dots and unicode are all left untouched.
fn validate_entry_name(input: &str) -> Result<(), NameError> {
    if input.is_empty() {
        return Err(NameError::Empty);
    }
    if input == "." || input == ".." {
        return Err(NameError::Reserved(input.to_owned()));
    }
    if input
        .chars()
        .any(|c| c == '\0' || std::path::is_separator(c))
    {
        return Err(NameError::NotSingleComponent(input.to_owned()));
    }
    Ok(())
}

/// The filename as the uploading client supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OriginalName(String);

impl OriginalName {
    /// Validates a client-supplied filename.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if the input is empty, `.`/`..`, or contains a path separator.
    pub fn new(input: impl AsRef<str>) -> Result<Self, NameError> {
        let input = input.as_ref();
        validate_entry_name(input)?;
        Ok(Self(input.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The on-disk name of a stored file; the sole identity key in the storage directory.
///
/// Names produced by [`StoredName::compose`] always carry a stamp prefix. Names parsed from
/// the directory or from a request may not (files placed out-of-band), in which case the
/// whole name doubles as the original name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredName(String);

impl StoredName {
    /// Builds `<stamp>-<original>`.
    pub fn compose(stamp: u64, original: &OriginalName) -> Self {
        Self(format!("{}{}{}", stamp, NAME_SEPARATOR, original.as_str()))
    }

    /// Validates an existing entry name, e.g. a request path segment or a directory entry.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if the input could not name a single directory entry.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, NameError> {
        let input = input.as_ref();
        validate_entry_name(input)?;
        Ok(Self(input.to_owned()))
    }

    /// Recovers the original name: everything after the first separator, or the whole name
    /// when there is no separator.
    pub fn original_name(&self) -> &str {
        self.0
            .split_once(NAME_SEPARATOR)
            .map_or(self.0.as_str(), |(_, original)| original)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StoredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoredName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for StoredName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for StoredName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StoredName::parse(&s).map_err(serde::de::Error::custom)
    }
}
