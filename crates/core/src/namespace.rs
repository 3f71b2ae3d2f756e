//! Namespace resolution
//!
//! Every user owns the key space `users/<user-id>/`. Caller-supplied paths
//! are always relative to that prefix and are validated before they are
//! joined to it, so a resolved key can never leave the caller's namespace.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Key hierarchy separator
pub const SEPARATOR: char = '/';

/// Prefix under which all user namespaces live
pub const NAMESPACE_ROOT: &str = "users/";

/// Maximum length of an absolute object key in bytes (S3 limit)
pub const MAX_KEY_LEN: usize = 1024;

/// Opaque user identifier asserted by the authentication collaborator
///
/// The only constructor is [`UserId::from_claim`]: an identity is never
/// taken from request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Build a user id from the authenticator's claim
    ///
    /// Fails with `Unauthorized` when no identity (or an empty one) was
    /// supplied, or when the identity could not be a single key segment.
    pub fn from_claim(claim: Option<&str>) -> Result<Self> {
        let id = claim.unwrap_or_default();
        if id.is_empty() {
            return Err(Error::Unauthorized("missing identity".into()));
        }
        if !is_valid_segment(id) {
            return Err(Error::Unauthorized(format!("malformed identity '{id}'")));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An absolute, non-empty object key inside some user's namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The key space owned by one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// Namespace of the given user: `users/<id>/`
    pub fn new(user: &UserId) -> Self {
        Self {
            prefix: format!("{NAMESPACE_ROOT}{user}{SEPARATOR}"),
        }
    }

    /// The bare namespace as a key, used to list everything the user owns
    pub fn root(&self) -> ObjectKey {
        ObjectKey(self.prefix.clone())
    }

    /// Resolve a relative file key to an absolute key
    ///
    /// The relative key must be non-empty and must not end with the
    /// separator; folder keys go through [`Namespace::resolve_prefix`].
    pub fn resolve_key(&self, relative: &str) -> Result<ObjectKey> {
        if relative.is_empty() {
            return Err(Error::InvalidPath("Object key cannot be empty".into()));
        }
        if relative.ends_with(SEPARATOR) {
            return Err(Error::InvalidPath(format!(
                "'{relative}' is a folder, not an object key"
            )));
        }
        validate_relative(relative)?;
        self.join(relative)
    }

    /// Resolve a relative folder prefix to an absolute prefix
    ///
    /// `None` or an empty string resolves to the namespace root. Any other
    /// value is normalized to end with exactly one separator.
    pub fn resolve_prefix(&self, relative: Option<&str>) -> Result<ObjectKey> {
        let relative = relative.unwrap_or_default();
        if relative.is_empty() {
            return Ok(self.root());
        }
        validate_relative(relative)?;
        if relative.ends_with(SEPARATOR) {
            self.join(relative)
        } else {
            self.join(&format!("{relative}{SEPARATOR}"))
        }
    }

    /// Strip the namespace from an absolute key
    ///
    /// Returns `None` for keys outside the namespace.
    pub fn relative<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())
    }

    fn join(&self, relative: &str) -> Result<ObjectKey> {
        let key = format!("{}{relative}", self.prefix);
        if key.len() > MAX_KEY_LEN {
            return Err(Error::InvalidPath(format!("Key exceeds {MAX_KEY_LEN} bytes")));
        }
        Ok(ObjectKey(key))
    }
}

/// Resolve a relative file key for the given user
pub fn resolve_key(user: &UserId, relative: &str) -> Result<ObjectKey> {
    Namespace::new(user).resolve_key(relative)
}

/// Resolve a relative folder prefix for the given user
pub fn resolve_prefix(user: &UserId, relative: Option<&str>) -> Result<ObjectKey> {
    Namespace::new(user).resolve_prefix(relative)
}

/// Check that a name is usable as a single path segment (e.g. a folder name)
pub fn validate_segment(name: &str) -> Result<()> {
    if is_valid_segment(name) {
        Ok(())
    } else {
        Err(Error::InvalidPath(format!("'{name}' is not a valid name")))
    }
}

/// Reject absolute-looking paths, traversal and empty segments.
///
/// A single trailing separator is allowed.
fn validate_relative(relative: &str) -> Result<()> {
    if relative.starts_with(SEPARATOR) || relative.starts_with('\\') {
        return Err(Error::InvalidPath(format!(
            "'{relative}' must be relative to your home folder"
        )));
    }

    let body = relative.strip_suffix(SEPARATOR).unwrap_or(relative);
    for segment in body.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(Error::InvalidPath(format!(
                "'{relative}' contains an empty path segment"
            )));
        }
        if segment == "." || segment == ".." {
            return Err(Error::InvalidPath(format!(
                "'{relative}' contains a '{segment}' segment"
            )));
        }
        if segment.chars().any(|c| c == '\\' || c.is_control()) {
            return Err(Error::InvalidPath(format!(
                "'{relative}' contains a disallowed character"
            )));
        }
    }

    Ok(())
}

fn is_valid_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name
            .chars()
            .any(|c| c == SEPARATOR || c == '\\' || c.is_control())
}
