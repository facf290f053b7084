//! Hierarchical entity keys.

use crate::error::{KeyError, KeyResult};
use crate::key_codec::{decode_key, encode_key};
use std::fmt;
use std::str::FromStr;

/// Identifier part of a key path element.
///
/// Numeric ids are always greater than zero and names are never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyId {
    /// Numeric id, assigned by the caller or by the backend.
    Id(u64),
    /// Caller-chosen name.
    Name(String),
}

impl KeyId {
    /// Checks the id invariants.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] for a zero id or an empty name.
    pub fn validate(&self) -> KeyResult<()> {
        match self {
            Self::Id(0) => Err(KeyError::invalid("numeric ids must be greater than zero")),
            Self::Name(name) if name.is_empty() => {
                Err(KeyError::invalid("key names must not be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Returns the numeric id, if this is one.
    #[must_use]
    pub fn as_id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }

    /// Returns the name, if this is one.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Name(name) => Some(name),
        }
    }
}

impl From<u64> for KeyId {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for KeyId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for KeyId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// One complete `(kind, id)` step of a key path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathElement {
    kind: String,
    id: KeyId,
}

impl PathElement {
    /// Creates a path element.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the kind is empty or the id is invalid.
    pub fn new(kind: impl Into<String>, id: KeyId) -> KeyResult<Self> {
        let kind = validate_kind(kind.into())?;
        id.validate()?;
        Ok(Self { kind, id })
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &KeyId {
        &self.id
    }
}

/// Identifier of a stored record.
///
/// A key is a path from a root element down to a leaf `(kind, id)`. Every
/// ancestor is complete; the leaf id may be absent, in which case the key is
/// *incomplete* and the storage backend assigns a numeric id when the record
/// is first written.
///
/// Keys order by ancestor path first, so the children of a key sort next to
/// each other.
///
/// # Example
///
/// ```
/// use jabcom_codec::{Key, KeyId};
///
/// let parent = Key::from_id("Parent", 1).unwrap();
/// let child = parent.child("Child", KeyId::from("first")).unwrap();
///
/// assert_eq!(child.parent(), Some(parent.clone()));
/// assert!(parent.is_ancestor_of(&child));
/// assert_eq!(child.to_string(), "Parent:1/Child:'first");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    ancestors: Vec<PathElement>,
    kind: String,
    id: Option<KeyId>,
}

impl Key {
    /// Creates a complete root key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the kind is empty or the id is invalid.
    pub fn new(kind: impl Into<String>, id: KeyId) -> KeyResult<Self> {
        let kind = validate_kind(kind.into())?;
        id.validate()?;
        Ok(Self {
            ancestors: Vec::new(),
            kind,
            id: Some(id),
        })
    }

    /// Creates a root key with a numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the kind is empty or `id` is zero.
    pub fn from_id(kind: impl Into<String>, id: u64) -> KeyResult<Self> {
        Self::new(kind, KeyId::Id(id))
    }

    /// Creates a root key with a name.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the kind or the name is empty.
    pub fn from_name(kind: impl Into<String>, name: impl Into<String>) -> KeyResult<Self> {
        Self::new(kind, KeyId::Name(name.into()))
    }

    /// Creates an incomplete root key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the kind is empty.
    pub fn incomplete(kind: impl Into<String>) -> KeyResult<Self> {
        Ok(Self {
            ancestors: Vec::new(),
            kind: validate_kind(kind.into())?,
            id: None,
        })
    }

    /// Builds a key from a complete path (root first).
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the path is empty.
    pub fn from_path(mut path: Vec<PathElement>) -> KeyResult<Self> {
        let leaf = path
            .pop()
            .ok_or_else(|| KeyError::invalid("key path must not be empty"))?;
        Ok(Self {
            ancestors: path,
            kind: leaf.kind,
            id: Some(leaf.id),
        })
    }

    /// Assembles a key from already validated parts.
    pub(crate) fn from_parts(ancestors: Vec<PathElement>, kind: String, id: Option<KeyId>) -> Self {
        Self {
            ancestors,
            kind,
            id,
        }
    }

    /// Creates a complete child key below this one.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if this key is incomplete or the child
    /// components are invalid.
    pub fn child(&self, kind: impl Into<String>, id: KeyId) -> KeyResult<Self> {
        let mut child = self.incomplete_child(kind)?;
        id.validate()?;
        child.id = Some(id);
        Ok(child)
    }

    /// Creates an incomplete child key below this one.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if this key is incomplete or the kind is
    /// empty.
    pub fn incomplete_child(&self, kind: impl Into<String>) -> KeyResult<Self> {
        let ancestors = self
            .path()
            .ok_or_else(|| KeyError::invalid("an incomplete key cannot be a parent"))?;
        Ok(Self {
            ancestors,
            kind: validate_kind(kind.into())?,
            id: None,
        })
    }

    /// Returns a copy of this key with the leaf id set.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the id is invalid.
    pub fn with_id(&self, id: KeyId) -> KeyResult<Self> {
        id.validate()?;
        Ok(Self {
            ancestors: self.ancestors.clone(),
            kind: self.kind.clone(),
            id: Some(id),
        })
    }

    /// Returns the incomplete key naming this key's `(parent, kind)` scope.
    ///
    /// Ids are unique within a scope.
    #[must_use]
    pub fn scope(&self) -> Key {
        Self {
            ancestors: self.ancestors.clone(),
            kind: self.kind.clone(),
            id: None,
        }
    }

    /// Returns the leaf kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the leaf id, `None` for incomplete keys.
    #[must_use]
    pub fn id(&self) -> Option<&KeyId> {
        self.id.as_ref()
    }

    /// Returns the ancestor path, root first.
    #[must_use]
    pub fn ancestors(&self) -> &[PathElement] {
        &self.ancestors
    }

    /// Returns true if the leaf id is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the parent key, `None` for root keys.
    #[must_use]
    pub fn parent(&self) -> Option<Key> {
        let (leaf, rest) = self.ancestors.split_last()?;
        Some(Self {
            ancestors: rest.to_vec(),
            kind: leaf.kind.clone(),
            id: Some(leaf.id.clone()),
        })
    }

    /// Returns the full path including the leaf, `None` for incomplete keys.
    #[must_use]
    pub fn path(&self) -> Option<Vec<PathElement>> {
        let id = self.id.clone()?;
        let mut path = self.ancestors.clone();
        path.push(PathElement {
            kind: self.kind.clone(),
            id,
        });
        Some(path)
    }

    /// Returns true if this key appears in the ancestor chain of `other`.
    ///
    /// A key is not its own ancestor.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Key) -> bool {
        let Some(id) = &self.id else {
            return false;
        };
        let depth = self.ancestors.len();
        match other.ancestors.get(depth) {
            Some(element) => {
                element.kind == self.kind
                    && &element.id == id
                    && other.ancestors[..depth] == self.ancestors[..]
            }
            None => false,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_key(self))
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_key(s)
    }
}

fn validate_kind(kind: String) -> KeyResult<String> {
    if kind.is_empty() {
        return Err(KeyError::invalid("key kinds must not be empty"));
    }
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_keys_validate_components() {
        assert!(Key::from_id("Parent", 1).is_ok());
        assert!(Key::from_name("Parent", "xyz").is_ok());
        assert!(matches!(Key::from_id("Parent", 0), Err(KeyError::Invalid { .. })));
        assert!(matches!(Key::from_name("Parent", ""), Err(KeyError::Invalid { .. })));
        assert!(matches!(Key::from_id("", 1), Err(KeyError::Invalid { .. })));
        assert!(matches!(Key::incomplete(""), Err(KeyError::Invalid { .. })));
    }

    #[test]
    fn child_keeps_parent_path() {
        let root = Key::from_id("A", 1).unwrap();
        let mid = root.child("B", KeyId::from("b")).unwrap();
        let leaf = mid.child("C", KeyId::Id(3)).unwrap();

        assert_eq!(leaf.ancestors().len(), 2);
        assert_eq!(leaf.parent(), Some(mid.clone()));
        assert_eq!(mid.parent(), Some(root.clone()));
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn incomplete_key_cannot_have_children() {
        let incomplete = Key::incomplete("A").unwrap();
        assert!(!incomplete.is_complete());
        assert!(incomplete.child("B", KeyId::Id(1)).is_err());
        assert!(incomplete.incomplete_child("B").is_err());
        assert_eq!(incomplete.path(), None);
    }

    #[test]
    fn with_id_completes_key() {
        let parent = Key::from_id("A", 1).unwrap();
        let incomplete = parent.incomplete_child("B").unwrap();
        let complete = incomplete.with_id(KeyId::Id(7)).unwrap();

        assert!(complete.is_complete());
        assert_eq!(complete, parent.child("B", KeyId::Id(7)).unwrap());
        assert!(incomplete.with_id(KeyId::Id(0)).is_err());
    }

    #[test]
    fn scope_drops_leaf_id() {
        let parent = Key::from_id("A", 1).unwrap();
        let first = parent.child("B", KeyId::Id(1)).unwrap();
        let second = parent.child("B", KeyId::from("x")).unwrap();

        assert_eq!(first.scope(), second.scope());
        assert_eq!(first.scope(), parent.incomplete_child("B").unwrap());
        assert_ne!(first.scope(), Key::incomplete("B").unwrap());
    }

    #[test]
    fn ancestor_relation() {
        let root = Key::from_id("A", 1).unwrap();
        let other_root = Key::from_id("A", 2).unwrap();
        let child = root.child("B", KeyId::Id(1)).unwrap();
        let grandchild = child.incomplete_child("C").unwrap();

        assert!(root.is_ancestor_of(&child));
        assert!(root.is_ancestor_of(&grandchild));
        assert!(child.is_ancestor_of(&grandchild));
        assert!(!root.is_ancestor_of(&root));
        assert!(!other_root.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&root));
        assert!(!grandchild.is_ancestor_of(&child));
    }

    #[test]
    fn from_path_roundtrip() {
        let key = Key::from_id("A", 1)
            .unwrap()
            .child("B", KeyId::from("x"))
            .unwrap();
        let rebuilt = Key::from_path(key.path().unwrap()).unwrap();
        assert_eq!(rebuilt, key);
        assert!(Key::from_path(Vec::new()).is_err());
    }

    #[test]
    fn ordering_groups_children() {
        let a1 = Key::from_id("A", 1).unwrap();
        let a2 = Key::from_id("A", 2).unwrap();
        let child = a1.child("B", KeyId::Id(9)).unwrap();

        let mut keys = vec![child.clone(), a2.clone(), a1.clone()];
        keys.sort();
        assert_eq!(keys, vec![a1, a2, child]);
    }

    #[test]
    fn key_id_accessors() {
        assert_eq!(KeyId::Id(4).as_id(), Some(4));
        assert_eq!(KeyId::Id(4).as_name(), None);
        assert_eq!(KeyId::from("n").as_name(), Some("n"));
        assert_eq!(format!("{}", KeyId::from("n")), "\"n\"");
    }
}
