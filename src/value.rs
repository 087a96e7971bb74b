//! Query-language values exchanged with user functions.
//!
//! The host query engine passes every argument as a [`Sequence`] of
//! [`Item`]s. Only the item kinds the unrar function produces or inspects are
//! modelled here.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::markup::Document;

/// Kind of an archive entry as seen by user functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Resource,
    Folder,
}

impl EntryKind {
    pub fn from_directory_flag(is_directory: bool) -> Self {
        if is_directory {
            Self::Folder
        } else {
            Self::Resource
        }
    }

    /// The `$data-type` string passed to user functions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Folder => "folder",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `xs:base64Binary` value holding raw entry bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Base64Binary(Vec<u8>);

impl Base64Binary {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lexical form of the value.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl fmt::Debug for Base64Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base64Binary({} bytes)", self.0.len())
    }
}

/// A single item of a [`Sequence`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    String(String),
    AnyUri(String),
    Boolean(bool),
    Integer(i64),
    Document(Document),
    Binary(Base64Binary),
}

impl Item {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn any_uri(value: impl Into<String>) -> Self {
        Self::AnyUri(value.into())
    }

    /// The string value of the item, as `fn:string` would compute it.
    ///
    /// Documents yield their serialized markup and binary values their
    /// base64 lexical form.
    pub fn string_value(&self) -> String {
        match self {
            Self::String(s) | Self::AnyUri(s) => s.clone(),
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Document(doc) => doc.as_str().to_owned(),
            Self::Binary(bin) => bin.to_base64(),
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Document> for Item {
    fn from(value: Document) -> Self {
        Self::Document(value)
    }
}

impl From<Base64Binary> for Item {
    fn from(value: Base64Binary) -> Self {
        Self::Binary(value)
    }
}

/// An ordered sequence of items (`item()*`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence(Vec<Item>);

impl Sequence {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn one(item: impl Into<Item>) -> Self {
        Self(vec![item.into()])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Item> {
        self.0.first()
    }

    pub fn item_at(&self, index: usize) -> Option<&Item> {
        self.0.get(index)
    }

    pub fn push(&mut self, item: impl Into<Item>) {
        self.0.push(item.into());
    }

    pub fn append(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.0
    }
}

impl From<Vec<Item>> for Sequence {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl From<Item> for Sequence {
    fn from(item: Item) -> Self {
        Self(vec![item])
    }
}

impl FromIterator<Item> for Sequence {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Item> for Sequence {
    fn extend<I: IntoIterator<Item = Item>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Sequence {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_strings() {
        assert_eq!(EntryKind::from_directory_flag(true).as_str(), "folder");
        assert_eq!(EntryKind::from_directory_flag(false).to_string(), "resource");
    }

    #[test]
    fn test_binary_string_value_is_base64() {
        let item = Item::Binary(Base64Binary::new(b"hello".to_vec()));
        assert_eq!(item.string_value(), "aGVsbG8=");
    }

    #[test]
    fn test_sequence_append_keeps_order() {
        let mut seq = Sequence::one("a");
        seq.append(Sequence::from(vec![Item::from("b"), Item::from(true)]));
        let strings: Vec<String> = seq.iter().map(Item::string_value).collect();
        assert_eq!(strings, ["a", "b", "true"]);
    }
}
