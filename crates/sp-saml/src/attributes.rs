//! The attribute container.
//!
//! [`Attributes`] is a small ordered multi-map from attribute name to the
//! values collected for it. Every value is kept, in document order, and a
//! nil value (`xsi:nil`) stays distinct from an empty string.
//!
//! Scalar access through [`Attributes::get`] depends on the container's
//! single-value compatibility mode, chosen when the container is built:
//!
//! - on: the first value, like older SP libraries that only kept one
//! - off: the full value list
//!
//! [`Attributes::single`] and [`Attributes::multi`] ignore the mode.

use roxmltree::Node;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::constants::XSI_NS;
use crate::extract::{find_all, paths, text_content};

/// Values collected for one attribute name.
pub type AttributeValues = Vec<Option<String>>;

/// Result of a mode-dependent lookup through [`Attributes::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeLookup<'a> {
    /// First value, in compatibility mode. `None` for a nil value.
    Single(Option<&'a str>),
    /// All values, with compatibility mode off.
    Multi(&'a [Option<String>]),
}

impl<'a> AttributeLookup<'a> {
    /// The first value, whichever form the lookup took.
    #[must_use]
    pub fn first(self) -> Option<&'a str> {
        match self {
            Self::Single(value) => value,
            Self::Multi(values) => values.first().and_then(Option::as_deref),
        }
    }
}

/// Ordered attribute name to values mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValues)>,
    single_value_compatibility: bool,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Attributes {
    /// Creates an empty container.
    #[must_use]
    pub const fn new(single_value_compatibility: bool) -> Self {
        Self {
            entries: Vec::new(),
            single_value_compatibility,
        }
    }

    /// Collects every `AttributeStatement/Attribute` of a trusted assertion.
    ///
    /// An attribute is named by `Name`, or `FriendlyName` when `Name` is
    /// missing; attributes with neither are skipped. Values for a name that
    /// recurs are appended in the order they appear.
    #[must_use]
    pub fn from_assertion(assertion: Node<'_, '_>, single_value_compatibility: bool) -> Self {
        let mut attributes = Self::new(single_value_compatibility);
        for attribute in find_all(assertion, paths::ATTRIBUTE) {
            let Some(name) = attribute
                .attribute("Name")
                .or_else(|| attribute.attribute("FriendlyName"))
            else {
                continue;
            };
            let values = find_all(attribute, paths::ATTRIBUTE_VALUE)
                .into_iter()
                .map(attribute_value);
            attributes.entry_mut(name).extend(values);
        }
        attributes
    }

    /// Whether [`Attributes::get`] yields the first value only.
    #[must_use]
    pub const fn single_value_compatibility(&self) -> bool {
        self.single_value_compatibility
    }

    /// Looks up `name` according to the compatibility mode.
    ///
    /// Returns `None` if the attribute was never present.
    #[must_use]
    pub fn get(&self, name: impl AsRef<str>) -> Option<AttributeLookup<'_>> {
        let values = self.values(name.as_ref())?;
        Some(if self.single_value_compatibility {
            AttributeLookup::Single(values.first().and_then(Option::as_deref))
        } else {
            AttributeLookup::Multi(values)
        })
    }

    /// The first value of `name`, or `None` if absent or nil.
    #[must_use]
    pub fn single(&self, name: impl AsRef<str>) -> Option<&str> {
        self.values(name.as_ref())?.first()?.as_deref()
    }

    /// All values of `name`, or `None` if absent.
    #[must_use]
    pub fn multi(&self, name: impl AsRef<str>) -> Option<&[Option<String>]> {
        self.values(name.as_ref())
    }

    /// Returns true if `name` is present.
    #[must_use]
    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.values(name.as_ref()).is_some()
    }

    /// Iterates over names and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of distinct attribute names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends one value to `name`, creating it if needed.
    pub fn add(&mut self, name: impl AsRef<str>, value: Option<String>) {
        self.entry_mut(name.as_ref()).push(value);
    }

    /// Replaces the values of `name`.
    pub fn set(&mut self, name: impl AsRef<str>, values: AttributeValues) {
        *self.entry_mut(name.as_ref()) = values;
    }

    /// Returns a copy with `other`'s entries applied on top, replacing
    /// values of names present in both.
    #[must_use]
    pub fn merge(&self, other: impl IntoIterator<Item = (String, AttributeValues)>) -> Self {
        let mut merged = self.clone();
        merged.merge_in(other);
        merged
    }

    /// Applies `other`'s entries in place, replacing values of names
    /// present in both.
    pub fn merge_in(&mut self, other: impl IntoIterator<Item = (String, AttributeValues)>) {
        for (name, values) in other {
            self.set(name, values);
        }
    }

    /// Removes and returns the first attribute.
    pub fn shift(&mut self) -> Option<(String, AttributeValues)> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    fn values(&self, name: &str) -> Option<&[Option<String>]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    fn entry_mut(&mut self, name: &str) -> &mut AttributeValues {
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttributeValues);
    type IntoIter = std::vec::IntoIter<(String, AttributeValues)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

fn attribute_value(value: Node<'_, '_>) -> Option<String> {
    if let Some(nil) = value.attribute((XSI_NS, "nil")) {
        if matches!(nil.trim(), "true" | "1") {
            return None;
        }
    }
    match value.children().find(Node::is_element) {
        Some(nested) => Some(text_content(nested)),
        None => Some(text_content(value)),
    }
}
