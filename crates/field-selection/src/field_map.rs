// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

/// A requested field: either a leaf or a field with its own requested subfields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    Leaf,
    Node(FieldMap),
}

impl FieldSelection {
    pub fn children(&self) -> Option<&FieldMap> {
        match self {
            FieldSelection::Leaf => None,
            FieldSelection::Node(children) => Some(children),
        }
    }
}

/// The fields requested at one level of a query, keyed by field name in the order they were
/// first requested.
///
/// Serializes to the nested JSON shape resolvers conventionally work with: a leaf becomes
/// `false`, a field with subfields becomes an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: IndexMap<String, FieldSelection>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSelection> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSelection)> {
        self.fields
            .iter()
            .map(|(name, selection)| (name.as_str(), selection))
    }

    pub fn into_keys(self) -> impl Iterator<Item = String> {
        self.fields.into_keys()
    }

    /// Record a leaf field. An entry already present (leaf or not) is left untouched.
    pub fn insert_leaf(&mut self, name: &str) {
        if !self.fields.contains_key(name) {
            self.fields.insert(name.to_owned(), FieldSelection::Leaf);
        }
    }

    /// Record a field with subfields and return its (possibly pre-existing) children. A leaf
    /// recorded earlier under the same name is promoted in place.
    pub fn insert_node(&mut self, name: &str) -> &mut FieldMap {
        let selection = self
            .fields
            .entry(name.to_owned())
            .or_insert_with(|| FieldSelection::Node(FieldMap::default()));

        if let FieldSelection::Leaf = selection {
            *selection = FieldSelection::Node(FieldMap::default());
        }

        match selection {
            FieldSelection::Node(children) => children,
            FieldSelection::Leaf => unreachable!("leaf entries are promoted above"),
        }
    }

    /// Extract the subtree addressed by a dot-separated path.
    ///
    /// No path (or an empty one) returns the map unchanged. A path running into a missing
    /// field or a leaf yields an empty map.
    pub fn into_branch(self, path: Option<&str>) -> FieldMap {
        let Some(path) = path.filter(|path| !path.is_empty()) else {
            return self;
        };

        let mut current = self;
        for segment in path.split('.') {
            match current.fields.shift_remove(segment) {
                Some(FieldSelection::Node(children)) => current = children,
                _ => return FieldMap::default(),
            }
        }
        current
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a FieldSelection);
    type IntoIter = indexmap::map::Iter<'a, String, FieldSelection>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for FieldSelection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldSelection::Leaf => serializer.serialize_bool(false),
            FieldSelection::Node(children) => children.serialize(serializer),
        }
    }
}

impl Serialize for FieldMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, selection) in &self.fields {
            map.serialize_entry(name, selection)?;
        }
        map.end()
    }
}
