// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{
    Positioned,
    types::{Field, Selection},
};

use crate::{Fragments, Variables};

/// What a resolver knows about the field it is resolving.
///
/// Mirrors the execution info a GraphQL executor hands to field resolvers: the field nodes
/// requesting this field, its name, and the document-wide fragments and variables. Older
/// executors expose the field nodes under a different name; such callers populate
/// `legacy_field_nodes` instead.
#[derive(Debug, Clone)]
pub struct ResolveInfo<'a> {
    pub field_name: &'a str,
    pub field_nodes: Option<Vec<&'a Positioned<Field>>>,
    pub legacy_field_nodes: Option<Vec<&'a Positioned<Field>>>,
    pub fragments: &'a Fragments,
    pub variables: &'a Variables,
}

impl<'a> ResolveInfo<'a> {
    pub fn new(
        field_name: &'a str,
        field_nodes: Vec<&'a Positioned<Field>>,
        fragments: &'a Fragments,
        variables: &'a Variables,
    ) -> Self {
        Self {
            field_name,
            field_nodes: Some(field_nodes),
            legacy_field_nodes: None,
            fragments,
            variables,
        }
    }

    pub fn with_legacy_field_nodes(
        field_name: &'a str,
        legacy_field_nodes: Vec<&'a Positioned<Field>>,
        fragments: &'a Fragments,
        variables: &'a Variables,
    ) -> Self {
        Self {
            field_name,
            field_nodes: None,
            legacy_field_nodes: Some(legacy_field_nodes),
            fragments,
            variables,
        }
    }

    /// The sub-selections requested for the field being resolved.
    ///
    /// Picks the first field node named after the current field that selects subfields.
    /// `None` means no subfields were requested, which is always the case for fields of
    /// scalar type.
    pub fn requested_selections(&self) -> Option<&'a [Positioned<Selection>]> {
        let field_nodes = self
            .field_nodes
            .as_deref()
            .or(self.legacy_field_nodes.as_deref())?;

        field_nodes
            .iter()
            .copied()
            .find(|field| {
                field.node.name.node.as_str() == self.field_name
                    && !field.node.selection_set.node.items.is_empty()
            })
            .map(|field| field.node.selection_set.node.items.as_slice())
    }
}
