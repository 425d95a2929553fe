// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compute the fields a GraphQL query requests from a resolver.
//!
//! Given the [`ResolveInfo`] of the field being resolved, the functions here report which of
//! its subfields the client asked for, with fragments inlined and `@skip`/`@include`
//! applied:
//! - [`field_map`] as a nested map
//! - [`field_list`] as the list of field names at one level
//! - [`field_projection`] as flat dot-notation paths

use std::collections::HashMap;

use async_graphql_parser::{Positioned, types::FragmentDefinition};
use async_graphql_value::{ConstValue, Name};
use tracing::{debug, instrument};

pub mod directives;
pub mod env;
pub mod error;
pub mod field_map;
pub mod options;
pub mod projection;
pub mod query_context;
pub mod resolve_info;
pub mod skip_tree;

mod walker;

pub use field_map::{FieldMap, FieldSelection};
pub use options::FieldsOptions;
pub use projection::FieldProjection;
pub use query_context::QueryContext;
pub use resolve_info::ResolveInfo;

use skip_tree::SkipTree;
use walker::SelectionWalker;

/// Fragment definitions of a document, by name.
pub type Fragments = HashMap<Name, Positioned<FragmentDefinition>>;

/// Variable values of an operation, by name.
pub type Variables = HashMap<Name, ConstValue>;

/// The requested subfields of the field being resolved, as a nested map.
///
/// Empty when nothing is requested (such as for a scalar field) or when `options.path` does
/// not address a requested field with subfields.
#[instrument(skip_all, fields(field_name = info.field_name))]
pub fn field_map(info: &ResolveInfo<'_>, options: &FieldsOptions) -> FieldMap {
    let Some(selections) = info.requested_selections() else {
        debug!("no subfields requested");
        return FieldMap::new();
    };

    let skip_tree = SkipTree::compile(&options.skip);
    let walker = SelectionWalker::new(info.fragments, info.variables, options.with_directives);

    walker
        .walk(selections, Some(&skip_tree))
        .into_branch(options.path.as_deref())
}

/// The names of the requested fields at the selected level, renamed through
/// `options.transform`.
#[instrument(skip_all, fields(field_name = info.field_name))]
pub fn field_list(info: &ResolveInfo<'_>, options: &FieldsOptions) -> Vec<String> {
    field_map(info, options)
        .into_keys()
        .map(|name| options.transform.get(&name).cloned().unwrap_or(name))
        .collect()
}

/// The requested fields at the selected level as dot-notation paths.
#[instrument(skip_all, fields(field_name = info.field_name))]
pub fn field_projection(info: &ResolveInfo<'_>, options: &FieldsOptions) -> FieldProjection {
    projection::flatten(
        &field_map(info, options),
        &options.transform,
        options.keep_parent_field,
    )
}
