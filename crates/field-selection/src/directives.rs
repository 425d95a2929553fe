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
    types::{Directive, Selection},
};
use async_graphql_value::{ConstValue, Value};

use crate::Variables;

const SKIP: &str = "skip";
const INCLUDE: &str = "include";

/// Evaluate `@skip` and `@include` on a selection.
///
/// Every `@skip` must evaluate to false and every `@include` to true. Other directives
/// don't take part, and an argument that is neither a boolean nor a variable is ignored.
pub fn is_included(directives: &[Positioned<Directive>], variables: &Variables) -> bool {
    directives
        .iter()
        .all(|directive| directive_permits(&directive.node, variables))
}

pub(crate) fn selection_directives(selection: &Selection) -> &[Positioned<Directive>] {
    match selection {
        Selection::Field(field) => &field.node.directives,
        Selection::FragmentSpread(spread) => &spread.node.directives,
        Selection::InlineFragment(fragment) => &fragment.node.directives,
    }
}

fn directive_permits(directive: &Directive, variables: &Variables) -> bool {
    let required = match directive.name.node.as_str() {
        SKIP => false,
        INCLUDE => true,
        _ => return true,
    };

    directive
        .arguments
        .iter()
        .all(|(_, value)| match condition(&value.node, variables) {
            Some(condition) => condition == required,
            None => true,
        })
}

fn condition(value: &Value, variables: &Variables) -> Option<bool> {
    match value {
        Value::Boolean(value) => Some(*value),
        // An unbound or non-boolean variable reads as false
        Value::Variable(name) => Some(matches!(
            variables.get(name),
            Some(ConstValue::Boolean(true))
        )),
        _ => None,
    }
}
