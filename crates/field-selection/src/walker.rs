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
use tracing::{debug, trace};

use crate::{
    Fragments, Variables, directives,
    field_map::FieldMap,
    skip_tree::{SkipRule, SkipTree},
};

/// Walks a selection set and records the requested fields in a [`FieldMap`].
///
/// Fragments (named or inline) are transparent: their selections land at the level of the
/// spread. Named fragments are expanded without cycle detection, so a fragment spreading
/// itself recurses until the stack is exhausted; rejecting such documents is left to
/// validation.
pub(crate) struct SelectionWalker<'a> {
    fragments: &'a Fragments,
    variables: &'a Variables,
    with_directives: bool,
}

impl<'a> SelectionWalker<'a> {
    pub(crate) fn new(
        fragments: &'a Fragments,
        variables: &'a Variables,
        with_directives: bool,
    ) -> Self {
        Self {
            fragments,
            variables,
            with_directives,
        }
    }

    pub(crate) fn walk(
        &self,
        selections: &[Positioned<Selection>],
        skip: Option<&SkipTree>,
    ) -> FieldMap {
        let mut map = FieldMap::new();
        self.collect(selections, &mut map, skip);
        map
    }

    fn collect(
        &self,
        selections: &[Positioned<Selection>],
        target: &mut FieldMap,
        skip: Option<&SkipTree>,
    ) {
        for selection in selections {
            if self.with_directives
                && !directives::is_included(
                    directives::selection_directives(&selection.node),
                    self.variables,
                )
            {
                trace!(pos = %selection.pos, "selection excluded by directive");
                continue;
            }

            match &selection.node {
                Selection::Field(field) => self.collect_field(&field.node, target, skip),
                Selection::InlineFragment(fragment) => {
                    self.collect(&fragment.node.selection_set.node.items, target, skip)
                }
                Selection::FragmentSpread(spread) => {
                    let fragment_name = spread.node.fragment_name.node.as_str();
                    match self.fragments.get(fragment_name) {
                        Some(fragment) => {
                            self.collect(&fragment.node.selection_set.node.items, target, skip)
                        }
                        None => debug!(fragment_name, "spread of an undefined fragment"),
                    }
                }
            }
        }
    }

    fn collect_field(&self, field: &Field, target: &mut FieldMap, skip: Option<&SkipTree>) {
        let field_name = field.name.node.as_str();

        let nested_skip = match skip.and_then(|tree| tree.resolve(field_name)) {
            Some(SkipRule::All) => {
                trace!(field_name, "field excluded by skip pattern");
                return;
            }
            Some(SkipRule::Nested(tree)) => Some(tree),
            None => None,
        };

        let children = &field.selection_set.node.items;
        if children.is_empty() {
            target.insert_leaf(field_name);
        } else {
            let child_map = target.insert_node(field_name);
            self.collect(children, child_map, nested_skip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_graphql_parser::{parse_query, types::DocumentOperations};
    use serde_json::{Value, json};
    use test_log::test;

    fn walk(query: &str, skip: &[&str], with_directives: bool) -> Value {
        let document = parse_query(query).unwrap();
        let DocumentOperations::Single(operation) = document.operations else {
            panic!("expected a single anonymous operation");
        };
        let variables = Variables::new();
        let walker = SelectionWalker::new(&document.fragments, &variables, with_directives);
        let skip_tree = SkipTree::compile(skip);

        serde_json::to_value(walker.walk(&operation.node.selection_set.node.items, Some(&skip_tree)))
            .unwrap()
    }

    #[test]
    fn nested_fields() {
        assert_eq!(
            walk("{ a { b c } d }", &[], true),
            json!({ "a": { "b": false, "c": false }, "d": false })
        );
    }

    #[test]
    fn repeated_fields_merge() {
        assert_eq!(
            walk("{ a { b } d a { c } d a }", &[], true),
            json!({ "a": { "b": false, "c": false }, "d": false })
        );
    }

    #[test]
    fn aliases_use_field_name() {
        assert_eq!(
            walk("{ first: a { b } second: a { c } }", &[], true),
            json!({ "a": { "b": false, "c": false } })
        );
    }

    #[test]
    fn fragments_are_inlined() {
        let query = r#"
            {
                a {
                    ...Details
                    ... on A { c }
                    ... { d }
                }
            }

            fragment Details on A {
                b
                ...More
            }

            fragment More on A {
                e { f }
            }
        "#;
        assert_eq!(
            walk(query, &[], true),
            json!({ "a": { "b": false, "c": false, "d": false, "e": { "f": false } } })
        );
    }

    #[test]
    fn undefined_fragment_contributes_nothing() {
        assert_eq!(walk("{ a { ...Missing b } }", &[], true), json!({ "a": { "b": false } }));
    }

    #[test]
    fn skip_patterns_prune_fields() {
        assert_eq!(
            walk("{ a { b c } d }", &["a.c"], true),
            json!({ "a": { "b": false }, "d": false })
        );
    }

    #[test]
    fn skip_patterns_apply_through_fragments() {
        let query = r#"
            { a { ...F } }
            fragment F on A { b c { d e } }
        "#;
        assert_eq!(
            walk(query, &["a.c.e"], true),
            json!({ "a": { "b": false, "c": { "d": false } } })
        );
    }

    #[test]
    fn wildcard_skip_precedence() {
        assert_eq!(
            walk("{ a { b c } x { b } }", &["a.b", "a.*"], true),
            json!({ "a": {}, "x": { "b": false } })
        );
        assert_eq!(walk("{ a }", &["a.b", "a.*"], true), json!({ "a": false }));
    }

    #[test]
    fn directives_are_honoured() {
        let query = r#"
            {
                a @skip(if: true)
                b @include(if: false)
                c @include(if: true) { d @skip(if: true) e }
                ... @skip(if: true) { f }
                ...G @include(if: false)
            }
            fragment G on Query { g }
        "#;
        assert_eq!(walk(query, &[], true), json!({ "c": { "e": false } }));
    }

    #[test]
    fn directives_can_be_disabled() {
        let query = r#"
            {
                a @skip(if: true)
                ... @skip(if: true) { f }
            }
        "#;
        assert_eq!(walk(query, &[], false), json!({ "a": false, "f": false }));
    }
}
