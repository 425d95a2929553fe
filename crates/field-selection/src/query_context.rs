// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    Positioned, parse_query,
    types::{
        DocumentOperations, Field, OperationDefinition, OperationType, Selection,
        VariableDefinition,
    },
};
use async_graphql_value::ConstValue;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::{
    Fragments, Variables, directives, error::QueryContextError, resolve_info::ResolveInfo,
};

/// A parsed query narrowed down to one operation, with its variables coerced.
///
/// Stands in for the executor when a [`ResolveInfo`] is needed outside of one, for example
/// to inspect what a query asks of a given resolver.
#[derive(Debug)]
pub struct QueryContext {
    operation_name: Option<String>,
    operation: Positioned<OperationDefinition>,
    fragments: Fragments,
    variables: Variables,
}

impl QueryContext {
    /// Parse `query` and pick the operation to run.
    ///
    /// Operation selection:
    /// - A document with a single operation runs it (the name is optional)
    /// - A document with several operations requires a matching `operation_name`
    ///
    /// Each variable the operation declares takes its value from `variables`, falling back
    /// to the declared default. A non-null variable with neither is an error.
    #[instrument(
        name = "QueryContext::new"
        skip(query, variables)
        )]
    pub fn new(
        query: &str,
        operation_name: Option<&str>,
        variables: Option<Map<String, Value>>,
    ) -> Result<Self, QueryContextError> {
        let document = parse_query(query)
            .map_err(|error| QueryContextError::QueryParsingFailed(error.to_string()))?;

        let (operation_name, operation) = select_operation(document.operations, operation_name)?;
        let variables =
            coerce_variables(&operation.node.variable_definitions, variables.as_ref())?;

        Ok(Self {
            operation_name,
            operation,
            fragments: document.fragments,
            variables,
        })
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation.node.ty
    }

    pub fn fragments(&self) -> &Fragments {
        &self.fragments
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// The execution info the resolver at `path` would be called with.
    ///
    /// `path` is a dot-separated list of response keys (alias if present, field name
    /// otherwise) starting at the operation root, such as `viewer.posts`. Fields are
    /// collected the way an executor collects them: fragments are inlined, `@skip` and
    /// `@include` are applied, and every field sharing the response key contributes a node.
    pub fn resolve_info(&self, path: &str) -> Result<ResolveInfo<'_>, QueryContextError> {
        let mut selection_sets = vec![self.operation.node.selection_set.node.items.as_slice()];
        let mut field_nodes = vec![];

        for response_key in path.split('.') {
            field_nodes = vec![];
            for &selections in &selection_sets {
                self.collect_fields(
                    selections,
                    response_key,
                    &mut field_nodes,
                    &mut HashSet::new(),
                );
            }
            if field_nodes.is_empty() {
                return Err(QueryContextError::FieldNotFound(path.to_string()));
            }
            selection_sets = field_nodes
                .iter()
                .copied()
                .map(|field| field.node.selection_set.node.items.as_slice())
                .collect();
        }

        let field_name = field_nodes
            .first()
            .copied()
            .map(|field| field.node.name.node.as_str())
            .ok_or_else(|| QueryContextError::FieldNotFound(path.to_string()))?;

        debug!(path, field_name, nodes = field_nodes.len(), "resolved field nodes");

        Ok(ResolveInfo::new(
            field_name,
            field_nodes,
            &self.fragments,
            &self.variables,
        ))
    }

    fn collect_fields<'a>(
        &'a self,
        selections: &'a [Positioned<Selection>],
        response_key: &str,
        field_nodes: &mut Vec<&'a Positioned<Field>>,
        visited_fragments: &mut HashSet<&'a str>,
    ) {
        for selection in selections {
            if !directives::is_included(
                directives::selection_directives(&selection.node),
                &self.variables,
            ) {
                continue;
            }

            match &selection.node {
                Selection::Field(field) => {
                    let key = field.node.alias.as_ref().unwrap_or(&field.node.name);
                    if key.node.as_str() == response_key {
                        field_nodes.push(field);
                    }
                }
                Selection::InlineFragment(fragment) => self.collect_fields(
                    &fragment.node.selection_set.node.items,
                    response_key,
                    field_nodes,
                    visited_fragments,
                ),
                Selection::FragmentSpread(spread) => {
                    let fragment_name = spread.node.fragment_name.node.as_str();
                    if !visited_fragments.insert(fragment_name) {
                        continue;
                    }
                    if let Some(fragment) = self.fragments.get(fragment_name) {
                        self.collect_fields(
                            &fragment.node.selection_set.node.items,
                            response_key,
                            field_nodes,
                            visited_fragments,
                        );
                    }
                }
            }
        }
    }
}

fn select_operation(
    operations: DocumentOperations,
    operation_name: Option<&str>,
) -> Result<(Option<String>, Positioned<OperationDefinition>), QueryContextError> {
    match operations {
        // `Single` only holds an anonymous operation, which no name can select
        DocumentOperations::Single(operation) => match operation_name {
            None => Ok((None, operation)),
            Some(operation_name) => Err(QueryContextError::UnmatchedOperationName(
                operation_name.to_string(),
            )),
        },
        DocumentOperations::Multiple(mut operations) => match operation_name {
            _ if operations.is_empty() => Err(QueryContextError::NoOperationFound),
            // A named operation parses as `Multiple` even when it is alone in the document
            None if operations.len() == 1 => operations
                .into_iter()
                .next()
                .map(|(name, operation)| (Some(name.to_string()), operation))
                .ok_or(QueryContextError::NoOperationFound),
            None => Err(QueryContextError::MultipleOperationsNoOperationName),
            Some(operation_name) => match operations.remove(operation_name) {
                Some(operation) => Ok((Some(operation_name.to_string()), operation)),
                None => Err(QueryContextError::UnmatchedOperationName(
                    operation_name.to_string(),
                )),
            },
        },
    }
}

fn coerce_variables(
    variable_definitions: &[Positioned<VariableDefinition>],
    variables: Option<&Map<String, Value>>,
) -> Result<Variables, QueryContextError> {
    let mut coerced = HashMap::new();

    for variable_definition in variable_definitions {
        let name = &variable_definition.node.name;
        let supplied = variables.and_then(|variables| variables.get(name.node.as_str()));

        let value = match (supplied, &variable_definition.node.default_value) {
            (Some(value), _) => ConstValue::from_json(value.to_owned()).map_err(|e| {
                QueryContextError::MalformedVariable(name.node.to_string(), name.pos, e)
            })?,
            (None, Some(default_value)) => default_value.node.clone(),
            (None, None) if variable_definition.node.var_type.node.nullable => continue,
            (None, None) => {
                return Err(QueryContextError::VariableNotFound(
                    name.node.to_string(),
                    name.pos,
                ));
            }
        };
        coerced.insert(name.node.clone(), value);
    }

    Ok(coerced)
}
