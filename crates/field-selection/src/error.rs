// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryContextError {
    #[error("{0}")]
    QueryParsingFailed(String),

    #[error("Variable '{0}' not found")]
    VariableNotFound(String, Pos),

    #[error("Variable '{0}' could not be deserialized: {2}")]
    MalformedVariable(String, Pos, serde_json::Error),

    #[error("No operation found")]
    NoOperationFound,

    #[error("Must provide operation name if query contains multiple operations")]
    MultipleOperationsNoOperationName,

    #[error("operationName '{0}' doesn't match any operation")]
    UnmatchedOperationName(String),

    #[error("No field is selected at '{0}'")]
    FieldNotFound(String),
}

impl QueryContextError {
    pub fn position(&self) -> Option<Pos> {
        match self {
            QueryContextError::VariableNotFound(_, pos) => Some(*pos),
            QueryContextError::MalformedVariable(_, pos, _) => Some(*pos),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid field selection options: {0}")]
    MalformedOptions(#[from] serde_json::Error),
}
