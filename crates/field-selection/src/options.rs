// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    env::{
        Environment, FIELDSEL_KEEP_PARENT_FIELD, FIELDSEL_PATH, FIELDSEL_SKIP,
        FIELDSEL_WITH_DIRECTIVES,
    },
    error::ConfigError,
};

/// How the requested fields should be computed and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldsOptions {
    /// Dot-separated path of the branch to return, relative to the resolved field.
    pub path: Option<String>,
    /// Replacement names, keyed by field name for field lists and by dot path for
    /// projections.
    pub transform: HashMap<String, String>,
    /// Honour `@skip` and `@include`.
    pub with_directives: bool,
    /// Also list intermediate paths in projections.
    pub keep_parent_field: bool,
    /// Dot-separated patterns of fields to leave out (see [`crate::skip_tree`]).
    pub skip: Vec<String>,
}

impl Default for FieldsOptions {
    fn default() -> Self {
        Self {
            path: None,
            transform: HashMap::new(),
            with_directives: true,
            keep_parent_field: false,
            skip: vec![],
        }
    }
}

impl FieldsOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Options from `FIELDSEL_*` variables; anything unset keeps its default.
    pub fn from_env(env: &dyn Environment) -> Result<Self, ConfigError> {
        Ok(Self {
            path: env.non_blank(FIELDSEL_PATH),
            transform: HashMap::new(),
            with_directives: env.flag(FIELDSEL_WITH_DIRECTIVES)?.unwrap_or(true),
            keep_parent_field: env.flag(FIELDSEL_KEEP_PARENT_FIELD)?.unwrap_or(false),
            skip: env.entries(FIELDSEL_SKIP),
        })
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_skip<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.skip.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_transform<K: Into<String>, V: Into<String>>(
        mut self,
        transform: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.transform.extend(
            transform
                .into_iter()
                .map(|(from, to)| (from.into(), to.into())),
        );
        self
    }

    pub fn with_directives(mut self, with_directives: bool) -> Self {
        self.with_directives = with_directives;
        self
    }

    pub fn keep_parent_field(mut self, keep_parent_field: bool) -> Self {
        self.keep_parent_field = keep_parent_field;
        self
    }
}
