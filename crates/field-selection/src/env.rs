// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Process-level defaults for [`crate::FieldsOptions`].
//!
//! A blank value reads the same as an unset one.

use std::collections::HashMap;

use crate::error::ConfigError;

pub const FIELDSEL_PATH: &str = "FIELDSEL_PATH";
pub const FIELDSEL_SKIP: &str = "FIELDSEL_SKIP";
pub const FIELDSEL_WITH_DIRECTIVES: &str = "FIELDSEL_WITH_DIRECTIVES";
pub const FIELDSEL_KEEP_PARENT_FIELD: &str = "FIELDSEL_KEEP_PARENT_FIELD";

const TRUE_WORDS: &[&str] = &["true", "1", "yes", "on", "enabled", "enable"];
const FALSE_WORDS: &[&str] = &["false", "0", "no", "off", "disabled", "disable"];

pub trait Environment {
    fn get(&self, key: &str) -> Option<String>;

    fn non_blank(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    /// `None` when the flag is unset, so each caller picks its own default.
    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.non_blank(key)
            .map(|value| parse_flag(key, value))
            .transpose()
    }

    fn entries(&self, key: &str) -> Vec<String> {
        self.non_blank(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_flag(key: &str, value: String) -> Result<bool, ConfigError> {
    let word = value.trim().to_lowercase();

    if TRUE_WORDS.contains(&word.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Ok(false)
    } else {
        Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value,
        })
    }
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of values, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment(HashMap<String, String>);

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(values: I) -> Self {
        Self(
            values
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for MapEnvironment {
    fn from(values: [(K, V); N]) -> Self {
        values.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let env = MapEnvironment::from([("A", " Yes "), ("B", "off"), ("C", "maybe"), ("D", "")]);

        assert_eq!(env.flag("A").unwrap(), Some(true));
        assert_eq!(env.flag("B").unwrap(), Some(false));
        assert_eq!(env.flag("D").unwrap(), None);
        assert_eq!(env.flag("MISSING").unwrap(), None);
        assert!(matches!(
            env.flag("C"),
            Err(ConfigError::InvalidBoolean { key, value }) if key == "C" && value == "maybe"
        ));
    }

    #[test]
    fn entries() {
        let env: MapEnvironment = [("LIST", " a.b , c.*,, "), ("BLANK", "  ")]
            .into_iter()
            .collect();

        assert_eq!(env.entries("LIST"), vec!["a.b", "c.*"]);
        assert!(env.entries("BLANK").is_empty());
        assert!(env.entries("MISSING").is_empty());
    }

    #[test]
    fn blank_reads_as_unset() {
        let env = MapEnvironment::from([("PATH_LIKE", " ")]);
        assert_eq!(env.non_blank("PATH_LIKE"), None);
    }
}
