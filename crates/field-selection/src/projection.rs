// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use serde::Serialize;

use crate::field_map::{FieldMap, FieldSelection};

const PROJECTED: u8 = 1;

/// Flat, dot-notation view of the requested fields (`{"user.name": 1, ...}`), in the shape
/// document stores accept as a projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldProjection(IndexMap<String, u8>);

impl FieldProjection {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Flatten a field map breadth-first.
///
/// Leaf paths go through `transform` (keyed by the full dot path); parent paths, recorded
/// only with `keep_parent_field`, are never renamed.
pub(crate) fn flatten(
    map: &FieldMap,
    transform: &HashMap<String, String>,
    keep_parent_field: bool,
) -> FieldProjection {
    let mut projection = IndexMap::new();
    let mut pending: VecDeque<(String, &FieldMap)> = VecDeque::from([(String::new(), map)]);

    while let Some((prefix, level)) = pending.pop_front() {
        for (name, selection) in level.iter() {
            let path = dotted(&prefix, name);
            match selection {
                FieldSelection::Node(children) => {
                    if keep_parent_field {
                        projection.insert(path.clone(), PROJECTED);
                    }
                    pending.push_back((path, children));
                }
                FieldSelection::Leaf => {
                    let key = transform.get(&path).cloned().unwrap_or(path);
                    projection.insert(key, PROJECTED);
                }
            }
        }
    }

    FieldProjection(projection)
}

fn dotted(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}
