// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compiled form of the caller-supplied skip patterns.
//!
//! A pattern is a dot-separated field path such as `user.profile.avatar`. Any segment may
//! contain `*`, which matches any run of characters within that segment. A trailing `.*`
//! skips everything beneath the preceding segment. No other character is special, so `?`
//! only matches itself.

use indexmap::IndexMap;
use tracing::trace;
use wildmatch::WildMatchPattern;

const WILDCARD: &str = "*";

/// Segment matcher with `*` as its only wildcard. GraphQL names never contain NUL, so the
/// single-character wildcard slot is effectively disabled.
type SegmentMatch = WildMatchPattern<'*', '\0'>;

/// What a skip tree says about a single field.
#[derive(Debug, Clone)]
pub enum SkipRule {
    /// Omit the field and everything beneath it.
    All,
    /// Keep the field, but apply these rules to its subfields.
    Nested(SkipTree),
}

#[derive(Debug, Clone, Default)]
pub struct SkipTree {
    rules: IndexMap<String, SkipRule>,
    /// Matchers for the keys of `rules` containing a wildcard, in key order, along with the
    /// index of the rule they belong to.
    wildcards: Vec<(SegmentMatch, usize)>,
}

impl SkipTree {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut tree = SkipTree::default();
        for pattern in patterns {
            tree.add_pattern(pattern.as_ref());
        }
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule applying to a field at this level, if any.
    ///
    /// An exact key always wins. Otherwise wildcard keys are tried in order: the first one
    /// skipping the field outright wins, and failing that the last nested match applies.
    pub fn resolve(&self, field_name: &str) -> Option<&SkipRule> {
        if let Some(rule) = self.rules.get(field_name) {
            trace!(field_name, "exact skip rule");
            return Some(rule);
        }

        let mut candidate = None;
        for (matcher, index) in &self.wildcards {
            if !matcher.matches(field_name) {
                continue;
            }
            match self.rules.get_index(*index) {
                Some((pattern, rule @ SkipRule::All)) => {
                    trace!(field_name, pattern, "wildcard skip rule");
                    return Some(rule);
                }
                Some((_, rule @ SkipRule::Nested(_))) => candidate = Some(rule),
                None => {}
            }
        }
        candidate
    }

    fn add_pattern(&mut self, pattern: &str) {
        let segments: Vec<&str> = pattern.split('.').collect();

        let mut node = self;
        for (index, segment) in segments.iter().enumerate() {
            let last = index + 1 == segments.len();
            let before_wildcard = segments.get(index + 1) == Some(&WILDCARD);

            if !node.rules.contains_key(*segment) {
                if last || before_wildcard {
                    node.insert(segment, SkipRule::All);
                    return;
                }
                node.insert(segment, SkipRule::Nested(SkipTree::default()));
            } else if last {
                if let Some(rule) = node.rules.get_mut(*segment) {
                    *rule = SkipRule::All;
                }
                return;
            }

            // A field already skipped as a whole absorbs any finer-grained pattern
            match node.rules.get_mut(*segment) {
                Some(SkipRule::Nested(child)) => node = child,
                _ => return,
            }
        }
    }

    fn insert(&mut self, key: &str, rule: SkipRule) {
        let (index, _) = self.rules.insert_full(key.to_owned(), rule);
        if key.contains(WILDCARD) {
            self.wildcards.push((SegmentMatch::new(key), index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_all(rule: Option<&SkipRule>) -> bool {
        matches!(rule, Some(SkipRule::All))
    }

    fn nested<'a>(tree: &'a SkipTree, field_name: &str) -> &'a SkipTree {
        match tree.resolve(field_name) {
            Some(SkipRule::Nested(child)) => child,
            other => panic!("expected nested rule for {field_name}, got {other:?}"),
        }
    }

    #[test]
    fn empty_patterns_skip_nothing() {
        let tree = SkipTree::compile::<&str>(&[]);
        assert!(tree.is_empty());
        assert!(tree.resolve("anything").is_none());
    }

    #[test]
    fn last_segment_skips_field() {
        let tree = SkipTree::compile(&["user.email"]);

        let user = nested(&tree, "user");
        assert!(is_all(user.resolve("email")));
        assert!(user.resolve("name").is_none());
        assert!(tree.resolve("email").is_none());
    }

    #[test]
    fn trailing_wildcard_is_consumed() {
        let tree = SkipTree::compile(&["user.*"]);

        assert!(is_all(tree.resolve("user")));
        assert!(tree.resolve("*").is_none());
    }

    #[test]
    fn trailing_wildcard_below_existing_subtree() {
        let tree = SkipTree::compile(&["a.b", "a.*"]);

        let a = nested(&tree, "a");
        assert!(is_all(a.resolve("b")));
        assert!(is_all(a.resolve("c")));
    }

    #[test]
    fn whole_field_absorbs_later_patterns() {
        let tree = SkipTree::compile(&["a", "a.b"]);
        assert!(is_all(tree.resolve("a")));
    }

    #[test]
    fn whole_field_upgrades_earlier_subtree() {
        let tree = SkipTree::compile(&["a.b", "a"]);
        assert!(is_all(tree.resolve("a")));
    }

    #[test]
    fn partial_wildcards_match_whole_segment() {
        let tree = SkipTree::compile(&["*Count", "meta*.raw"]);

        assert!(is_all(tree.resolve("commentCount")));
        assert!(tree.resolve("countOfComments").is_none());
        assert!(is_all(nested(&tree, "metadata").resolve("raw")));
    }

    #[test]
    fn question_mark_is_not_a_wildcard() {
        let tree = SkipTree::compile(&["us?rs*"]);

        assert!(tree.resolve("usXrs").is_none());
        assert!(tree.resolve("usersCount").is_none());
        assert!(is_all(tree.resolve("us?rsCount")));
    }

    #[test]
    fn exact_match_beats_wildcard() {
        let tree = SkipTree::compile(&["*", "id.x"]);

        assert!(is_all(tree.resolve("name")));
        assert!(is_all(nested(&tree, "id").resolve("x")));
    }

    #[test]
    fn skipping_wildcard_beats_nested_wildcard() {
        let tree = SkipTree::compile(&["us*.id", "*er"]);
        assert!(is_all(tree.resolve("user")));
        assert!(is_all(nested(&tree, "usage").resolve("id")));
    }

    #[test]
    fn last_nested_wildcard_match_applies() {
        let tree = SkipTree::compile(&["u*.id", "*r.name"]);

        let user = nested(&tree, "user");
        assert!(is_all(user.resolve("name")));
        assert!(user.resolve("id").is_none());
    }

    #[test]
    fn empty_segments_are_kept_verbatim() {
        let tree = SkipTree::compile(&[".a"]);
        assert!(is_all(nested(&tree, "").resolve("a")));
    }
}
