//! Tag-set arithmetic shared by the resource handlers.
//!
//! A deployment carries up to three tag sources: tags propagated from the
//! enclosing stack, tags injected by the platform itself, and tags declared
//! on the resource. Before touching the tagging API the handlers collapse
//! those sources into one effective map, then diff it against the map
//! applied by the previous deployment to decide which tags to add and which
//! to remove.
//!
//! The two diffs are intentionally asymmetric: removals are computed on
//! keys alone, while additions compare whole entries. A tag whose value
//! changed therefore shows up as an addition (the add call overwrites in
//! place) without a matching removal.

use std::collections::HashMap;

/// Mapping from tag key to tag value.
pub type TagMap = HashMap<String, String>;

/// Merge the three tag sources into the effective tag set.
///
/// System tags are laid in first, then stack-level tags, then resource
/// tags; later sources overwrite earlier ones on key collisions. Absent
/// maps are treated as empty, and the result owns fresh allocations.
pub fn consolidate_tags(
    stack_tags: Option<&TagMap>,
    system_tags: Option<&TagMap>,
    resource_tags: Option<&TagMap>,
) -> TagMap {
    let mut consolidated = TagMap::new();
    for source in [system_tags, stack_tags, resource_tags]
        .into_iter()
        .flatten()
    {
        for (key, value) in source {
            consolidated.insert(key.clone(), value.clone());
        }
    }
    consolidated
}

/// Entries of `new_tags` that are not present verbatim in `old_tags`.
///
/// A key whose value changed counts as a creation, an unchanged key/value
/// pair does not.
pub fn tags_to_create(new_tags: &TagMap, old_tags: &TagMap) -> TagMap {
    new_tags
        .iter()
        .filter(|(key, value)| old_tags.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Sub-map of `old_tags` whose keys disappeared from `new_tags`.
///
/// Key-only difference: a key that survives with a different value is not
/// reported here.
pub fn tags_to_delete(new_tags: &TagMap, old_tags: &TagMap) -> TagMap {
    old_tags
        .iter()
        .filter(|(key, _)| !new_tags.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tag_map(entries: &[(&str, &str)]) -> TagMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_consolidate_keeps_every_key() {
        let stack = tag_map(&[("stackkey", "stackvalue")]);
        let system = tag_map(&[("aws:somekey", "somevalue")]);
        let resource = tag_map(&[("foo", "bar")]);

        let consolidated = consolidate_tags(Some(&stack), Some(&system), Some(&resource));

        assert_eq!(
            consolidated,
            tag_map(&[
                ("foo", "bar"),
                ("stackkey", "stackvalue"),
                ("aws:somekey", "somevalue"),
            ])
        );
    }

    #[test]
    fn test_consolidate_absent_inputs_are_empty() {
        assert_eq!(consolidate_tags(None, None, None), TagMap::new());

        let resource = tag_map(&[("only", "one")]);
        assert_eq!(
            consolidate_tags(None, None, Some(&resource)),
            tag_map(&[("only", "one")])
        );
    }

    #[test]
    fn test_consolidate_empty_maps_never_collide() {
        let empty = TagMap::new();
        assert_eq!(
            consolidate_tags(Some(&empty), Some(&empty), Some(&empty)),
            TagMap::new()
        );
    }

    #[test]
    fn test_consolidate_does_not_mutate_inputs() {
        let stack = tag_map(&[("shared", "stack")]);
        let resource = tag_map(&[("shared", "resource")]);

        let _ = consolidate_tags(Some(&stack), None, Some(&resource));

        assert_eq!(stack, tag_map(&[("shared", "stack")]));
        assert_eq!(resource, tag_map(&[("shared", "resource")]));
    }

    #[test]
    fn test_create_is_entry_difference() {
        let new = tag_map(&[("a", "1"), ("b", "2")]);
        let old = tag_map(&[("a", "1"), ("b", "other")]);

        // Unchanged entry skipped, changed value reported.
        assert_eq!(tags_to_create(&new, &old), tag_map(&[("b", "2")]));
    }

    #[test]
    fn test_delete_is_key_difference() {
        let new = tag_map(&[("a", "changed")]);
        let old = tag_map(&[("a", "1"), ("gone", "2")]);

        // "a" survives with a new value, so only "gone" is a removal.
        assert_eq!(tags_to_delete(&new, &old), tag_map(&[("gone", "2")]));
    }

    #[test]
    fn test_diffs_are_idempotent() {
        let tags = tag_map(&[("a", "1"), ("b", "2")]);

        assert_eq!(tags_to_create(&tags, &tags), TagMap::new());
        assert_eq!(tags_to_delete(&tags, &tags), TagMap::new());
    }

    #[test]
    fn test_diffs_against_empty() {
        let tags = tag_map(&[("a", "1")]);
        let empty = TagMap::new();

        assert_eq!(tags_to_create(&tags, &empty), tags);
        assert_eq!(tags_to_delete(&tags, &empty), TagMap::new());
        assert_eq!(tags_to_create(&empty, &tags), TagMap::new());
        assert_eq!(tags_to_delete(&empty, &tags), tags);
    }
}
