//! Tag matching between a maintenance's configured tag filter and an
//! event's actual tags.
//!
//! Both tag lists are small (a handful of entries at most), so matching is
//! a plain nested scan rather than sorting either side first.

use maintenance_types::{MaintenanceTag, TagEvalType, TagOperator};

fn tag_matches(rule: &MaintenanceTag, event_tag: &str, event_value: &str) -> bool {
    if rule.tag != event_tag {
        return false;
    }
    match rule.operator {
        TagOperator::Equal => rule.value == event_value,
        TagOperator::Like => event_value.contains(&rule.value),
    }
}

/// `Or` semantics: the event matches if *any* configured tag rule matches
/// *any* of the event's tags.
fn matches_or(tags: &[MaintenanceTag], event_tags: &[(String, String)]) -> bool {
    tags.iter()
        .any(|rule| event_tags.iter().any(|(name, value)| tag_matches(rule, name, value)))
}

/// `AndOr` semantics: rules are grouped by tag name; within a group any
/// match suffices (OR), but every group present in the rule set must have
/// at least one match (AND across distinct names).
fn matches_andor(tags: &[MaintenanceTag], event_tags: &[(String, String)]) -> bool {
    let mut names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
    names.sort_unstable();
    names.dedup();

    names.iter().all(|&name| {
        tags.iter()
            .filter(|rule| rule.tag == name)
            .any(|rule| event_tags.iter().any(|(n, v)| tag_matches(rule, n, v)))
    })
}

/// Whether `event_tags` satisfies a maintenance's tag filter. An empty tag
/// filter always matches (no tag filter configured means "suppress
/// regardless of tags").
pub fn matches(eval_type: TagEvalType, tags: &[MaintenanceTag], event_tags: &[(String, String)]) -> bool {
    if tags.is_empty() {
        return true;
    }
    match eval_type {
        TagEvalType::Or => matches_or(tags, event_tags),
        TagEvalType::AndOr => matches_andor(tags, event_tags),
    }
}
