//! The change-stream row shape fed into `ConfigCache::sync_*`, standing in
//! for a real write-ahead/database change feed.

use maintenance_types::Id;

/// One row from the change stream for a table keyed by `Id`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRow<T> {
    AddOrUpdate(T),
    Remove(Id),
}

/// Applies a batch of `ChangeRow`s to a keyed map, removals applied after
/// every add/update in the batch — the cache never observes a row added and
/// removed out of order within one sync pass.
pub fn apply_changes<T, K>(
    map: &mut std::collections::HashMap<Id, T>,
    rows: impl IntoIterator<Item = ChangeRow<T>>,
    key_of: K,
) where
    K: Fn(&T) -> Id,
{
    let mut removals = Vec::new();
    for row in rows {
        match row {
            ChangeRow::AddOrUpdate(value) => {
                map.insert(key_of(&value), value);
            }
            ChangeRow::Remove(id) => removals.push(id),
        }
    }
    for id in removals {
        map.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn removals_apply_after_adds_regardless_of_row_order() {
        let mut map: HashMap<Id, (Id, &str)> = HashMap::new();
        let rows = vec![
            ChangeRow::Remove(1),
            ChangeRow::AddOrUpdate((1, "a")),
            ChangeRow::AddOrUpdate((2, "b")),
        ];
        apply_changes(&mut map, rows, |v| v.0);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));
    }
}
