//! Decides which maintenance window (if any) currently covers a host, and
//! which maintenance windows currently suppress a given event.
//!
//! Both matchers only ever consider maintenances the periodic state update
//! (`ConfigCache::update_maintenances`) has already marked `Running` —
//! deciding whether a period currently covers `now` is that update's job
//! alone, not this module's.
//!
//! A host is covered either by direct membership in a maintenance's host
//! list or, transitively, through one of its host groups. When several
//! running maintenances cover the same host at once, the first one
//! encountered wins — except a later `NoData` maintenance always overrides
//! an already-selected `Normal` one, since "no data" suppression is the
//! stronger guarantee. "First" is determined entirely by the order the
//! caller hands maintenances to [`select_active_maintenance`]; the
//! cache presents them in ascending `maintenance_id` order (sorting
//! before the call, since `HashMap` iteration order is unspecified).

use maintenance_types::{
    Host, HostGroup, HostMaintenanceDiff, HostMaintenanceUpdateFlags, Id, Maintenance,
    MaintenanceKind, MaintenanceStatus,
};
use std::collections::{HashMap, HashSet};

/// Whether `maintenance` covers `host_id`, either directly or through one
/// of its groups' (possibly nested) membership.
pub fn maintenance_covers_host(
    maintenance: &Maintenance,
    host_id: Id,
    groups: &HashMap<Id, HostGroup>,
) -> bool {
    // `host_ids` is kept sorted by the sync layer so direct membership is a
    // binary search rather than a linear scan.
    if maintenance.host_ids.binary_search(&host_id).is_ok() {
        return true;
    }
    maintenance.group_ids.iter().any(|group_id| {
        groups.get(group_id).is_some_and(|group| {
            group
                .nested_host_ids
                .as_ref()
                .map(|set| set.contains(&host_id))
                .unwrap_or_else(|| group.host_ids.contains(&host_id))
        })
    })
}

/// The running maintenance (if any) whose host/group scope covers
/// `host_id`, applying the first-match/`NoData` override rule described on
/// the module. Maintenances not currently `Running` (`running_since ==
/// None`) are skipped regardless of scope.
pub fn select_active_maintenance<'a>(
    host_id: Id,
    maintenances: impl IntoIterator<Item = &'a Maintenance>,
    groups: &HashMap<Id, HostGroup>,
) -> Option<&'a Maintenance> {
    let mut best: Option<&Maintenance> = None;
    for maintenance in maintenances {
        if maintenance.running_since.is_none() {
            continue;
        }
        if !maintenance_covers_host(maintenance, host_id, groups) {
            continue;
        }
        best = match best {
            None => Some(maintenance),
            Some(cur) if cur.maintenance_type == MaintenanceKind::Normal
                && maintenance.maintenance_type == MaintenanceKind::NoData =>
            {
                Some(maintenance)
            }
            Some(cur) => Some(cur),
        };
    }
    best
}

/// Computes the diff between `host`'s cached maintenance state and what it
/// should become given `selected` (the result of
/// [`select_active_maintenance`], or `None` if nothing currently covers it).
/// A selected maintenance's `running_since` becomes `maintenance_from`
/// directly — it only moves when the maintenance's running period itself
/// changes, so re-selecting the same maintenance on a later tick reports no
/// change here even without comparing against the host's previous value.
pub fn host_maintenance_diff(host: &Host, selected: Option<&Maintenance>) -> HostMaintenanceDiff {
    let (new_status, new_id, new_type, new_from) = match selected {
        Some(m) => (
            MaintenanceStatus::On,
            Some(m.maintenance_id),
            m.maintenance_type,
            m.running_since.expect("select_active_maintenance only returns running maintenances"),
        ),
        None => (MaintenanceStatus::Off, None, MaintenanceKind::Normal, 0),
    };

    let mut flags = HostMaintenanceUpdateFlags::NONE;
    if host.maintenance_status != new_status {
        flags.insert(HostMaintenanceUpdateFlags::STATUS);
    }
    if host.maintenance_id != new_id {
        flags.insert(HostMaintenanceUpdateFlags::MAINTENANCE_ID);
    }
    if host.maintenance_type != new_type {
        flags.insert(HostMaintenanceUpdateFlags::MAINTENANCE_TYPE);
    }
    if host.maintenance_from != new_from {
        flags.insert(HostMaintenanceUpdateFlags::MAINTENANCE_FROM);
    }

    HostMaintenanceDiff {
        host_id: host.host_id,
        flags,
        maintenance_status: new_status,
        maintenance_id: new_id,
        maintenance_type: new_type,
        maintenance_from: new_from,
    }
}

/// Resolves an event's triggering functions down to the set of distinct
/// host ids behind them, via `function_id -> item_id -> host_id`.
pub fn event_host_ids(
    function_ids: &[Id],
    functions: &HashMap<Id, maintenance_types::Function>,
    items: &HashMap<Id, maintenance_types::Item>,
) -> HashSet<Id> {
    function_ids
        .iter()
        .filter_map(|fid| functions.get(fid))
        .filter_map(|function| items.get(&function.item_id))
        .map(|item| item.host_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maintenance_types::{HostKind, TagEvalType};

    fn maintenance(id: Id, kind: MaintenanceKind, host_ids: Vec<Id>, running_since: Option<i64>) -> Maintenance {
        Maintenance {
            maintenance_id: id,
            name: format!("m{id}"),
            maintenance_type: kind,
            tags_evaltype: TagEvalType::AndOr,
            active_since: 0,
            active_until: 1_000_000,
            group_ids: vec![],
            host_ids,
            tag_ids: vec![],
            period_ids: vec![id],
            running_since,
            running_until: running_since.map(|_| 1_000_000),
        }
    }

    fn host(id: Id) -> Host {
        Host {
            host_id: id,
            kind: HostKind::Regular,
            maintenance_status: MaintenanceStatus::Off,
            maintenance_id: None,
            maintenance_type: MaintenanceKind::Normal,
            maintenance_from: 0,
        }
    }

    #[test]
    fn first_match_wins_between_two_normals() {
        let m1 = maintenance(1, MaintenanceKind::Normal, vec![5], Some(10));
        let m2 = maintenance(2, MaintenanceKind::Normal, vec![5], Some(20));
        let groups = HashMap::new();
        let selected = select_active_maintenance(5, [&m1, &m2], &groups).unwrap();
        assert_eq!(selected.maintenance_id, 1);
    }

    #[test]
    fn nodata_overrides_a_previously_selected_normal() {
        let m1 = maintenance(1, MaintenanceKind::Normal, vec![5], Some(10));
        let m2 = maintenance(2, MaintenanceKind::NoData, vec![5], Some(20));
        let groups = HashMap::new();
        let selected = select_active_maintenance(5, [&m1, &m2], &groups).unwrap();
        assert_eq!(selected.maintenance_id, 2);
    }

    #[test]
    fn idle_maintenance_is_not_selected() {
        let m = maintenance(1, MaintenanceKind::Normal, vec![5], None);
        let groups = HashMap::new();
        assert!(select_active_maintenance(5, [&m], &groups).is_none());
    }

    #[test]
    fn diff_reports_new_maintenance_entry() {
        let h = host(5);
        let m = maintenance(1, MaintenanceKind::Normal, vec![5], Some(42));
        let diff = host_maintenance_diff(&h, Some(&m));
        assert_eq!(diff.maintenance_status, MaintenanceStatus::On);
        assert_eq!(diff.maintenance_id, Some(1));
        assert_eq!(diff.maintenance_from, 42);
        assert!(diff.flags.contains(HostMaintenanceUpdateFlags::STATUS));
    }

    #[test]
    fn diff_is_empty_when_nothing_changed() {
        let mut h = host(5);
        h.maintenance_status = MaintenanceStatus::On;
        h.maintenance_id = Some(1);
        h.maintenance_from = 42;
        let m = maintenance(1, MaintenanceKind::Normal, vec![5], Some(42));
        let diff = host_maintenance_diff(&h, Some(&m));
        assert_eq!(diff.flags, HostMaintenanceUpdateFlags::NONE);
        assert_eq!(diff.maintenance_from, 42);
    }

    #[test]
    fn group_membership_covers_host_when_not_listed_directly() {
        let mut m = maintenance(1, MaintenanceKind::Normal, vec![], Some(0));
        m.group_ids = vec![10];
        let mut groups = HashMap::new();
        groups.insert(10, HostGroup { group_id: 10, host_ids: [5].into_iter().collect(), nested_host_ids: None });
        assert!(maintenance_covers_host(&m, 5, &groups));
        assert!(!maintenance_covers_host(&m, 6, &groups));
    }
}
