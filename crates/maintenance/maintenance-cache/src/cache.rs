//! `ConfigCache`: the RwLock-guarded in-memory mirror of the maintenance
//! configuration tables, kept current by the `sync_*` entry points and
//! evaluated against the clock by [`ConfigCache::update_maintenances`].
//!
//! Every entry point takes `&self` and locks internally rather than
//! exposing the lock to callers — there is deliberately no global instance
//! anywhere in this crate; an application wires one up as an `Arc<ConfigCache>`
//! and passes it to whichever threads need it.

use crate::matcher;
use crate::sync::{apply_changes, ChangeRow};
use crate::timer::TimerFlags;
use maintenance_types::{
    EventMaintenance, EventSuppressQuery, Function, Host, HostGroup, HostMaintenanceDiff, Id, Item,
    Maintenance, MaintenancePeriod, MaintenanceStatus, MaintenanceTag, NestedGroups,
};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct ConfigCacheInner {
    maintenances: HashMap<Id, Maintenance>,
    tags: HashMap<Id, MaintenanceTag>,
    periods: HashMap<Id, MaintenancePeriod>,
    hosts: HashMap<Id, Host>,
    groups: HashMap<Id, HostGroup>,
    functions: HashMap<Id, Function>,
    items: HashMap<Id, Item>,
    /// Set by any sync that touches maintenance config; consumed (and
    /// cleared) by the next `update_maintenances()` pass, which reports
    /// "changed" even if that pass's own period scan moves no host.
    maintenance_update: bool,
}

pub struct ConfigCache {
    inner: RwLock<ConfigCacheInner>,
    timer_flags: TimerFlags,
}

impl ConfigCache {
    pub fn new(num_timers: usize) -> Self {
        ConfigCache { inner: RwLock::new(ConfigCacheInner::default()), timer_flags: TimerFlags::new(num_timers) }
    }

    pub fn timer_flags(&self) -> &TimerFlags {
        &self.timer_flags
    }

    pub fn sync_maintenances(&self, rows: impl IntoIterator<Item = ChangeRow<Maintenance>>) {
        debug!("In sync_maintenances()");
        let rows: Vec<_> = rows.into_iter().collect();
        let mut inner = self.inner.write().unwrap();
        if !rows.is_empty() {
            inner.maintenance_update = true;
        }
        apply_changes(&mut inner.maintenances, rows, |m| m.maintenance_id);
        for maintenance in inner.maintenances.values_mut() {
            maintenance.host_ids.sort_unstable();
        }
        debug!("End of sync_maintenances()");
    }

    pub fn sync_maintenance_tags(&self, rows: impl IntoIterator<Item = ChangeRow<MaintenanceTag>>) {
        debug!("In sync_maintenance_tags()");
        let rows: Vec<_> = rows.into_iter().collect();
        let mut inner = self.inner.write().unwrap();
        if !rows.is_empty() {
            inner.maintenance_update = true;
        }
        apply_changes(&mut inner.tags, rows, |t| t.maintenance_tag_id);
        debug!("End of sync_maintenance_tags()");
    }

    pub fn sync_maintenance_periods(&self, rows: impl IntoIterator<Item = ChangeRow<MaintenancePeriod>>) {
        debug!("In sync_maintenance_periods()");
        let rows: Vec<_> = rows.into_iter().collect();
        let mut inner = self.inner.write().unwrap();
        if !rows.is_empty() {
            inner.maintenance_update = true;
        }
        apply_changes(&mut inner.periods, rows, |p| p.time_period_id);
        debug!("End of sync_maintenance_periods()");
    }

    pub fn sync_hosts(&self, rows: impl IntoIterator<Item = ChangeRow<Host>>) {
        debug!("In sync_hosts()");
        let mut inner = self.inner.write().unwrap();
        apply_changes(&mut inner.hosts, rows, |h| h.host_id);
        debug!("End of sync_hosts()");
    }

    pub fn sync_host_groups(&self, rows: impl IntoIterator<Item = ChangeRow<HostGroup>>) {
        debug!("In sync_host_groups()");
        let mut inner = self.inner.write().unwrap();
        apply_changes(&mut inner.groups, rows, |g| g.group_id);
        // membership changed; cached nested sets are stale until the next
        // update_maintenances() pass recomputes them.
        for group in inner.groups.values_mut() {
            group.nested_host_ids = None;
        }
        debug!("End of sync_host_groups()");
    }

    pub fn sync_functions(&self, rows: impl IntoIterator<Item = ChangeRow<Function>>) {
        let mut inner = self.inner.write().unwrap();
        apply_changes(&mut inner.functions, rows, |f| f.function_id);
    }

    pub fn sync_items(&self, rows: impl IntoIterator<Item = ChangeRow<Item>>) {
        let mut inner = self.inner.write().unwrap();
        apply_changes(&mut inner.items, rows, |i| i.item_id);
    }

    /// Recomputes every host's maintenance state against `now`: precaches
    /// nested group membership, re-evaluates each maintenance's `Running`
    /// state (§4.6/§4.7: the period with the latest `until` among those
    /// covering `now`, if any), selects the covering maintenance for every
    /// regular (non-proxy) host, diffs it against the cached state, applies
    /// the diffs, and — if anything actually changed, including a
    /// config-only sync that moved no host — flags every timer process for
    /// a recheck via [`TimerFlags::set_all`].
    ///
    /// Returns the host diffs that were applied, in case a caller also
    /// needs to push them out to another subsystem (e.g. trigger
    /// re-evaluation).
    pub fn update_maintenances(&self, now: i64, nested: &dyn NestedGroups) -> Vec<HostMaintenanceDiff> {
        debug!("In update_maintenances()");
        let mut inner = self.inner.write().unwrap();

        let group_ids: Vec<Id> = inner.groups.keys().copied().collect();
        for group_id in group_ids {
            let needs_recompute = inner.groups.get(&group_id).is_some_and(|g| g.nested_host_ids.is_none());
            if needs_recompute {
                let resolved = nested.nested_group_ids(group_id);
                if let Some(group) = inner.groups.get_mut(&group_id) {
                    group.nested_host_ids = Some(resolved);
                }
            }
        }

        // Consuming the latch: any maintenance-config sync since the last
        // pass counts as "changed" even if this pass's period scan below
        // doesn't move a single host.
        let mut state_changed = std::mem::take(&mut inner.maintenance_update);

        let maintenance_ids: Vec<Id> = inner.maintenances.keys().copied().collect();
        for maintenance_id in maintenance_ids {
            let maintenance = &inner.maintenances[&maintenance_id];
            let latest = if now >= maintenance.active_since && now < maintenance.active_until {
                maintenance
                    .period_ids
                    .iter()
                    .filter_map(|period_id| inner.periods.get(period_id))
                    .filter_map(|period| crate::calendar::current_interval(maintenance.active_since, period, now))
                    .max_by_key(|(_, until)| *until)
            } else {
                None
            };

            let maintenance = inner.maintenances.get_mut(&maintenance_id).expect("id from the same map");
            match (maintenance.running_since, latest) {
                (None, Some((since, until))) => {
                    maintenance.running_since = Some(since);
                    maintenance.running_until = Some(until);
                    state_changed = true;
                }
                (Some(_), Some((since, until))) if maintenance.running_until != Some(until) => {
                    maintenance.running_since = Some(since);
                    maintenance.running_until = Some(until);
                    state_changed = true;
                }
                (Some(_), None) => {
                    maintenance.running_since = None;
                    maintenance.running_until = None;
                    state_changed = true;
                }
                _ => {}
            }
        }

        // Sorted by id so "first match wins" in `select_active_maintenance`
        // is deterministic rather than following HashMap iteration order.
        let mut maintenances: Vec<Maintenance> = inner.maintenances.values().cloned().collect();
        maintenances.sort_unstable_by_key(|m| m.maintenance_id);
        let mut diffs = Vec::new();

        let host_ids: Vec<Id> = inner
            .hosts
            .iter()
            .filter(|(_, h)| h.kind == maintenance_types::HostKind::Regular)
            .map(|(id, _)| *id)
            .collect();

        for host_id in host_ids {
            let selected = matcher::select_active_maintenance(host_id, maintenances.iter(), &inner.groups);
            let host = inner.hosts.get(&host_id).expect("host_id came from inner.hosts");
            let diff = matcher::host_maintenance_diff(host, selected);
            if diff.flags != maintenance_types::HostMaintenanceUpdateFlags::NONE {
                diffs.push(diff);
            }
        }

        for diff in &diffs {
            if let Some(host) = inner.hosts.get_mut(&diff.host_id) {
                host.maintenance_status = diff.maintenance_status;
                host.maintenance_id = diff.maintenance_id;
                host.maintenance_type = diff.maintenance_type;
                host.maintenance_from = diff.maintenance_from;
            }
        }

        if !diffs.is_empty() || state_changed {
            self.timer_flags.set_all();
        }

        debug!(updated = diffs.len(), changed = state_changed, "End of update_maintenances()");
        diffs
    }

    /// Computes the pending diffs without applying them, against whichever
    /// running state the last [`ConfigCache::update_maintenances`] pass
    /// left behind — lets a caller inspect what would change before
    /// committing via [`ConfigCache::flush_host_maintenance_updates`].
    pub fn get_host_maintenance_updates(&self) -> Vec<HostMaintenanceDiff> {
        let inner = self.inner.read().unwrap();
        let mut maintenances: Vec<&Maintenance> = inner.maintenances.values().collect();
        maintenances.sort_unstable_by_key(|m| m.maintenance_id);
        inner
            .hosts
            .values()
            .filter(|h| h.kind == maintenance_types::HostKind::Regular)
            .filter_map(|host| {
                let selected =
                    matcher::select_active_maintenance(host.host_id, maintenances.iter().copied(), &inner.groups);
                let diff = matcher::host_maintenance_diff(host, selected);
                (diff.flags != maintenance_types::HostMaintenanceUpdateFlags::NONE).then_some(diff)
            })
            .collect()
    }

    /// Applies previously computed diffs, e.g. from
    /// [`ConfigCache::get_host_maintenance_updates`].
    pub fn flush_host_maintenance_updates(&self, diffs: &[HostMaintenanceDiff]) {
        let mut inner = self.inner.write().unwrap();
        for diff in diffs {
            if let Some(host) = inner.hosts.get_mut(&diff.host_id) {
                host.maintenance_status = diff.maintenance_status;
                host.maintenance_id = diff.maintenance_id;
                host.maintenance_type = diff.maintenance_type;
                host.maintenance_from = diff.maintenance_from;
            }
        }
        if !diffs.is_empty() {
            self.timer_flags.set_all();
        }
    }

    /// Every maintenance window currently suppressing `query.event_id`,
    /// found by resolving its triggering functions down to hosts and
    /// keeping the `Running` maintenances (per the last
    /// [`ConfigCache::update_maintenances`] pass) that cover one of those
    /// hosts and whose tag filter accepts the event's tags.
    pub fn get_event_maintenances(&self, query: &EventSuppressQuery) -> Vec<EventMaintenance> {
        let inner = self.inner.read().unwrap();
        let host_ids = matcher::event_host_ids(&query.function_ids, &inner.functions, &inner.items);
        if host_ids.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut maintenances: Vec<&Maintenance> = inner.maintenances.values().collect();
        maintenances.sort_unstable_by_key(|m| m.maintenance_id);
        for maintenance in maintenances {
            let Some(running_until) = maintenance.running_until else { continue };
            if seen.contains(&maintenance.maintenance_id) {
                continue;
            }
            let covers_any_host = host_ids
                .iter()
                .any(|&host_id| matcher::maintenance_covers_host(maintenance, host_id, &inner.groups));
            if !covers_any_host {
                continue;
            }
            let tags: Vec<MaintenanceTag> = maintenance
                .tag_ids
                .iter()
                .filter_map(|tag_id| inner.tags.get(tag_id))
                .cloned()
                .collect();
            if !crate::tags::matches(maintenance.tags_evaltype, &tags, &query.tags) {
                continue;
            }
            seen.insert(maintenance.maintenance_id);
            result.push(EventMaintenance {
                event_id: query.event_id,
                maintenance_id: maintenance.maintenance_id,
                running_until,
            });
        }
        result
    }

    /// Ids of every `Running` maintenance, per the last
    /// [`ConfigCache::update_maintenances`] pass, regardless of whether any
    /// of its hosts also lost to a `NoData` override elsewhere.
    pub fn running_maintenance_ids(&self) -> Vec<Id> {
        let inner = self.inner.read().unwrap();
        let mut ids: Vec<Id> = inner
            .maintenances
            .values()
            .filter(|m| m.running_since.is_some())
            .map(|m| m.maintenance_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
