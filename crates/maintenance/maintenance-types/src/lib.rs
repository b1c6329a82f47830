//! Data model shared by the maintenance cache, calendar evaluator, and
//! host/event matcher: the entities synced in from the change stream plus
//! the small supporting records (`Host`, `HostGroup`, `Function`, `Item`)
//! needed to resolve which hosts and events a maintenance window covers.

use std::collections::HashSet;

pub type Id = u64;

/// Tiny macro standing in for the `bitflags!` crate macro shape without the
/// extra dependency, since only one flag set is needed here.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(const $flag:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name($repr);

        impl $name {
            pub const NONE: $name = $name(0);
            $(pub const $flag: $name = $name($value);)*

            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

/// How the periods attached to a maintenance window are meant to affect
/// monitoring: `Normal` just suppresses problems, `NoData` additionally
/// treats "no data" as expected rather than alerting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceKind {
    Normal,
    NoData,
}

/// Whether a host is currently inside one of its maintenance's active
/// periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceStatus {
    Off,
    On,
}

/// How a maintenance's tags combine: `AndOr` groups same-named tags with OR
/// and distinct names with AND; `Or` combines every tag with OR regardless
/// of name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEvalType {
    AndOr,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOperator {
    Equal,
    Like,
}

/// A single maintenance window: the set of hosts/groups it covers, the
/// tags that further filter which problems it suppresses, and the list of
/// periods (by id) that say *when* it is active.
#[derive(Debug, Clone, PartialEq)]
pub struct Maintenance {
    pub maintenance_id: Id,
    pub name: String,
    pub maintenance_type: MaintenanceKind,
    pub tags_evaltype: TagEvalType,
    pub active_since: i64,
    pub active_until: i64,
    pub group_ids: Vec<Id>,
    pub host_ids: Vec<Id>,
    pub tag_ids: Vec<Id>,
    pub period_ids: Vec<Id>,
    /// Running-period bounds set by the periodic state update: both `Some`
    /// while a period currently covers `now` (`since` and the latest
    /// `until` among the periods that do), both `None` (`Idle`) otherwise,
    /// including before the first evaluation.
    pub running_since: Option<i64>,
    pub running_until: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceTag {
    pub maintenance_tag_id: Id,
    pub maintenance_id: Id,
    pub tag: String,
    pub operator: TagOperator,
    pub value: String,
}

/// A recurrence rule. Only the fields relevant to `period_type` are
/// meaningful; the rest are carried but unused by the calendar evaluator,
/// matching the denormalized single-table layout of the source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    OneTime,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenancePeriod {
    pub time_period_id: Id,
    pub maintenance_id: Id,
    pub period_type: PeriodType,
    /// Recurrence stride: every Nth day/week/month. For `Monthly` with
    /// `dayofweek != 0`, `every == 5` means "the last matching weekday of
    /// the month" rather than a literal 5th occurrence.
    pub every: u32,
    /// Bitmask, bit 0 = January .. bit 11 = December. Only used by
    /// `Monthly`.
    pub month: u16,
    /// Bitmask, bit 0 = Monday .. bit 6 = Sunday. Used by `Weekly` and by
    /// `Monthly` when a specific weekday (rather than day-of-month) is
    /// requested.
    pub dayofweek: u8,
    /// Day of month in `1..=31`, used by `Monthly` when `dayofweek == 0`.
    pub day: u8,
    /// Seconds since local midnight.
    pub start_time: u32,
    /// Duration in seconds the period stays active once triggered.
    pub period: u32,
    /// Required for `OneTime`: absolute epoch seconds of the start of day.
    pub start_date: i64,
}

bitflags_like! {
    /// Which fields of a host's maintenance state actually changed between
    /// two state-machine passes, so the cache only needs to write back the
    /// fields that moved.
    pub struct HostMaintenanceUpdateFlags: u8 {
        const STATUS = 0b0001;
        const MAINTENANCE_ID = 0b0010;
        const MAINTENANCE_TYPE = 0b0100;
        const MAINTENANCE_FROM = 0b1000;
    }
}

/// One row of the diff `update_maintenances()` produces: what a host's
/// maintenance fields should become, and which of them actually differ from
/// the cached value.
#[derive(Debug, Clone, PartialEq)]
pub struct HostMaintenanceDiff {
    pub host_id: Id,
    pub flags: HostMaintenanceUpdateFlags,
    pub maintenance_status: MaintenanceStatus,
    pub maintenance_id: Option<Id>,
    pub maintenance_type: MaintenanceKind,
    pub maintenance_from: i64,
}

/// The minimal slice of a host record the maintenance cache needs: its
/// current cached maintenance state, and whether it is a proxy (proxies are
/// never suppressed directly — suppression applies to the hosts behind
/// them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Regular,
    ProxyActive,
    ProxyPassive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub host_id: Id,
    pub kind: HostKind,
    pub maintenance_status: MaintenanceStatus,
    pub maintenance_id: Option<Id>,
    pub maintenance_type: MaintenanceKind,
    pub maintenance_from: i64,
}

/// Direct (non-nested) host group membership. Nested resolution is
/// delegated to [`crate::NestedGroups`] and cached here once computed.
#[derive(Debug, Clone, PartialEq)]
pub struct HostGroup {
    pub group_id: Id,
    pub host_ids: HashSet<Id>,
    pub nested_host_ids: Option<HashSet<Id>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    pub function_id: Id,
    pub item_id: Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub item_id: Id,
    pub host_id: Id,
}

/// Resolves a host group to every host it transitively contains. Supplied
/// by the host-groups subsystem, which this crate does not implement.
pub trait NestedGroups {
    fn nested_group_ids(&self, group_id: Id) -> HashSet<Id>;
}

/// The inputs needed to find which maintenance windows (if any) suppress a
/// single event: the hosts behind its triggering functions, plus the
/// event's own tags to test against each candidate maintenance's tag
/// filter.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSuppressQuery {
    pub event_id: Id,
    pub function_ids: Vec<Id>,
    pub tags: Vec<(String, String)>,
}

/// One matched suppression: which maintenance window covers this event, and
/// until when its currently-matched period keeps it suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMaintenance {
    pub event_id: Id,
    pub maintenance_id: Id,
    pub running_until: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine_and_check() {
        let mut flags = HostMaintenanceUpdateFlags::NONE;
        flags.insert(HostMaintenanceUpdateFlags::STATUS);
        flags.insert(HostMaintenanceUpdateFlags::MAINTENANCE_ID);
        assert!(flags.contains(HostMaintenanceUpdateFlags::STATUS));
        assert!(flags.contains(HostMaintenanceUpdateFlags::MAINTENANCE_ID));
        assert!(!flags.contains(HostMaintenanceUpdateFlags::MAINTENANCE_TYPE));
    }
}
