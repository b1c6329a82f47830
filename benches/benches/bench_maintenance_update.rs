use criterion::{black_box, criterion_group, criterion_main, Criterion};
use maintenance_cache::{ChangeRow, ConfigCache};
use maintenance_types::{
    Host, HostKind, Id, Maintenance, MaintenanceKind, MaintenancePeriod, MaintenanceStatus, NestedGroups,
    PeriodType, TagEvalType,
};
use std::collections::HashSet;

struct NoNesting;
impl NestedGroups for NoNesting {
    fn nested_group_ids(&self, _group_id: Id) -> HashSet<Id> {
        HashSet::new()
    }
}

fn build_cache(num_hosts: u64, num_maintenances: u64) -> ConfigCache {
    let cache = ConfigCache::new(4);
    for m in 0..num_maintenances {
        let host_ids: Vec<Id> = (0..num_hosts).filter(|h| h % num_maintenances == m).collect();
        cache.sync_maintenances([ChangeRow::AddOrUpdate(Maintenance {
            maintenance_id: m,
            name: format!("m{m}"),
            maintenance_type: MaintenanceKind::Normal,
            tags_evaltype: TagEvalType::AndOr,
            active_since: 0,
            active_until: 1_000_000,
            group_ids: vec![],
            host_ids,
            tag_ids: vec![],
            period_ids: vec![m],
            running_since: None,
            running_until: None,
        })]);
        cache.sync_maintenance_periods([ChangeRow::AddOrUpdate(MaintenancePeriod {
            time_period_id: m,
            maintenance_id: m,
            period_type: PeriodType::OneTime,
            every: 0,
            month: 0,
            dayofweek: 0,
            day: 0,
            start_time: 0,
            period: 1_000_000,
            start_date: 0,
        })]);
    }
    for h in 0..num_hosts {
        cache.sync_hosts([ChangeRow::AddOrUpdate(Host {
            host_id: h,
            kind: HostKind::Regular,
            maintenance_status: MaintenanceStatus::Off,
            maintenance_id: None,
            maintenance_type: MaintenanceKind::Normal,
            maintenance_from: 0,
        })]);
    }
    cache
}

fn bench_update(c: &mut Criterion) {
    let cache = build_cache(1_000, 20);
    c.bench_function("update_maintenances_1000_hosts", |b| {
        b.iter(|| black_box(&cache).update_maintenances(100, &NoNesting));
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
