use std::collections::HashSet;

use ledger_core::{ActivityId, Scope};
use ledger_dashboard::{
    category_breakdown, group_by_category, group_by_month, group_by_scope, group_by_site,
    monthly_trend, scope_breakdown, site_breakdown, summary, to_csv, Group, SiteKey,
};
use ledger_test_utils::{activity, arb_activities, date, ActivityBuilder};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn assert_partition<K>(groups: &[Group<'_, K>], expected: &HashSet<ActivityId>) {
    let sizes: usize = groups.iter().map(Group::len).sum();
    assert_eq!(sizes, expected.len());

    let mut seen = HashSet::new();
    for group in groups {
        for a in &group.activities {
            assert!(seen.insert(a.id), "activity {} in two groups", a.id);
        }
    }
    assert_eq!(&seen, expected);
}

const EPSILON: f64 = 1e-6;

proptest! {
    #[test]
    fn prop_groupings_partition_input(activities in arb_activities(40)) {
        let ids: HashSet<ActivityId> = activities.iter().map(|a| a.id).collect();
        assert_partition(&group_by_scope(&activities), &ids);
        assert_partition(&group_by_category(&activities), &ids);
        assert_partition(&group_by_site(&activities), &ids);
        assert_partition(&group_by_month(&activities), &ids);
    }

    #[test]
    fn prop_group_keys_match_members(activities in arb_activities(40)) {
        for group in group_by_category(&activities) {
            prop_assert!(group.activities.iter().all(|a| a.category_code == group.key));
        }
        for group in group_by_site(&activities) {
            prop_assert!(group.activities.iter().all(|a| SiteKey::from(a.site_id) == group.key));
        }
    }

    #[test]
    fn prop_percentages_bounded(activities in arb_activities(40)) {
        let scope_sum: f64 = scope_breakdown(&activities).iter().map(|r| r.percentage).sum();
        prop_assert!(scope_sum <= 100.0 + EPSILON);

        for scope in Scope::ALL {
            let rows = category_breakdown(&activities, Some(scope));
            let sum: f64 = rows.iter().map(|r| r.percentage).sum();
            prop_assert!(sum <= 100.0 + EPSILON);
            prop_assert!(rows.iter().all(|r| r.percentage.is_finite() && r.percentage >= 0.0));
        }

        let site_sum: f64 = site_breakdown(&activities).iter().map(|r| r.percentage).sum();
        prop_assert!(site_sum <= 100.0 + EPSILON);
        let month_sum: f64 = monthly_trend(&activities).iter().map(|r| r.percentage).sum();
        prop_assert!(month_sum <= 100.0 + EPSILON);
    }

    #[test]
    fn prop_summary_matches_scope_rows(activities in arb_activities(40)) {
        let s = summary(&activities);
        prop_assert_eq!(s.activity_count, activities.len());
        let by_scope: f64 = Scope::ALL.iter().map(|&scope| s.scope_total(scope)).sum();
        prop_assert!((by_scope - s.total_co2e_kg).abs() <= EPSILON * s.total_co2e_kg.max(1.0));
    }

    #[test]
    fn prop_csv_has_one_line_per_activity(activities in arb_activities(20)) {
        let csv = to_csv(&activities);
        prop_assert_eq!(csv.split('\n').count(), activities.len() + 1);
    }
}

#[test]
fn zero_totals_never_produce_nan() {
    let activities = vec![activity("1.1", 0.0), activity("3.6", 0.0)];
    for row in scope_breakdown(&activities) {
        assert_eq!(row.percentage, 0.0);
    }
    for row in category_breakdown(&[], Some(Scope::Scope2)) {
        assert_eq!(row.percentage, 0.0);
    }
    assert!(category_breakdown(&[], None).is_empty());
}

#[test]
fn drill_down_is_relative_to_scope() {
    let activities = vec![
        activity("3.6", 300.0),
        activity("3.7", 100.0),
        activity("1.1", 600.0),
    ];
    let rows = category_breakdown(&activities, Some(Scope::Scope3));
    let shares: Vec<(String, f64)> = rows
        .iter()
        .map(|r| (r.key.code().to_string(), r.percentage))
        .collect();
    assert_eq!(shares, vec![("3.6".to_string(), 75.0), ("3.7".to_string(), 25.0)]);
}

#[test]
fn sites_and_months_label_rows() {
    let berlin = ledger_core::SiteId::new();
    let activities = vec![
        ActivityBuilder::new("2.1")
            .site(berlin, "Berlin")
            .on(date(2025, 2, 10))
            .co2e(80.0)
            .build(),
        ActivityBuilder::new("1.2")
            .on(date(2025, 1, 5))
            .co2e(20.0)
            .build(),
    ];

    let sites = site_breakdown(&activities);
    assert_eq!(sites[0].label, "Berlin");
    assert_eq!(sites[1].label, "Unassigned");

    let months: Vec<String> = monthly_trend(&activities)
        .into_iter()
        .map(|r| r.label)
        .collect();
    assert_eq!(months, vec!["2025-01".to_string(), "2025-02".to_string()]);
}
