//! Scope, category and site aggregation
//!
//! Every grouping partitions its input: each activity lands in exactly one
//! group. Percentages are computed against a non-zero total only; an empty or
//! zero total yields 0.

use chrono::Datelike;
use indexmap::IndexMap;
use ledger_core::{ActivityWithEmission, Category, Scope, SiteId};
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// Grouping key for sites; activities without a site share one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SiteKey {
    Site(SiteId),
    Unassigned,
}

impl From<Option<SiteId>> for SiteKey {
    fn from(site: Option<SiteId>) -> Self {
        site.map_or(SiteKey::Unassigned, SiteKey::Site)
    }
}

/// Calendar month bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Activities sharing one key
#[derive(Debug, Clone)]
pub struct Group<'a, K> {
    pub key: K,
    pub activities: Vec<&'a ActivityWithEmission>,
}

impl<K> Group<'_, K> {
    /// Sum of `co2e_kg` over the group
    #[must_use]
    pub fn total_co2e_kg(&self) -> f64 {
        self.activities.iter().map(|a| a.co2e_kg).sum()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// One chart row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow<K> {
    pub key: K,
    pub label: String,
    pub count: usize,
    pub total_co2e_kg: f64,
    /// Share of the reference total, 0..=100
    pub percentage: f64,
}

/// Headline figures for a dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionsSummary {
    pub activity_count: usize,
    pub total_co2e_kg: f64,
    pub scope1_co2e_kg: f64,
    pub scope2_co2e_kg: f64,
    pub scope3_co2e_kg: f64,
    /// Largest category by emissions, if any activity exists
    pub top_category: Option<Category>,
}

impl EmissionsSummary {
    /// Total in tonnes CO2e
    #[inline]
    #[must_use]
    pub fn total_tonnes(&self) -> f64 {
        self.total_co2e_kg / 1_000.0
    }

    /// Emissions for one scope
    #[must_use]
    pub fn scope_total(&self, scope: Scope) -> f64 {
        match scope {
            Scope::Scope1 => self.scope1_co2e_kg,
            Scope::Scope2 => self.scope2_co2e_kg,
            Scope::Scope3 => self.scope3_co2e_kg,
        }
    }
}

/// Share of `part` in `total` as a percentage; 0 when `total` is not positive
#[inline]
#[must_use]
pub fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 && total.is_finite() && part.is_finite() {
        part * 100.0 / total
    } else {
        0.0
    }
}

/// Group by an arbitrary key, preserving first-seen key order
pub fn group_by<'a, K, F>(activities: &'a [ActivityWithEmission], mut key_fn: F) -> Vec<Group<'a, K>>
where
    K: Eq + Hash,
    F: FnMut(&ActivityWithEmission) -> K,
{
    let mut groups: IndexMap<K, Vec<&'a ActivityWithEmission>> = IndexMap::new();
    for activity in activities {
        groups.entry(key_fn(activity)).or_default().push(activity);
    }
    groups
        .into_iter()
        .map(|(key, activities)| Group { key, activities })
        .collect()
}

/// Group by scope, in scope order
#[must_use]
pub fn group_by_scope(activities: &[ActivityWithEmission]) -> Vec<Group<'_, Scope>> {
    let mut groups = group_by(activities, |a| a.scope);
    groups.sort_by_key(|g| g.key);
    groups
}

/// Group by category code
#[must_use]
pub fn group_by_category(activities: &[ActivityWithEmission]) -> Vec<Group<'_, Category>> {
    group_by(activities, |a| a.category_code.clone())
}

/// Group by site, unassigned activities in their own group
#[must_use]
pub fn group_by_site(activities: &[ActivityWithEmission]) -> Vec<Group<'_, SiteKey>> {
    group_by(activities, |a| SiteKey::from(a.site_id))
}

/// Group by activity month, oldest first
#[must_use]
pub fn group_by_month(activities: &[ActivityWithEmission]) -> Vec<Group<'_, MonthKey>> {
    let mut groups = group_by(activities, |a| MonthKey {
        year: a.activity_date.year(),
        month: a.activity_date.month(),
    });
    groups.sort_by_key(|g| g.key);
    groups
}

fn rows<K, L>(groups: Vec<Group<'_, K>>, reference_total: f64, mut label: L) -> Vec<BreakdownRow<K>>
where
    L: FnMut(&Group<'_, K>) -> String,
{
    let mut rows: Vec<BreakdownRow<K>> = groups
        .into_iter()
        .map(|group| {
            let total = group.total_co2e_kg();
            BreakdownRow {
                label: label(&group),
                count: group.len(),
                total_co2e_kg: total,
                percentage: percentage(total, reference_total),
                key: group.key,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_co2e_kg.total_cmp(&a.total_co2e_kg));
    rows
}

fn grand_total(activities: &[ActivityWithEmission]) -> f64 {
    activities.iter().map(|a| a.co2e_kg).sum()
}

/// Per-scope rows for all three scopes, zero rows included, in scope order
#[must_use]
pub fn scope_breakdown(activities: &[ActivityWithEmission]) -> Vec<BreakdownRow<Scope>> {
    let total = grand_total(activities);
    let grouped = group_by_scope(activities);
    Scope::ALL
        .into_iter()
        .map(|scope| {
            let group = grouped.iter().find(|g| g.key == scope);
            let scope_total = group.map_or(0.0, Group::total_co2e_kg);
            BreakdownRow {
                key: scope,
                label: scope.label().to_string(),
                count: group.map_or(0, Group::len),
                total_co2e_kg: scope_total,
                percentage: percentage(scope_total, total),
            }
        })
        .collect()
}

/// Category rows, largest first
///
/// With `Some(scope)` only that scope's activities are considered and the
/// percentages are relative to the scope total (drill-down view). With
/// `None` they are relative to the grand total.
#[must_use]
pub fn category_breakdown(
    activities: &[ActivityWithEmission],
    scope: Option<Scope>,
) -> Vec<BreakdownRow<Category>> {
    let selected: Vec<ActivityWithEmission> = match scope {
        Some(scope) => activities.iter().filter(|a| a.scope == scope).cloned().collect(),
        None => activities.to_vec(),
    };
    let total = grand_total(&selected);
    rows(group_by_category(&selected), total, |g| {
        g.key.display_name().into_owned()
    })
}

/// Site rows, largest first
#[must_use]
pub fn site_breakdown(activities: &[ActivityWithEmission]) -> Vec<BreakdownRow<SiteKey>> {
    let total = grand_total(activities);
    rows(group_by_site(activities), total, |g| match g.key {
        SiteKey::Unassigned => "Unassigned".to_string(),
        SiteKey::Site(id) => g
            .activities
            .iter()
            .find_map(|a| a.site_name.clone())
            .unwrap_or_else(|| id.to_string()),
    })
}

/// Monthly totals, oldest first
#[must_use]
pub fn monthly_trend(activities: &[ActivityWithEmission]) -> Vec<BreakdownRow<MonthKey>> {
    let total = grand_total(activities);
    group_by_month(activities)
        .into_iter()
        .map(|group| {
            let month_total = group.total_co2e_kg();
            BreakdownRow {
                label: group.key.to_string(),
                count: group.len(),
                total_co2e_kg: month_total,
                percentage: percentage(month_total, total),
                key: group.key,
            }
        })
        .collect()
}

/// Headline totals
#[must_use]
pub fn summary(activities: &[ActivityWithEmission]) -> EmissionsSummary {
    let scopes = scope_breakdown(activities);
    let scope_total = |scope: Scope| {
        scopes
            .iter()
            .find(|r| r.key == scope)
            .map_or(0.0, |r| r.total_co2e_kg)
    };
    let top_category = category_breakdown(activities, None)
        .into_iter()
        .next()
        .map(|row| row.key);

    EmissionsSummary {
        activity_count: activities.len(),
        total_co2e_kg: grand_total(activities),
        scope1_co2e_kg: scope_total(Scope::Scope1),
        scope2_co2e_kg: scope_total(Scope::Scope2),
        scope3_co2e_kg: scope_total(Scope::Scope3),
        top_category,
    }
}
