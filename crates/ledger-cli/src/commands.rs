//! Output rendering for offline subcommands

use std::fmt::{Display, Write as _};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ledger_core::{
    calculate_spend_emissions, ActivityWithEmission, Category, Currency, ReportingPeriod, Scope,
};
use ledger_dashboard::{
    category_breakdown, monthly_trend, scope_breakdown, site_breakdown, summary, BreakdownRow,
};
use ledger_wizard::{ActivityWizard, WizardEntry};
use serde::Serialize;

/// Dimension for `summary --by`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Scope,
    Category,
    Site,
    Month,
}

impl GroupBy {
    pub fn parse(value: &str) -> Result<Self> {
        Ok(match value {
            "scope" => Self::Scope,
            "category" => Self::Category,
            "site" => Self::Site,
            "month" => Self::Month,
            other => bail!("unknown grouping `{other}`"),
        })
    }
}

pub fn read_activities(path: &Path) -> Result<Vec<ActivityWithEmission>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing activities in {}", path.display()))
}

/// Load a JSON array of entries into a fresh wizard buffer
///
/// Entries go through the same required-field check the wizard applies to
/// drafts, so a file with a blank description or a zero quantity is refused
/// as a whole.
pub fn read_entries(path: &Path) -> Result<ActivityWizard> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let entries: Vec<WizardEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing entries in {}", path.display()))?;
    let mut wizard = ActivityWizard::new();
    wizard
        .restore_entries(entries)
        .with_context(|| format!("importing {}", path.display()))?;
    Ok(wizard)
}

/// Write to `path`, or stdout when `None`
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = contents.len(), "output written");
        }
        None => println!("{contents}"),
    }
    Ok(())
}

/// Currency given on the command line, else the configured default
pub fn spend_currency<'a>(given: Option<&'a String>, default: &'a Currency) -> &'a str {
    given.map_or_else(|| default.code(), String::as_str)
}

pub fn render_spend(amount: f64, currency: &str, ef_per_usd: f64, json: bool) -> Result<String> {
    let estimate = calculate_spend_emissions(amount, currency, ef_per_usd);
    if json {
        return Ok(serde_json::to_string_pretty(&estimate)?);
    }
    Ok(format!(
        "{}\nUSD:  {:.2}\nCO2e: {:.2} kg ({:.3} t)",
        estimate.formula,
        estimate.amount_usd,
        estimate.co2e,
        estimate.co2e / 1_000.0
    ))
}

pub fn render_categories(scope: Option<Scope>) -> String {
    let mut out = String::new();
    for category in Category::KNOWN
        .iter()
        .filter(|c| scope.map_or(true, |s| c.scope() == Some(s)))
    {
        let note = if category.is_specialized() {
            "  [spend-based]"
        } else if category.is_backend_calculated() {
            "  [auto-calculated]"
        } else {
            ""
        };
        let _ = writeln!(out, "{:<5} {}{}", category.code(), category.display_name(), note);
    }
    out
}

fn table<K>(rows: &[BreakdownRow<K>]) -> String {
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0).max(5);
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>6}  {:>14}  {:>7}", "Group", "Count", "kg CO2e", "%");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:>6}  {:>14.2}  {:>6.1}%",
            row.label, row.count, row.total_co2e_kg, row.percentage
        );
    }
    out
}

fn render_rows<K: Serialize>(rows: &[BreakdownRow<K>], json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(rows)?)
    } else {
        Ok(table(rows))
    }
}

pub fn render_breakdown(
    activities: &[ActivityWithEmission],
    by: GroupBy,
    scope: Option<Scope>,
    json: bool,
) -> Result<String> {
    let filtered: Vec<ActivityWithEmission>;
    let activities = match (by, scope) {
        // category drill-down handles the scope itself
        (GroupBy::Category, _) | (_, None) => activities,
        (_, Some(scope)) => {
            filtered = activities.iter().filter(|a| a.scope == scope).cloned().collect();
            &filtered
        }
    };
    match by {
        GroupBy::Scope => render_rows(&scope_breakdown(activities), json),
        GroupBy::Category => render_rows(&category_breakdown(activities, scope), json),
        GroupBy::Site => render_rows(&site_breakdown(activities), json),
        GroupBy::Month => render_rows(&monthly_trend(activities), json),
    }
}

pub fn render_summary(activities: &[ActivityWithEmission]) -> String {
    let s = summary(activities);
    let mut out = String::new();
    let _ = writeln!(out, "Activities: {}", s.activity_count);
    let _ = writeln!(out, "Total:      {:.3} t CO2e", s.total_tonnes());
    for scope in Scope::ALL {
        let _ = writeln!(out, "  {scope}: {:.2} kg", s.scope_total(scope));
    }
    if let Some(top) = s.top_category {
        let _ = writeln!(out, "Largest:    {} {}", top.code(), top.display_name());
    }
    out
}

pub fn render_periods(periods: &[ReportingPeriod]) -> String {
    let mut out = String::new();
    for p in periods {
        let _ = writeln!(
            out,
            "{}  {:<10} {} .. {}  {}",
            p.id,
            p.status.as_str(),
            p.start_date,
            p.end_date,
            p.name
        );
    }
    out
}

pub fn describe<T: Display>(label: &str, value: Option<T>) -> String {
    match value {
        Some(v) => format!("{label}: {v}"),
        None => format!("{label}: -"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_test_utils::{activity, sample_period};
    use pretty_assertions::assert_eq;

    #[test]
    fn spend_text_contains_formula() {
        let out = render_spend(100.0, "EUR", 0.5, false).unwrap();
        assert!(out.starts_with("100.00 EUR × 1.0800 = 108.00 USD"));
        assert!(out.contains("CO2e: 54.00 kg"));
    }

    #[test]
    fn spend_falls_back_to_configured_currency() {
        let config = ledger_core::LedgerConfig::from_toml_str("default_currency = \"eur\"").unwrap();
        assert_eq!(spend_currency(None, &config.default_currency), "EUR");
        let given = "GBP".to_string();
        assert_eq!(spend_currency(Some(&given), &config.default_currency), "GBP");

        let out = render_spend(100.0, spend_currency(None, &config.default_currency), 0.5, false).unwrap();
        assert!(out.starts_with("100.00 EUR × 1.0800"));
    }

    #[test]
    fn spend_json_is_unrounded() {
        let out = render_spend(100.0, "USD", 0.5, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["co2e"], 50.0);
        assert_eq!(value["amount_usd"], 100.0);
    }

    #[test]
    fn categories_filter_by_scope() {
        let out = render_categories(Some(Scope::Scope2));
        assert_eq!(out.lines().count(), 3);
        assert!(out.contains("2.1   Purchased electricity"));

        let all = render_categories(None);
        assert_eq!(all.lines().count(), 22);
        assert!(all.contains("3.1   Purchased goods and services  [spend-based]"));
        assert!(all.contains("[auto-calculated]"));
    }

    #[test]
    fn breakdown_table_has_header_and_rows() {
        let activities = vec![activity("1.1", 750.0), activity("2.1", 250.0)];
        let out = render_breakdown(&activities, GroupBy::Scope, None, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Scope 1"));
        assert!(lines[1].ends_with("75.0%"));
    }

    #[test]
    fn scope_filter_applies_to_site_view() {
        let activities = vec![activity("1.1", 750.0), activity("2.1", 250.0)];
        let out = render_breakdown(&activities, GroupBy::Site, Some(Scope::Scope2), true).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total_co2e_kg"], 250.0);
        assert_eq!(rows[0]["percentage"], 100.0);
    }

    #[test]
    fn summary_lists_every_scope() {
        let out = render_summary(&[activity("3.6", 1_500.0)]);
        assert!(out.contains("Total:      1.500 t CO2e"));
        assert!(out.contains("Scope 1: 0.00 kg"));
        assert!(out.contains("Largest:    3.6 Business travel"));
    }

    #[test]
    fn periods_render_one_line_each() {
        let out = render_periods(&[sample_period(ledger_core::PeriodStatus::Review)]);
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("review"));
        assert!(out.contains("FY2025"));
    }

    #[test]
    fn incomplete_entries_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(
            &path,
            r#"[{"scope":1,"category_code":"1.1","activity_key":"natural_gas","description":"",
                "quantity":10.0,"unit":"kWh","activity_date":"2025-01-01"}]"#,
        )
        .unwrap();
        let err = read_entries(&path).unwrap_err();
        assert!(format!("{err:#}").ends_with("entry 0 is incomplete: missing description"));
    }

    #[test]
    fn complete_entries_load_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(
            &path,
            r#"[{"scope":1,"category_code":"1.1","activity_key":"natural_gas","description":"Boiler",
                 "quantity":10.0,"unit":"kWh","activity_date":"2025-01-01","co2e_factor":0.2},
                {"scope":2,"category_code":"2.1","activity_key":"grid_electricity","description":"HQ",
                 "quantity":5.0,"unit":"kWh","activity_date":"2025-01-02"}]"#,
        )
        .unwrap();
        let wizard = read_entries(&path).unwrap();
        let keys: Vec<_> = wizard.entries().iter().map(|e| e.activity_key.as_str()).collect();
        assert_eq!(keys, vec!["natural_gas", "grid_electricity"]);
        assert!((wizard.total_co2e() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn describe_handles_missing_values() {
        assert_eq!(describe::<&str>("Org", None), "Org: -");
        assert_eq!(describe("Org", Some("Acme")), "Org: Acme");
    }
}
