//! CSV export of activity tables
//!
//! Every field is wrapped in double quotes and embedded quotes are doubled.
//! Rows are joined with `\n`.

use ledger_core::ActivityWithEmission;

/// Column headers, in output order
pub const CSV_HEADERS: [&str; 11] = [
    "Date",
    "Scope",
    "Category",
    "Category Name",
    "Site",
    "Activity",
    "Description",
    "Quantity",
    "Unit",
    "CO2e (kg)",
    "Factor Source",
];

/// Quote one CSV field
#[must_use]
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn join_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render activities as CSV, header first
#[must_use]
pub fn to_csv(activities: &[ActivityWithEmission]) -> String {
    let mut lines = Vec::with_capacity(activities.len() + 1);
    lines.push(join_row(CSV_HEADERS));
    for a in activities {
        lines.push(join_row([
            a.activity_date.format("%Y-%m-%d").to_string(),
            a.scope.value().to_string(),
            a.category_code.code().to_string(),
            a.category_code.display_name().into_owned(),
            a.site_name.clone().unwrap_or_default(),
            a.activity_key.clone(),
            a.description.clone(),
            a.quantity.to_string(),
            a.unit.clone(),
            format!("{:.3}", a.co2e_kg),
            a.factor_source.clone().unwrap_or_default(),
        ]));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledger_core::{ActivityId, Category, Scope};

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote_field(r#"12" pipe"#), r#""12"" pipe""#);
        assert_eq!(quote_field(""), r#""""#);
    }

    #[test]
    fn header_only_for_empty_input() {
        let csv = to_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("\"Date\",\"Scope\""));
    }

    #[test]
    fn row_contains_every_column() {
        let activity = ActivityWithEmission {
            id: ActivityId::new(),
            scope: Scope::Scope3,
            category_code: Category::BusinessTravel,
            site_id: None,
            site_name: Some("London, UK".into()),
            activity_key: "flight_long_haul".into(),
            description: "Conference \"COP\"".into(),
            quantity: 5_400.0,
            unit: "passenger.km".into(),
            activity_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            co2e_kg: 1_025.1234,
            factor_source: Some("DEFRA 2024".into()),
        };
        let csv = to_csv(&[activity]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            r#""2025-11-03","3","3.6","Business travel","London, UK","flight_long_haul","Conference ""COP""","5400","passenger.km","1025.123","DEFRA 2024""#
        );
    }
}
