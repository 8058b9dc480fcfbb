//! Per-category totals and display formatting for a day.

use std::collections::HashMap;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::entry::TaggedEntry;
use crate::types::CategoryId;

/// Label used for tagged entries without a category.
pub const UNCATEGORIZED: &str = "(uncategorized)";

/// Total tagged time for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: TimeDelta,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Id(CategoryId),
    Name(String),
}

/// Sums tagged durations per category, ordered by category name.
///
/// Entries are grouped by category ID when stored, otherwise by name. The
/// result does not depend on the order of `entries`.
pub fn by_category(entries: &[TaggedEntry]) -> Vec<CategoryTotal> {
    let mut groups: HashMap<GroupKey, CategoryTotal> = HashMap::new();
    for entry in entries {
        let (key, label) = match &entry.category {
            Some(category) => (
                category
                    .id
                    .map_or_else(|| GroupKey::Name(category.name.clone()), GroupKey::Id),
                category.name.clone(),
            ),
            None => (GroupKey::Name(UNCATEGORIZED.to_string()), UNCATEGORIZED.to_string()),
        };
        groups
            .entry(key)
            .or_insert_with(|| CategoryTotal {
                category: label,
                duration: TimeDelta::zero(),
            })
            .duration += entry.duration();
    }

    let mut totals: Vec<CategoryTotal> = groups.into_values().collect();
    totals.sort_by(|a, b| {
        a.category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| b.duration.cmp(&a.duration))
    });
    totals
}

/// Formats a timestamp's time of day as `HH:MM:SS`.
pub fn time_str(at: NaiveDateTime) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Formats a duration as "Xh Ym" if >= 1 hour, "Ym" otherwise.
/// Negative durations are shown as 0m.
pub fn duration_str(duration: TimeDelta) -> String {
    let total_minutes = duration.num_minutes();
    if total_minutes < 0 {
        return "0m".to_string();
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn serialize_seconds<S: serde::Serializer>(
    duration: &TimeDelta,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::entry::Category;

    fn entry(category: Option<(i64, &str)>, start_minute: i64, minutes: i64) -> TaggedEntry {
        let base = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let start = base + TimeDelta::minutes(start_minute);
        TaggedEntry {
            id: None,
            start,
            stop: start + TimeDelta::minutes(minutes),
            category: category.map(|(id, name)| Category {
                id: Some(CategoryId::new(id)),
                ..Category::new(name)
            }),
        }
    }

    fn as_pairs(totals: &[CategoryTotal]) -> Vec<(&str, i64)> {
        totals
            .iter()
            .map(|t| (t.category.as_str(), t.duration.num_minutes()))
            .collect()
    }

    #[test]
    fn groups_durations_per_category() {
        let entries = vec![
            entry(Some((1, "Work")), 0, 30),
            entry(Some((1, "Work")), 40, 15),
            entry(Some((2, "Rest")), 60, 10),
        ];

        assert_eq!(as_pairs(&by_category(&entries)), vec![("Rest", 10), ("Work", 45)]);
    }

    #[test]
    fn grouping_ignores_input_order() {
        let mut entries = vec![
            entry(Some((2, "Rest")), 60, 10),
            entry(Some((1, "Work")), 40, 15),
            entry(Some((1, "Work")), 0, 30),
        ];
        let forward = by_category(&entries);
        entries.reverse();
        let backward = by_category(&entries);

        assert_eq!(forward, backward);
        assert_eq!(as_pairs(&forward), vec![("Rest", 10), ("Work", 45)]);
    }

    #[test]
    fn uncategorized_entries_are_grouped_together() {
        let entries = vec![entry(None, 0, 5), entry(None, 10, 5)];
        assert_eq!(as_pairs(&by_category(&entries)), vec![(UNCATEGORIZED, 10)]);
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(by_category(&[]).is_empty());
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(duration_str(TimeDelta::seconds(59)), "0m");
        assert_eq!(duration_str(TimeDelta::minutes(45)), "45m");
        assert_eq!(duration_str(TimeDelta::minutes(60)), "1h 0m");
        assert_eq!(duration_str(TimeDelta::minutes(135)), "2h 15m");
        assert_eq!(duration_str(TimeDelta::minutes(-5)), "0m");
    }

    #[test]
    fn time_formatting() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 5, 9)
            .unwrap();
        assert_eq!(time_str(at), "07:05:09");
    }
}
