use indexmap::IndexMap;

use crate::export::ABSENT_VALUE;
use crate::table::Record;

/// Per column substring filters. Empty entries are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    filters: IndexMap<String, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter of `column`. Setting an empty value keeps the entry but
    /// makes it a no-op, the same as an emptied input field.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.filters.get(column).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Iterate the entries that constrain rows.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_active(&self) -> bool {
        self.active().next().is_some()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterState
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = FilterState::new();
        for (k, v) in iter {
            state.set(k, v);
        }
        state
    }
}

// Absent values are matched as the text they export as.
fn contains_ignore_case(value: Option<&str>, needle_lower: &str) -> bool {
    value
        .unwrap_or(ABSENT_VALUE)
        .to_lowercase()
        .contains(needle_lower)
}

/// True if any value of `record` contains `term`, ignoring case.
pub fn matches_search(record: &Record, term: &str) -> bool {
    let term = term.to_lowercase();
    record.values().any(|v| contains_ignore_case(v, &term))
}

/// True if `record` satisfies every active entry of `filters`.
pub fn matches_filters(record: &Record, filters: &FilterState) -> bool {
    filters
        .active()
        .all(|(column, value)| contains_ignore_case(record.get(column), &value.to_lowercase()))
}

/// Visible subset of `rows`. A non-empty `search` overrides `filters` entirely.
pub fn filter_rows<'a>(rows: &'a [Record], search: &str, filters: &FilterState) -> Vec<&'a Record> {
    if !search.is_empty() {
        return rows.iter().filter(|r| matches_search(r, search)).collect();
    }
    rows.iter().filter(|r| matches_filters(r, filters)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn people() -> Table {
        Table::parse(
            "Name,City,Role\n\
             Bob,Berlin,Engineer\n\
             Ann,Boston,Manager\n\
             Carl,Berlin,Manager\n\
             Dora,Paris",
        )
    }

    fn names(rows: &[&Record]) -> Vec<String> {
        rows.iter()
            .map(|r| r.get("Name").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn no_search_and_no_filters_keeps_everything() {
        let table = people();
        let rows = filter_rows(table.rows(), "", &FilterState::new());
        assert_eq!(names(&rows), vec!["Bob", "Ann", "Carl", "Dora"]);
    }

    #[test]
    fn filters_are_a_conjunction() {
        let table = people();
        let filters: FilterState = [("City", "berlin"), ("Role", "MAN")].into_iter().collect();
        // Bob matches the city only and must be excluded.
        assert_eq!(names(&filter_rows(table.rows(), "", &filters)), vec!["Carl"]);
    }

    #[test]
    fn empty_filter_entries_are_ignored() {
        let table = people();
        let filters: FilterState = [("City", ""), ("Name", "o")].into_iter().collect();
        assert_eq!(
            names(&filter_rows(table.rows(), "", &filters)),
            vec!["Bob", "Dora"]
        );
        assert!(filters.is_active());
        let idle: FilterState = [("City", "")].into_iter().collect();
        assert!(!idle.is_active());
    }

    #[test]
    fn search_overrides_filters() {
        let table = people();
        let filters: FilterState = [("Name", "bob")].into_iter().collect();
        let rows = filter_rows(table.rows(), "boston", &filters);
        assert_eq!(names(&rows), vec!["Ann"]);
    }

    #[test]
    fn search_looks_at_every_column() {
        let table = people();
        let rows = filter_rows(table.rows(), "ENGINEER", &FilterState::new());
        assert_eq!(names(&rows), vec!["Bob"]);
        let rows = filter_rows(table.rows(), "a", &FilterState::new());
        assert_eq!(names(&rows), vec!["Ann", "Carl", "Dora"]);
    }

    #[test]
    fn absent_values_match_as_undefined() {
        let table = people();
        let filters: FilterState = [("Role", "a")].into_iter().collect();
        assert_eq!(
            names(&filter_rows(table.rows(), "", &filters)),
            vec!["Ann", "Carl"]
        );
        let filters: FilterState = [("Role", "UNDEF")].into_iter().collect();
        assert_eq!(names(&filter_rows(table.rows(), "", &filters)), vec!["Dora"]);
        assert_eq!(
            names(&filter_rows(table.rows(), "undefined", &FilterState::new())),
            vec!["Dora"]
        );
    }

    #[test]
    fn absent_cells_filter_like_they_export() {
        let table = Table::parse("Name,Owner\nSales,\nNotes");
        let filters: FilterState = [("Owner", "undef")].into_iter().collect();
        let rows = filter_rows(table.rows(), "", &filters);
        assert_eq!(names(&rows), vec!["Notes"]);
        assert_eq!(
            crate::export::encode_csv(table.headers(), &rows),
            "Name,Owner\n\"Notes\",undefined\n"
        );
    }

    #[test]
    fn unknown_columns_compare_against_undefined() {
        let table = people();
        let unknown: FilterState = [("Salary", "1")].into_iter().collect();
        assert!(filter_rows(table.rows(), "", &unknown).is_empty());
        let unknown: FilterState = [("Salary", "fin")].into_iter().collect();
        assert_eq!(filter_rows(table.rows(), "", &unknown).len(), 4);
    }

    #[test]
    fn record_predicates_agree_with_filter_rows() {
        let table = people();
        let carl = &table.rows()[2];
        let filters: FilterState = [("City", "ber"), ("Role", "man")].into_iter().collect();
        assert!(matches_filters(carl, &filters));
        assert!(matches_search(carl, "CAR"));
        assert!(!matches_search(carl, "paris"));
    }

    #[test]
    fn set_replaces_existing_entry() {
        let mut filters = FilterState::new();
        filters.set("Name", "b");
        filters.set("Name", "c");
        assert_eq!(filters.get("Name"), Some("c"));
        filters.clear();
        assert_eq!(filters.get("Name"), None);
    }
}
