use tracing::trace;

use crate::export::{Download, build_download};
use crate::filter::{FilterState, filter_rows};
use crate::sort::{SortConfig, sort_rows};
use crate::table::{Record, Table};

/// The user controlled inputs of the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub filters: FilterState,
    pub sort: Option<SortConfig>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_filter(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.filters.set(column, value);
    }

    /// Activate the header `key`, see [`SortConfig::toggle`].
    pub fn activate_sort(&mut self, key: &str) -> &SortConfig {
        self.sort.insert(SortConfig::toggle(self.sort.as_ref(), key))
    }

    /// Drop search term and column filters. The sort stays.
    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.filters.clear();
    }
}

/// Filtered and sorted rows of a table, borrowed from it.
pub fn visible_rows<'a>(table: &'a Table, state: &ViewState) -> Vec<&'a Record> {
    let filtered = filter_rows(table.rows(), &state.search, &state.filters);
    let sorted = sort_rows(filtered, state.sort.as_ref());
    trace!("{} of {} rows visible", sorted.len(), table.nrows());
    sorted
}

/// Export of what is currently visible.
pub fn export_view(title: &str, table: &Table, state: &ViewState) -> Download {
    build_download(title, table.headers(), &visible_rows(table, state))
}

/// Render ready snapshot of a view: display strings per visible row and counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: usize,
    pub filtered: usize,
    pub sort: Option<SortConfig>,
}

impl RenderedView {
    pub fn build(table: &Table, state: &ViewState) -> Self {
        let visible = visible_rows(table, state);
        let rows: Vec<Vec<String>> = visible
            .iter()
            .map(|r| {
                table
                    .headers()
                    .iter()
                    .map(|h| r.get(h).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();
        RenderedView {
            headers: table.headers().to_vec(),
            filtered: rows.len(),
            rows,
            total: table.nrows(),
            sort: state.sort.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// e.g. "3 of 10 rows"
    pub fn row_count_label(&self) -> String {
        format!("{} of {} rows", self.filtered, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;

    fn sample() -> Table {
        Table::from_values(&["Name", "Age"], &[vec!["Bob", "30"], vec!["Ann", "25"]])
    }

    #[test]
    fn activate_sort_toggles() {
        let mut state = ViewState::new();
        assert_eq!(state.activate_sort("Age").direction, SortDirection::Ascending);
        assert_eq!(state.activate_sort("Age").direction, SortDirection::Descending);
        assert_eq!(state.activate_sort("Name").direction, SortDirection::Ascending);
    }

    #[test]
    fn clearing_filters_keeps_sort() {
        let mut state = ViewState::new();
        state.activate_sort("Name");
        state.set_search("x");
        state.set_filter("Age", "3");
        state.clear_filters();
        assert!(state.search.is_empty());
        assert!(!state.filters.is_active());
        assert_eq!(state.sort, Some(SortConfig::new("Name", SortDirection::Ascending)));
    }

    #[test]
    fn rendered_view_counts_and_values() {
        let table = Table::parse("Name,Age\nBob,30\nAnn");
        let mut state = ViewState::new();
        state.activate_sort("Name");
        let view = RenderedView::build(&table, &state);
        assert_eq!(view.rows, vec![vec!["Ann", ""], vec!["Bob", "30"]]);
        assert_eq!(view.row_count_label(), "2 of 2 rows");

        state.set_filter("Name", "zz");
        let view = RenderedView::build(&table, &state);
        assert!(view.is_empty());
        assert_eq!(view.row_count_label(), "0 of 2 rows");
    }

    #[test]
    fn export_view_uses_filtered_sorted_rows() {
        let table = sample();
        let mut state = ViewState::new();
        state.activate_sort("Age");
        state.activate_sort("Age");
        let download = export_view("People", &table, &state);
        assert_eq!(download.as_text(), "Name,Age\n\"Bob\",\"30\"\n\"Ann\",\"25\"\n");
    }
}
