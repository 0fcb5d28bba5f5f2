use std::cmp::Ordering;
use std::fmt;

use crate::table::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        SortConfig {
            key: key.into(),
            direction,
        }
    }

    /// Sort config after the header `key` was activated.
    /// A new column always starts ascending, the current column flips direction.
    pub fn toggle(current: Option<&SortConfig>, key: &str) -> SortConfig {
        let direction = match current {
            Some(c) if c.key == key && c.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        SortConfig::new(key, direction)
    }
}

/// Compare two cell values as strings, by utf-16 code units. Numbers are not
/// treated specially, so "10" sorts before "9". Absent values sort after
/// every present value.
pub fn compare_values(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.encode_utf16().cmp(b.encode_utf16()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of `rows` by `config`. Without a config the order is kept.
pub fn sort_rows<'a>(mut rows: Vec<&'a Record>, config: Option<&SortConfig>) -> Vec<&'a Record> {
    if let Some(config) = config {
        let key = config.key.as_str();
        match config.direction {
            SortDirection::Ascending => {
                rows.sort_by(|a, b| compare_values(a.get(key), b.get(key)))
            }
            SortDirection::Descending => {
                rows.sort_by(|a, b| compare_values(b.get(key), a.get(key)))
            }
        }
    }
    rows
}
