use indexmap::IndexMap;
use tracing::trace;

/// One parsed row. Keys are the table headers in header order, values are
/// `None` when the source line had fewer fields than there are headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Option<String>>,
}

impl Record {
    /// Build a record by zipping `values` against `headers`.
    /// A repeated header keeps the value of its last occurrence.
    pub fn from_values<H, V>(headers: &[H], values: &[V]) -> Self
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields = IndexMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let value = values.get(idx).map(|v| v.as_ref().to_string());
            fields.insert(header.as_ref().to_string(), value);
        }
        Record { fields }
    }

    /// Value of `header`, `None` if the header is unknown or the value is absent.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).and_then(|v| v.as_deref())
    }

    pub fn contains_header(&self, header: &str) -> bool {
        self.fields.contains_key(header)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.fields.values().map(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Build a table from already split values, e.g. mock data supplied by a caller.
    pub fn from_values<H, V>(headers: &[H], rows: &[Vec<V>]) -> Self
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| Record::from_values(&headers, values))
            .collect();
        Table { headers, rows }
    }

    /// Parse `\n` separated lines of `,` separated fields. The first line holds
    /// the headers. Never fails: short lines yield absent values, surplus
    /// fields are ignored.
    ///
    /// A field that is exactly a JSON string literal, as written by the
    /// exporter, is decoded: the raw input field `"x"` is read as `x`.
    pub fn parse(content: &str) -> Self {
        let mut lines = content.trim().split('\n');
        let headers: Vec<String> = lines
            .next()
            .unwrap_or_default()
            .split(',')
            .map(|h| h.trim().to_string())
            .collect();

        let rows: Vec<Record> = lines
            .map(|line| {
                let values: Vec<String> = line.split(',').map(decode_field).collect();
                Record::from_values(&headers, &values)
            })
            .collect();

        trace!("Parsed {} headers and {} rows", headers.len(), rows.len());
        Table { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncolumns(&self) -> usize {
        self.headers.len()
    }
}

// Fields written by the exporter are json string literals. Decode those so an
// exported view reads back to the same values, leave everything else as is.
fn decode_field(raw: &str) -> String {
    let field = raw.trim();
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        if let Ok(decoded) = serde_json::from_str::<String>(field) {
            return decoded;
        }
    }
    field.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_headers_and_values() {
        let table = Table::parse("  Name , Age \n Bob , 30 \nAnn,25\n\n");
        assert_eq!(table.headers(), &["Name", "Age"]);
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.rows()[0].get("Name"), Some("Bob"));
        assert_eq!(table.rows()[0].get("Age"), Some("30"));
        assert_eq!(table.rows()[1].get("Name"), Some("Ann"));
    }

    #[test]
    fn short_rows_yield_absent_values() {
        let table = Table::parse("a,b,c\n1,2");
        let row = &table.rows()[0];
        assert_eq!(row.len(), 3);
        assert!(row.contains_header("c"));
        assert_eq!(row.get("a"), Some("1"));
        assert_eq!(row.get("c"), None);
    }

    #[test]
    fn surplus_fields_are_dropped() {
        let table = Table::parse("a,b\n1,2,3,4");
        let row = &table.rows()[0];
        assert_eq!(row.len(), 2);
        assert_eq!(row.values().collect::<Vec<_>>(), vec![Some("1"), Some("2")]);
    }

    #[test]
    fn carriage_returns_are_trimmed() {
        let table = Table::parse("a,b\r\n1,2\r\n3,4\r\n");
        assert_eq!(table.headers(), &["a", "b"]);
        assert_eq!(table.rows()[1].get("b"), Some("4"));
    }

    #[test]
    fn duplicate_headers_keep_last_value() {
        let table = Table::parse("id,name,id\n1,x,2");
        assert_eq!(table.headers(), &["id", "name", "id"]);
        let row = &table.rows()[0];
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("id"), Some("2"));
    }

    #[test]
    fn header_only_input_has_no_rows() {
        let table = Table::parse("Name,Age\n");
        assert_eq!(table.ncolumns(), 2);
        assert_eq!(table.nrows(), 0);
    }

    #[test]
    fn empty_input_yields_single_empty_header() {
        let table = Table::parse("   ");
        assert_eq!(table.headers(), &[""]);
        assert_eq!(table.nrows(), 0);
    }

    #[test]
    fn quoted_fields_are_decoded() {
        let table = Table::parse("a,b,c\n\"x\",\"say \\\"hi\\\"\",\"unterminated");
        let row = &table.rows()[0];
        assert_eq!(row.get("a"), Some("x"));
        assert_eq!(row.get("b"), Some("say \"hi\""));
        assert_eq!(row.get("c"), Some("\"unterminated"));
    }

    #[test]
    fn embedded_commas_split_fields() {
        let table = Table::parse("a,b\n\"x,y\",z");
        let row = &table.rows()[0];
        assert_eq!(row.get("a"), Some("\"x"));
        assert_eq!(row.get("b"), Some("y\""));
    }

    #[test]
    fn from_values_zips_against_headers() {
        let table = Table::from_values(&["Name", "Age"], &[vec!["Bob", "30"], vec!["Ann"]]);
        assert_eq!(table.rows()[0].get("Age"), Some("30"));
        assert_eq!(table.rows()[1].get("Age"), None);
    }
}
