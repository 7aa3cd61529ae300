//! Dataset row types
//!
//! Datasets follow a fixed 3-row header convention: row 0 carries the
//! variable/column names, row 1 one concrete sample of raw values
//! (diagnostic only, may be empty), row 2 the human-readable column
//! headers. Every subsequent row is one sample instance.
//!
//! [`Dataset`] makes that convention explicit in the type rather than
//! leaving it to positional indexing.

use crate::digest::Digest;
use crate::error::StoreError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Number of header rows preceding the data rows
pub const HEADER_ROWS: usize = 3;

/// One dataset row (one cell per column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<String>);

impl Row {
    /// Build a row from anything yielding string-ish cells
    #[must_use]
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(Into::into).collect())
    }

    /// Cells of this row
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    /// Number of cells
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no cells
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_csv_line(&self) -> String {
        let encoded: Vec<String> = self.0.iter().map(|cell| csv_escape(cell)).collect();
        encoded.join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// The fixed 3-row header block shared by compatible datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBlock {
    /// Row 0: variable/column names
    pub variables: Row,
    /// Row 1: one sample of raw values (diagnostic only, may be empty)
    pub sample_values: Row,
    /// Row 2: human-readable column headers
    pub display_headers: Row,
}

impl HeaderBlock {
    /// Create a header block from its three rows
    #[inline]
    #[must_use]
    pub fn new(variables: Row, sample_values: Row, display_headers: Row) -> Self {
        Self {
            variables,
            sample_values,
            display_headers,
        }
    }

    /// The three header rows in wire order
    #[must_use]
    pub fn rows(&self) -> [&Row; HEADER_ROWS] {
        [&self.variables, &self.sample_values, &self.display_headers]
    }

    /// Digest over the header rows only
    ///
    /// Byte-identical headers produce equal digests; this is the merge
    /// compatibility check. Each row is hashed as a unit, so moving a
    /// cell between header rows changes the digest.
    #[must_use]
    pub fn schema_digest(&self) -> Digest {
        let rows = self
            .rows()
            .into_iter()
            .map(|row| row.cells().iter().map(String::as_bytes));
        Digest::compute_grouped_chunks(rows)
    }
}

/// An ordered, immutable-once-stored sequence of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    header: HeaderBlock,
    data: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from a typed header block and data rows
    #[inline]
    #[must_use]
    pub fn new(header: HeaderBlock, data: Vec<Row>) -> Self {
        Self { header, data }
    }

    /// Interpret a flat row buffer: rows 0-2 become the header block
    ///
    /// # Errors
    /// Returns [`StoreError::MalformedDataset`] if fewer than
    /// [`HEADER_ROWS`] rows were supplied.
    pub fn from_rows(mut rows: Vec<Row>) -> Result<Self, StoreError> {
        if rows.len() < HEADER_ROWS {
            return Err(StoreError::MalformedDataset(format!(
                "expected at least {HEADER_ROWS} header rows, got {}",
                rows.len()
            )));
        }
        let data = rows.split_off(HEADER_ROWS);
        let mut drain = rows.into_iter();
        // split_off left exactly HEADER_ROWS rows behind
        let variables = drain.next().unwrap_or_else(|| Row(Vec::new()));
        let sample_values = drain.next().unwrap_or_else(|| Row(Vec::new()));
        let display_headers = drain.next().unwrap_or_else(|| Row(Vec::new()));
        Ok(Self {
            header: HeaderBlock::new(variables, sample_values, display_headers),
            data,
        })
    }

    /// The header block
    #[inline]
    #[must_use]
    pub fn header(&self) -> &HeaderBlock {
        &self.header
    }

    /// Data rows (header rows excluded)
    #[inline]
    #[must_use]
    pub fn data_rows(&self) -> &[Row] {
        &self.data
    }

    /// Total row count including the header block
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        HEADER_ROWS + self.data.len()
    }

    /// Digest over the header rows only
    #[inline]
    #[must_use]
    pub fn schema_digest(&self) -> Digest {
        self.header.schema_digest()
    }

    /// Digest over every row, headers included
    ///
    /// Row boundaries are part of the fingerprint: datasets whose cells
    /// form the same flat sequence but are split into different rows
    /// get different digests, and therefore different handles.
    #[must_use]
    pub fn content_digest(&self) -> Digest {
        let rows = self
            .header
            .rows()
            .into_iter()
            .chain(self.data.iter())
            .map(|row| row.cells().iter().map(String::as_bytes));
        Digest::compute_grouped_chunks(rows)
    }

    /// Data rows keyed by their first cell (the sample identifier)
    ///
    /// Header rows are skipped; the sample id cell is not repeated in
    /// the value. Rows without cells are ignored. Later duplicates of a
    /// sample id overwrite earlier ones.
    #[must_use]
    pub fn structured_data(&self) -> IndexMap<String, Vec<String>> {
        let mut by_sample = IndexMap::new();
        for row in &self.data {
            let Some((sample_id, values)) = row.cells().split_first() else {
                continue;
            };
            by_sample.insert(sample_id.clone(), values.to_vec());
        }
        by_sample
    }

    /// Encode as CSV text (RFC-4180-style quoting)
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in self.header.rows().into_iter().chain(self.data.iter()) {
            out.push_str(&row.to_csv_line());
            out.push('\n');
        }
        out
    }
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> HeaderBlock {
        HeaderBlock::new(
            Row::new(["var1", "var2"]),
            Row::new(["value1", "value2"]),
            Row::new(["header1", "header2"]),
        )
    }

    #[test]
    fn from_rows_splits_header_and_data() {
        let rows = vec![
            Row::new(["var1", "var2"]),
            Row::new(["value1", "value2"]),
            Row::new(["header1", "header2"]),
            Row::new(["s1", "yeah"]),
        ];
        let dataset = Dataset::from_rows(rows).unwrap();
        assert_eq!(dataset.header().variables, Row::new(["var1", "var2"]));
        assert_eq!(dataset.data_rows().len(), 1);
        assert_eq!(dataset.row_count(), 4);
    }

    #[test]
    fn from_rows_rejects_short_buffers() {
        let result = Dataset::from_rows(vec![Row::new(["var1"])]);
        assert!(matches!(result, Err(StoreError::MalformedDataset(_))));
    }

    #[test]
    fn from_rows_accepts_headers_only() {
        let rows = vec![Row::new(["v"]), Row::new(["s"]), Row::new(["h"])];
        let dataset = Dataset::from_rows(rows).unwrap();
        assert!(dataset.data_rows().is_empty());
    }

    #[test]
    fn schema_digest_ignores_data_rows() {
        let a = Dataset::new(header(), vec![Row::new(["s1", "yeah"])]);
        let b = Dataset::new(header(), vec![Row::new(["s2", "no"])]);
        assert_eq!(a.schema_digest(), b.schema_digest());
        assert_ne!(a.content_digest(), b.content_digest());
    }

    #[test]
    fn content_digest_sees_row_boundaries() {
        let together = Dataset::new(header(), vec![Row::new(["d1", "d2"])]);
        let split = Dataset::new(header(), vec![Row::new(["d1"]), Row::new(["d2"])]);
        assert_ne!(together.content_digest(), split.content_digest());
    }

    #[test]
    fn schema_digest_sees_cell_regrouping_across_header_rows() {
        let regrouped = HeaderBlock::new(
            Row::new(["var1", "var2", "value1"]),
            Row::new(["value2"]),
            Row::new(["header1", "header2"]),
        );
        assert_ne!(header().schema_digest(), regrouped.schema_digest());
    }

    #[test]
    fn schema_digest_detects_header_changes() {
        let other = HeaderBlock::new(
            Row::new(["var1", "varX"]),
            Row::new(["value1", "value2"]),
            Row::new(["header1", "header2"]),
        );
        assert_ne!(header().schema_digest(), other.schema_digest());
    }

    #[test]
    fn structured_data_keys_by_first_cell() {
        let dataset = Dataset::new(
            header(),
            vec![
                Row::new(["s1", "0.4", "ok"]),
                Row::new(["s2", "0.9", "late"]),
            ],
        );
        let structured = dataset.structured_data();
        assert_eq!(structured.len(), 2);
        assert_eq!(structured["s1"], vec!["0.4".to_string(), "ok".to_string()]);
        assert_eq!(structured["s2"], vec!["0.9".to_string(), "late".to_string()]);
    }

    #[test]
    fn structured_data_last_duplicate_wins() {
        let dataset = Dataset::new(
            header(),
            vec![Row::new(["s1", "old"]), Row::new(["s1", "new"])],
        );
        let structured = dataset.structured_data();
        assert_eq!(structured.len(), 1);
        assert_eq!(structured["s1"], vec!["new".to_string()]);
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let dataset = Dataset::new(
            header(),
            vec![Row::new(["s1", "a,b", "say \"hi\""])],
        );
        let csv = dataset.to_csv();
        assert!(csv.contains("var1,var2\n"));
        assert!(csv.contains("\"a,b\""));
        assert!(csv.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn serde_round_trip() {
        let dataset = Dataset::new(header(), vec![Row::new(["s1", "yeah"])]);
        let json = serde_json::to_string(&dataset).unwrap();
        let decoded: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(dataset, decoded);
    }
}
