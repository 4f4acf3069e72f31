use polars::prelude::DataFrame;

/// Cell values read as missing in every column, on top of empty cells.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// How the raw bytes are split into fields and typed.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub delimiter: u8,
    /// Rows scanned for type inference; `None` scans the whole input.
    pub infer_schema_length: Option<usize>,
    /// Exact cell values treated as null. Matching is case-sensitive.
    pub null_values: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_schema_length: None,
            null_values: DEFAULT_NULL_VALUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// A delimited table exactly as the source wrote it.
///
/// `labels` keeps the header text untouched (mixed case, spaces, punctuation);
/// the frame's own column names are reader-assigned and should not be relied
/// upon until the labels have been normalized.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub labels: Vec<String>,
    pub df: DataFrame,
}

impl RawTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }
}
