use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input did not contain a header row")]
    Empty,

    #[error("header row invalid: {message}")]
    InvalidHeader { message: String },

    #[error("data row on line {line} has {found} fields, expected {expected}")]
    DataRow { line: u64, expected: u64, found: u64 },

    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("failed to build dataframe: {source}")]
    Polars {
        #[source]
        source: PolarsError,
    },
}

impl ParseError {
    pub(crate) fn from_csv(err: csv::Error) -> Self {
        if let csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } = err.kind()
        {
            return ParseError::DataRow {
                line: pos.as_ref().map_or(0, |p| p.line()),
                expected: *expected_len,
                found: *len,
            };
        }
        ParseError::Csv { source: err }
    }
}
