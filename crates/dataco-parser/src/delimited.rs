use std::io::Cursor;

use csv::{ByteRecord, ReaderBuilder};
use polars::prelude::*;

use crate::errors::ParseError;
use crate::model::{ParseOptions, RawTable};

/// Parses delimited text (header row first) into a [`RawTable`].
///
/// The structure is checked strictly first: every data row must carry as many
/// fields as the header. Values are then typed by polars' schema inference;
/// text that only looks like a date stays text. Empty cells and the tokens in
/// [`ParseOptions::null_values`] become nulls. Invalid UTF-8 is replaced
/// lossily rather than rejected.
pub fn parse_delimited(content: &[u8], options: &ParseOptions) -> Result<RawTable, ParseError> {
    let labels = read_labels_checked(content, options)?;
    let df = read_frame(content, options)?;

    if df.width() != labels.len() {
        return Err(ParseError::InvalidHeader {
            message: format!(
                "reader produced {} columns but the header has {} labels",
                df.width(),
                labels.len()
            ),
        });
    }

    Ok(RawTable { labels, df })
}

fn read_labels_checked(content: &[u8], options: &ParseOptions) -> Result<Vec<String>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(content);

    let header = reader.byte_headers().map_err(ParseError::from_csv)?.clone();
    if header.is_empty() {
        return Err(ParseError::Empty);
    }

    let labels: Vec<String> = header
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();

    let mut record = ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .map_err(ParseError::from_csv)?
    {}

    Ok(labels)
}

fn read_frame(content: &[u8], options: &ParseOptions) -> Result<DataFrame, ParseError> {
    let null_values = (!options.null_values.is_empty()).then(|| {
        NullValues::AllColumns(
            options
                .null_values
                .iter()
                .map(|value| PlSmallStr::from(value.as_str()))
                .collect(),
        )
    });
    let parse_options = CsvParseOptions::default()
        .with_separator(options.delimiter)
        .with_encoding(CsvEncoding::LossyUtf8)
        .with_missing_is_null(true)
        .with_null_values(null_values);

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()
        .map_err(|source| ParseError::Polars { source })
}
