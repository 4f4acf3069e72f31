use std::collections::HashSet;

use dataco_parser::RawTable;
use polars::prelude::{DataFrame, PolarsResult};
use serde::Serialize;
use tracing::{debug, warn};

pub const SEPARATOR: char = '_';

/// Canonical form of a human-written column label: trimmed, lower-cased, every
/// run of characters outside `[0-9a-z]` collapsed to one `_`, with no leading
/// or trailing `_`. Labels without any alphanumerics map to the empty string.
pub fn canonical_name(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push(SEPARATOR);
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    out
}

/// Canonicalizes a whole header. Labels that collide after canonicalization
/// get `_2`, `_3`, ... appended (a bare number when the base is empty), so the
/// result is unique and already canonical.
pub fn canonical_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut out = Vec::with_capacity(labels.len());

    for label in labels {
        let base = canonical_name(label.as_ref());
        let name = if taken.contains(&base) {
            let resolved = next_free(&base, &taken);
            warn!(
                label = label.as_ref(),
                canonical = %base,
                renamed_to = %resolved,
                "column label collides after normalization"
            );
            resolved
        } else {
            base
        };
        taken.insert(name.clone());
        out.push(name);
    }

    out
}

fn next_free(base: &str, taken: &HashSet<String>) -> String {
    let mut n = 2usize;
    loop {
        let candidate = if base.is_empty() {
            n.to_string()
        } else {
            format!("{base}{SEPARATOR}{n}")
        };
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRename {
    pub original: String,
    pub canonical: String,
}

#[derive(Debug, Clone)]
pub struct NormalizedColumns {
    pub df: DataFrame,
    pub renamed: Vec<ColumnRename>,
}

/// Replaces the table's column names with canonical labels. Rows are untouched.
pub fn normalize_columns(raw: RawTable) -> PolarsResult<NormalizedColumns> {
    let RawTable { labels, mut df } = raw;
    let canonical = canonical_labels(&labels);

    df.set_column_names(canonical.iter().map(String::as_str))?;

    let renamed: Vec<ColumnRename> = labels
        .into_iter()
        .zip(canonical)
        .filter(|(original, canonical)| original != canonical)
        .map(|(original, canonical)| ColumnRename {
            original,
            canonical,
        })
        .collect();

    debug!(renamed = renamed.len(), "normalized column labels");

    Ok(NormalizedColumns { df, renamed })
}
