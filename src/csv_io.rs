//! CSV table input and export
//!
//! Reading goes through the `csv` crate with a table-driven column-alias
//! lookup performed once per table, producing the canonical internal row
//! shapes. Missing columns and empty cells both land as `None`; field
//! interpretation is left to the normalizer. Export writes the filtered
//! record set back in the usage column layout, quoting any value that
//! contains a comma, quote, or newline and doubling embedded quotes.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::record::{NormalizedRecord, RawRecord, USAGE_COLUMNS};
use crate::winrate::ExternalWinRateRow;
use crate::ngram::ExternalTermRow;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Accepted header spellings per canonical column, matched
/// case-insensitively after trimming.
type AliasTable = &'static [(&'static str, &'static [&'static str])];

const USAGE_ALIASES: AliasTable = &[
    ("date", &["date"]),
    ("model", &["model"]),
    ("user_text", &["user_text"]),
    ("topic", &["topic"]),
    ("tts", &["tts"]),
    ("is_solved", &["is_solved"]),
    ("fit", &["fit_score", "fit"]),
    ("turn", &["turn"]),
    ("conversation", &["conversation"]),
];

const WINRATE_ALIASES: AliasTable = &[
    ("model", &["model"]),
    ("wins", &["wins"]),
    ("apps", &["apps"]),
    ("win_rate", &["win_rate", "winrate"]),
    ("lo", &["wr_lo", "wilsonlo"]),
    ("hi", &["wr_hi", "wilsonhi"]),
];

const NGRAM_ALIASES: AliasTable = &[("term", &["term"]), ("freq", &["freq"])];

/// Resolve the header row against an alias table, once per file.
fn column_indices(headers: &csv::StringRecord, aliases: AliasTable) -> HashMap<&'static str, usize> {
    let mut indices = HashMap::new();
    for (pos, header) in headers.iter().enumerate() {
        let name = header.trim().to_lowercase();
        for (canonical, spellings) in aliases {
            if !indices.contains_key(canonical) && spellings.iter().any(|s| *s == name) {
                indices.insert(*canonical, pos);
            }
        }
    }
    indices
}

/// Cell lookup: absent column and empty cell both become `None`.
fn field(
    record: &csv::StringRecord,
    indices: &HashMap<&'static str, usize>,
    name: &'static str,
) -> Option<String> {
    let value = record.get(*indices.get(name)?)?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

/// Read the usage table into canonical raw rows.
pub fn read_usage<R: Read>(input: R) -> Result<Vec<RawRecord>, TableError> {
    let mut rdr = reader(input);
    let indices = column_indices(rdr.headers()?, USAGE_ALIASES);
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(RawRecord {
            date: field(&record, &indices, "date"),
            model: field(&record, &indices, "model"),
            user_text: field(&record, &indices, "user_text"),
            topic: field(&record, &indices, "topic"),
            tts: field(&record, &indices, "tts"),
            is_solved: field(&record, &indices, "is_solved"),
            fit: field(&record, &indices, "fit"),
            turn: field(&record, &indices, "turn"),
            conversation: field(&record, &indices, "conversation"),
        });
    }
    Ok(rows)
}

/// Read the optional precomputed win-rate table.
pub fn read_winrate<R: Read>(input: R) -> Result<Vec<ExternalWinRateRow>, TableError> {
    let mut rdr = reader(input);
    let indices = column_indices(rdr.headers()?, WINRATE_ALIASES);
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(ExternalWinRateRow {
            model: field(&record, &indices, "model"),
            wins: field(&record, &indices, "wins"),
            apps: field(&record, &indices, "apps"),
            win_rate: field(&record, &indices, "win_rate"),
            lo: field(&record, &indices, "lo"),
            hi: field(&record, &indices, "hi"),
        });
    }
    Ok(rows)
}

/// Read the optional precomputed term-frequency table.
pub fn read_ngrams<R: Read>(input: R) -> Result<Vec<ExternalTermRow>, TableError> {
    let mut rdr = reader(input);
    let indices = column_indices(rdr.headers()?, NGRAM_ALIASES);
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(ExternalTermRow {
            term: field(&record, &indices, "term"),
            freq: field(&record, &indices, "freq"),
        });
    }
    Ok(rows)
}

/// Quote a field when it contains a comma, quote, or newline; embedded
/// quotes are doubled.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_row(rec: &NormalizedRecord) -> String {
    let fields = [
        rec.date.format("%Y-%m-%d %H:%M:%S").to_string(),
        escape_field(&rec.model),
        escape_field(&rec.user_text),
        escape_field(&rec.topic),
        rec.tts.map(|v| v.to_string()).unwrap_or_default(),
        if rec.is_solved { "1" } else { "0" }.to_string(),
        rec.fit.map(|v| v.to_string()).unwrap_or_default(),
    ];
    fields.join(",")
}

/// Serialize the filtered record set back to the usage column layout.
pub fn to_csv(records: &[&NormalizedRecord]) -> String {
    let mut output = String::new();
    output.push_str(&USAGE_COLUMNS.join(","));
    output.push('\n');
    for rec in records {
        output.push_str(&format_row(rec));
        output.push('\n');
    }
    output
}

/// Write the export file. Callers skip this entirely on an empty view.
pub fn write_records(path: &Path, records: &[&NormalizedRecord]) -> Result<(), TableError> {
    let mut file = File::create(path)?;
    file.write_all(to_csv(records).as_bytes())?;
    Ok(())
}
