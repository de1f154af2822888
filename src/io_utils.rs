//! I/O utilities for CSV reading, writing, encoding, and delimiter resolution.
//!
//! All file I/O in csv-ingest flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Table loading**: [`read_table`] turns a CSV file into a typed
//!   [`Table`], mapping null tokens to [`Value::Null`] and assigning each
//!   column a single storage kind.
//! - **stdin**: the `-` path convention reads from standard input.

use std::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::Value,
    dataset::{Row, Table},
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Cell contents read as missing values.
pub const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_TOKENS: &[&str] = &["True", "TRUE", "true"];
const FALSE_TOKENS: &[&str] = &["False", "FALSE", "false"];

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

/// Whether a raw cell is read as missing: a [`NULL_TOKENS`] entry or any
/// spelling `f64` parses as NaN (`NAN`, `+nan`, ...).
pub fn is_null_token(value: &str) -> bool {
    NULL_TOKENS.contains(&value) || value.trim().parse::<f64>().is_ok_and(f64::is_nan)
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
    has_headers: bool,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter, has_headers))
}

/// Opens a CSV writer on `path`, truncating it unless `append` is set.
pub fn open_csv_writer(
    path: &Path,
    delimiter: u8,
    append: bool,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let file = if append {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Opening output file {path:?} for append"))?
    } else {
        File::create(path).with_context(|| format!("Creating output file {path:?}"))?
    };
    let writer: Box<dyn Write> = Box::new(BufWriter::new(file));

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    Integer,
    Float,
    Boolean,
    Text,
}

fn classify_raw_column<'a, I>(cells: I) -> RawKind
where
    I: IntoIterator<Item = &'a str>,
{
    let mut integer = true;
    let mut float = true;
    let mut boolean = true;
    let mut seen = false;
    for cell in cells {
        seen = true;
        integer = integer && cell.trim().parse::<i64>().is_ok();
        float = float && cell.trim().parse::<f64>().is_ok();
        boolean = boolean && (TRUE_TOKENS.contains(&cell) || FALSE_TOKENS.contains(&cell));
        if !integer && !float && !boolean {
            return RawKind::Text;
        }
    }
    match (seen, integer, float, boolean) {
        (false, ..) => RawKind::Text,
        (true, true, _, _) => RawKind::Integer,
        (true, false, true, _) => RawKind::Float,
        (true, false, false, true) => RawKind::Boolean,
        _ => RawKind::Text,
    }
}

fn convert_cell(cell: Option<String>, kind: RawKind) -> Value {
    let Some(cell) = cell else {
        return Value::Null;
    };
    let converted = match kind {
        RawKind::Integer => cell.trim().parse::<i64>().ok().map(Value::Integer),
        RawKind::Float => cell.trim().parse::<f64>().ok().map(Value::Float),
        RawKind::Boolean => Some(Value::Boolean(TRUE_TOKENS.contains(&cell.as_str()))),
        RawKind::Text => None,
    };
    converted.unwrap_or(Value::Text(cell))
}

/// Reads a whole CSV file into a [`Table`].
///
/// Null tokens become [`Value::Null`]. Each column is then stored as
/// integers, floats, or booleans when every non-null cell parses as such,
/// and as text otherwise.
pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let mut reader = open_csv_reader_from_path(path, delimiter, true)?;
    let headers = reader_headers(&mut reader, encoding)?;

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {:?}", row_idx + 2, path))?;
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} in {:?}", row_idx + 2, path))?;
        raw_rows.push(
            decoded
                .into_iter()
                .map(|cell| (!is_null_token(&cell)).then_some(cell))
                .collect(),
        );
    }

    let kinds = (0..headers.len())
        .map(|idx| {
            classify_raw_column(
                raw_rows
                    .iter()
                    .filter_map(|row| row.get(idx).and_then(|cell| cell.as_deref())),
            )
        })
        .collect::<Vec<_>>();
    debug!("Column storage kinds for {:?}: {:?}", path, kinds);

    let mut table = Table::new(headers);
    for (index, raw) in raw_rows.into_iter().enumerate() {
        let values = raw
            .into_iter()
            .zip(kinds.iter())
            .map(|(cell, kind)| convert_cell(cell, *kind))
            .collect();
        table.push(Row { index, values })?;
    }
    Ok(table)
}
