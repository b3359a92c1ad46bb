//! Delimited numeric tables.
//!
//! Rows are read with the `csv` crate; fields are separated by commas and
//! each field may further hold values separated by spaces or tabs. Blank
//! lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use ::csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{IoError, Result};

/// One parsed record and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub line: usize,
    pub values: Vec<T>,
}

fn parse_record<T>(record: &StringRecord, line: usize, source: &Path) -> Result<Vec<T>>
where
    T: FromStr,
{
    record
        .iter()
        .flat_map(|field| field.split([' ', '\t']))
        .filter(|value| !value.is_empty())
        .map(|value| {
            value.parse::<T>().map_err(|_| IoError::Csv {
                path: source.to_path_buf(),
                line,
                message: format!("cannot parse '{value}' as a number"),
            })
        })
        .collect()
}

fn parse_reader<R, T>(reader: R, source: &Path) -> Result<Vec<Record<T>>>
where
    R: io::Read,
    T: FromStr,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IoError::Csv {
            path: source.to_path_buf(),
            line: e.position().map_or(0, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let values = parse_record(&record, line, source)?;
        if !values.is_empty() {
            records.push(Record { line, values });
        }
    }
    Ok(records)
}

pub fn parse_str<T>(raw: &str, source: &Path) -> Result<Vec<Record<T>>>
where
    T: FromStr,
{
    parse_reader(raw.as_bytes(), source)
}

pub fn read_file<T>(path: impl AsRef<Path>) -> Result<Vec<Record<T>>>
where
    T: FromStr,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::file(path, e))?;
    parse_reader(io::BufReader::new(file), path)
}

/// Reads a table whose every row has exactly `width` fields.
///
/// `describe` names the expected columns in the error message.
pub fn read_fixed_width(
    path: impl AsRef<Path>,
    width: usize,
    describe: &str,
) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let records = read_file::<f64>(path)?;
    records
        .into_iter()
        .enumerate()
        .map(|(row, record)| {
            if record.values.len() == width {
                Ok(record.values)
            } else {
                Err(IoError::Csv {
                    path: path.to_path_buf(),
                    line: record.line,
                    message: format!(
                        "row {row} has {} values, expected {width} {describe}",
                        record.values.len()
                    ),
                })
            }
        })
        .collect()
}
