//! Plain-text and JSON state output.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::DVector;
use serde_json::Value;

use crate::error::{IoError, Result};

/// Significant digits written for nodal values.
pub const SIGNIFICANT_DIGITS: usize = 15;

/// `<prefix>_<NNNNN>` with the index zero-padded to five digits.
pub fn numbered_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index:05}")
}

/// Shortest rendering with at most `digits` significant digits, switching to
/// exponent notation for very large or small magnitudes (like C's `%g`).
pub fn format_significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
    }
    Ok(())
}

/// Writes one value per line.
pub fn write_column(path: impl AsRef<Path>, values: &DVector<f64>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|e| IoError::file(path, e))?;
    let mut out = BufWriter::new(file);
    for v in values.iter() {
        writeln!(out, "{}", format_significant(*v, SIGNIFICANT_DIGITS))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_document(path: impl AsRef<Path>, document: &Value) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let bytes = serde_json::to_vec_pretty(document)?;
    fs::write(path, bytes).map_err(|e| IoError::file(path, e))
}
