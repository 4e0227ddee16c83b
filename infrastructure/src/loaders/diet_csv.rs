//! Diet matrix CSV reader
//!
//! Matrices are small (one row per prey group), so the whole file is read
//! at once. Quoted fields, doubled quotes, a UTF-8 BOM and CRLF line endings
//! are accepted.

use super::LoadError;
use ecogroup_domain::DietMatrix;
use std::path::Path;

/// Split CSV text into records.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Read a `05_diet_matrix.csv` file.
pub fn read_diet_matrix(path: &Path) -> Result<DietMatrix, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let records = parse_csv(&text).map_err(|message| LoadError::Format {
        path: path.to_path_buf(),
        message,
    })?;
    DietMatrix::from_records(&records).map_err(|e| LoadError::domain(path, e))
}
