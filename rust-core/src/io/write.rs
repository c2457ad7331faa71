//! Plain-text column output

use crate::error::TableError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const DELIMITER: &str = "  ";
const HEADER_SEPARATOR: &str = ", ";

/// Write equal-length columns to `path`, one row per line
///
/// Values use C-style `%.8e` notation separated by two spaces. Column names
/// go on a single `# `-prefixed line, separated by `, `.
pub fn write_columns(
    path: impl AsRef<Path>,
    header: &[&str],
    columns: &[&[f64]],
) -> Result<(), TableError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_columns_to(&mut writer, header, columns)?;
    writer.flush()?;
    log::debug!("Wrote {} columns to {}", columns.len(), path.display());
    Ok(())
}

/// Same as [`write_columns`] for any writer
pub fn write_columns_to<W: Write>(
    writer: &mut W,
    header: &[&str],
    columns: &[&[f64]],
) -> Result<(), TableError> {
    let rows = columns.first().map_or(0, |c| c.len());
    if columns.iter().any(|c| c.len() != rows) {
        return Err(TableError::ColumnLength);
    }

    if !header.is_empty() {
        writeln!(writer, "# {}", header.join(HEADER_SEPARATOR))?;
    }

    let mut line = String::new();
    for row in 0..rows {
        line.clear();
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                line.push_str(DELIMITER);
            }
            line.push_str(&format_scientific(column[row]));
        }
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// `%.8e` formatting: signed exponent with at least two digits
pub fn format_scientific(value: f64) -> String {
    let formatted = format!("{:.8e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        // inf and NaN
        None => formatted,
    }
}
