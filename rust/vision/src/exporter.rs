// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature table serialization
//!
//! The table is a comma-separated file with the header `x,y,size,property_id`
//! and one row per record, in table order. Values are written verbatim.

use crate::error::{Error, Result};
use crate::types::{FeatureRecord, FeatureTable, SizeClass};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Column names, in output order
pub const COLUMNS: [&str; 4] = ["x", "y", "size", "property_id"];

/// Write the table as CSV to any writer
pub fn write_feature_table<W: Write>(table: &FeatureTable, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{}", COLUMNS.join(","))?;
    for record in &table.records {
        writeln!(
            writer,
            "{},{},{},{}",
            record.x, record.y, record.size, record.property_id
        )?;
    }
    writer.flush()
}

/// Render the table as a CSV string
pub fn feature_table_to_string(table: &FeatureTable) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_feature_table(table, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Render the table as pretty-printed JSON
pub fn feature_table_to_json(table: &FeatureTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

/// Write the table to `path` atomically
///
/// Rows go to a temporary file next to the destination, which replaces the
/// destination only once everything is flushed and synced. On failure the
/// destination is left untouched and the temporary file is removed.
pub fn save_feature_table(table: &FeatureTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::write(path, e))?;
    write_feature_table(table, BufWriter::new(&mut tmp)).map_err(|e| Error::write(path, e))?;
    tmp.as_file().sync_all().map_err(|e| Error::write(path, e))?;
    tmp.persist(path).map_err(|e| Error::write(path, e.error))?;

    tracing::debug!(path = %path.display(), rows = table.len(), "Wrote feature table");
    Ok(())
}

/// Parse a properties table
///
/// Columns are located by header name, so tables carrying extra columns
/// are accepted. Blank lines are skipped. Any `size` other than the three
/// literals fails with [`Error::InvalidSize`].
pub fn read_feature_table<R: BufRead>(reader: R) -> Result<Vec<FeatureRecord>> {
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => line.map_err(|e| malformed(1, e.to_string()))?,
        None => return Err(malformed(1, "missing header row")),
    };
    let header: Vec<&str> = header.split(',').map(str::trim).collect();
    let mut index = [0usize; 4];
    for (slot, name) in index.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| malformed(1, format!("missing column {name:?}")))?;
    }

    let mut records = Vec::new();
    for (i, line) in lines {
        let line_no = i + 1;
        let line = line.map_err(|e| malformed(line_no, e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |column: usize| {
            fields.get(index[column]).copied().ok_or_else(|| {
                malformed(line_no, format!("missing value for {:?}", COLUMNS[column]))
            })
        };

        records.push(FeatureRecord {
            x: parse_int(field(0)?, line_no, "x")?,
            y: parse_int(field(1)?, line_no, "y")?,
            size: field(2)?.parse::<SizeClass>()?,
            property_id: parse_int(field(3)?, line_no, "property_id")?,
        });
    }

    Ok(records)
}

/// Read a properties table from disk
pub fn load_feature_table(path: impl AsRef<Path>) -> Result<Vec<FeatureRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::read(path, e))?;
    read_feature_table(BufReader::new(file))
}

fn parse_int<T: std::str::FromStr>(value: &str, line: usize, column: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| malformed(line, format!("{column} is not an integer: {value:?}")))
}

fn malformed(line: usize, reason: impl Into<String>) -> Error {
    Error::MalformedTable {
        line,
        reason: reason.into(),
    }
}
