//! The `about.csv` log of a list: one row per source file a scrape or an
//! aggregation run produced or consumed. Rows are only ever appended.

use crate::data_structs::SourceDescriptor;
use crate::error::*;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const ABOUT_FILE: &str = "about.csv";

pub const ABOUT_HEADER: [&str; 4] = ["SourceName", "SourceUrl", "Timestamp", "GeneratedCsvPath"];

/// Reads every row of a list's `about.csv`. A missing file is an empty log.
pub fn read_about<P: AsRef<Path>>(list_dir: P) -> Result<Vec<SourceDescriptor>> {
    let path = list_dir.as_ref().join(ABOUT_FILE);

    if !path.exists() {
        return Ok(vec![]);
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(&path)?;
    let mut rows = vec![];

    for row in rdr.deserialize::<SourceDescriptor>() {
        match row {
            Ok(row) if !row.source_name.is_empty() => rows.push(row),
            Ok(_) => {}
            Err(e) => warn!("{}: skipping row: {}", path.display(), e)
        }
    }

    Ok(rows)
}

/// The URL most recently recorded for `source_name`, compared
/// case-insensitively.
pub fn last_known_url<'a>(log: &'a [SourceDescriptor], source_name: &str) -> Option<&'a str> {
    log.iter()
        .rev()
        .filter(|d| d.source_name.eq_ignore_ascii_case(source_name))
        .map(|d| d.source_url.as_str())
        .find(|url| !url.is_empty())
}

/// Appends rows to a list's `about.csv`, creating it with a header first.
///
/// An existing file keeps its own header: values are written under the
/// columns it already has (`SourceURL` is treated as `SourceUrl`) and any
/// other column is left empty.
pub fn append_about<P: AsRef<Path>>(list_dir: P, rows: &[SourceDescriptor]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let list_dir = list_dir.as_ref();
    fs::create_dir_all(list_dir)?;
    let path = list_dir.join(ABOUT_FILE);

    let existing = if path.exists() { fs::read(&path)? } else { vec![] };
    let header = if existing.is_empty() {
        None
    } else {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(&existing[..]);
        Some(rdr.headers()?.clone())
    };

    let mut buf = vec![];
    if !existing.is_empty() && !existing.ends_with(b"\n") {
        buf.push(b'\n');
    }
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(buf);

    match header {
        Some(ref header) => {
            for row in rows {
                wtr.write_record(&project(row, header))?;
            }
        }
        None => {
            wtr.write_record(&ABOUT_HEADER)?;
            for row in rows {
                wtr.serialize(row)?;
            }
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::from(e.into_error()))?;

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(&bytes)?;

    Ok(())
}

fn project(row: &SourceDescriptor, header: &StringRecord) -> Vec<String> {
    header
        .iter()
        .map(|column| match column {
            "SourceName" => row.source_name.clone(),
            "SourceUrl" | "SourceURL" => row.source_url.clone(),
            "Timestamp" => row.timestamp.clone(),
            "GeneratedCsvPath" => row.generated_csv_path.clone(),
            _ => String::new()
        })
        .collect()
}
