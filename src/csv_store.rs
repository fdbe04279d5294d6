//! Reading and writing the CSV files a list directory is made of.
//!
//! Files are RFC 4180: comma separated, fields containing a comma, quote or
//! newline are quoted and embedded quotes are doubled. Everything written
//! here goes through `write_atomic`, so a failed run never leaves a
//! half-written file behind.

use crate::data_structs::{AggregatedEntry, GameEntry};
use crate::error::*;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const SOURCE_HEADER: [&str; 7] = [
    "Position",
    "Title",
    "ReleaseDate",
    "ExternalId",
    "Score",
    "GameId",
    "CoverImageId"
];

pub const AGGREGATED_HEADER: [&str; 4] = ["Position", "Title", "TotalScore", "ListsAppeared"];

pub const AGGREGATED_FILE: &str = "aggregated-list.csv";

/// A row as it appears on disk, before validation.
#[derive(Debug, Deserialize)]
struct RawSourceRow {
    #[serde(rename = "Position")]
    position: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "ReleaseDate", default)]
    release_date: Option<String>,
    #[serde(rename = "ExternalId", default)]
    external_id: Option<String>,
    #[serde(rename = "Score", default)]
    score: Option<String>,
    #[serde(rename = "GameId", default)]
    game_id: Option<String>,
    #[serde(rename = "CoverImageId", default)]
    cover_image_id: Option<String>
}

impl RawSourceRow {
    fn validate(self) -> ::std::result::Result<GameEntry, String> {
        let position: u32 = self
            .position
            .trim()
            .parse()
            .map_err(|_| format!("non-numeric position '{}'", self.position))?;

        if position == 0 {
            return Err("position must be at least 1".into());
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err("empty title".into());
        }

        let score = match non_empty(self.score) {
            Some(raw) => match raw.parse::<f64>() {
                Ok(score) if score.is_finite() => Some(score),
                _ => return Err(format!("non-numeric score '{}'", raw))
            },
            None => None
        };

        Ok(GameEntry {
            position,
            title: title.to_string(),
            release_date: non_empty(self.release_date),
            external_id: non_empty(self.external_id),
            score,
            game_id: non_empty(self.game_id),
            cover_image_id: non_empty(self.cover_image_id)
        })
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses a per-source ranking. `label` names the input in log messages.
///
/// Rows that can't be parsed are skipped with a warning. A missing
/// `Position` or `Title` column makes the whole input malformed.
pub fn parse_source_csv<R: Read>(reader: R, label: &str) -> Result<Vec<GameEntry>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for required in &["Position", "Title"] {
        if !headers.iter().any(|h| h == *required) {
            bail!(ErrorKind::MalformedCsv(format!("{}: missing '{}' column", label, required)));
        }
    }

    let mut entries = vec![];

    for (i, row) in rdr.deserialize::<RawSourceRow>().enumerate() {
        // Header is line 1
        let line = i + 2;

        match row.map_err(|e| e.to_string()).and_then(RawSourceRow::validate) {
            Ok(entry) => entries.push(entry),
            Err(reason) => warn!("{}: skipping row {}: {}", label, line, reason)
        }
    }

    Ok(entries)
}

/// Reads a per-source ranking from disk. See `parse_source_csv`.
pub fn read_source_csv<P: AsRef<Path>>(path: P) -> Result<Vec<GameEntry>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    parse_source_csv(file, &path.display().to_string())
}

/// Writes a per-source ranking with the full column set.
pub fn write_source_csv<P: AsRef<Path>>(path: P, entries: &[GameEntry]) -> Result<()> {
    write_rows(path.as_ref(), &SOURCE_HEADER, entries)
}

/// Writes `aggregated-list.csv`. The header is written even when there are
/// no entries.
pub fn write_aggregated<P: AsRef<Path>>(path: P, entries: &[AggregatedEntry]) -> Result<()> {
    write_rows(path.as_ref(), &AGGREGATED_HEADER, entries)
}

pub fn read_aggregated<P: AsRef<Path>>(path: P) -> Result<Vec<AggregatedEntry>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::Headers)
        .from_path(path)?;
    let mut entries = vec![];

    for row in rdr.deserialize() {
        entries.push(row?);
    }

    Ok(entries)
}

pub(crate) fn write_rows<S: Serialize>(path: &Path, header: &[&str], rows: &[S]) -> Result<()> {
    write_atomic(path, |file| {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(header)?;

        for row in rows {
            wtr.serialize(row)?;
        }

        wtr.flush()?;
        Ok(())
    })
}

/// Writes a file by filling a temporary file next to it and renaming it over
/// the destination once `fill` has succeeded.
pub fn write_atomic<P, F>(path: P, fill: F) -> Result<()>
    where P: AsRef<Path>,
          F: FnOnce(&mut File) -> Result<()> {

    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new(".")
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
