//! Layout of a list directory and discovery of the source files inside it.
//!
//! A list directory holds `about.csv`, `aggregated-list.csv` and the scraped
//! per-source files, named `<source> - YYYY-MM-DD_HH-MM-SS.csv`. Those either
//! sit in one subfolder per source or directly in the list directory. Only
//! the newest file of each source takes part in an aggregation; older ones
//! stay on disk as history.

use crate::about::ABOUT_FILE;
use crate::csv_store::AGGREGATED_FILE;
use crate::error::*;
use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const INVALID_DIR_CHARS: &str = "<>:\"/\\|?*";

const RESERVED_DIR_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9"
];

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" - ([0-9]{4}-[0-9]{2}-[0-9]{2}_[0-9]{2}-[0-9]{2}-[0-9]{2})\.csv$").unwrap())
}

/// The file chosen to represent one source in an aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePick {
    pub name: String,
    pub csv_path: PathBuf
}

/// `ign - 2025-01-17_20-08-18.csv` -> `ign`
pub fn parse_source_from_filename(file_name: &str) -> Option<&str> {
    let split = file_name.len().checked_sub(4)?;
    let (stem, ext) = (file_name.get(..split)?, file_name.get(split..)?);

    if !ext.eq_ignore_ascii_case(".csv") {
        return None;
    }

    let (source, _) = stem.split_once(" - ")?;
    let source = source.trim();

    if source.is_empty() { None } else { Some(source) }
}

pub fn parse_timestamp_from_filename(file_name: &str) -> Option<NaiveDateTime> {
    let caps = timestamp_re().captures(file_name)?;
    NaiveDateTime::parse_from_str(caps.get(1)?.as_str(), TIMESTAMP_FORMAT).ok()
}

/// The name a new scrape of `source` taken at `at` is written under.
#[inline]
pub fn source_file_name(source: &str, at: NaiveDateTime) -> String {
    format!("{} - {}.csv", source, at.format(TIMESTAMP_FORMAT))
}

/// Files of a list directory that are never source rankings.
pub fn is_reserved_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower == ABOUT_FILE || lower == AGGREGATED_FILE || lower.starts_with("aggregated")
}

/// Makes a source name usable as a directory name on every platform.
pub fn sanitize_dirname(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_DIR_CHARS.contains(c) || c.is_control() { '_' } else { c })
        .collect();
    let mut sanitized = replaced.trim().trim_end_matches(|c| c == ' ' || c == '.').to_string();

    if RESERVED_DIR_NAMES.contains(&sanitized.to_uppercase().as_str()) {
        sanitized.push('_');
    }

    if sanitized.is_empty() {
        "unknown_source".into()
    } else {
        sanitized
    }
}

fn source_csvs_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue
        };

        if name.to_lowercase().ends_with(".csv") && !is_reserved_file(name) {
            files.push(path);
        }
    }

    Ok(files)
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Newest of `files`: by filename timestamp when any file carries one,
/// otherwise by modification time.
fn newest(files: Vec<PathBuf>) -> Option<PathBuf> {
    let stamped: Vec<(NaiveDateTime, PathBuf)> = files
        .iter()
        .filter_map(|p| {
            let name = p.file_name()?.to_str()?;
            parse_timestamp_from_filename(name).map(|ts| (ts, p.clone()))
        })
        .collect();

    if !stamped.is_empty() {
        return stamped
            .into_iter()
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, p)| p);
    }

    files
        .into_iter()
        .max_by(|a, b| modified(a).cmp(&modified(b)).then_with(|| a.cmp(b)))
}

pub fn latest_csv_in_dir<P: AsRef<Path>>(dir: P) -> Result<Option<PathBuf>> {
    Ok(newest(source_csvs_in(dir.as_ref())?))
}

/// Subdirectories of `dir`, sorted case-insensitively by name.
pub fn subdirs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![];

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort_by_key(|p| dir_name(p).to_lowercase());
    Ok(dirs)
}

#[inline]
pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Picks the newest file of every source of a list.
///
/// Per-source subfolders take precedence; when none of them holds a CSV the
/// flat `<source> - <timestamp>.csv` files of the list directory are grouped
/// by source instead.
pub fn pick_sources<P: AsRef<Path>>(list_dir: P) -> Result<Vec<SourcePick>> {
    let list_dir = list_dir.as_ref();

    if !list_dir.is_dir() {
        bail!(ErrorKind::ListDirMissing(list_dir.to_path_buf()));
    }

    let mut picks = vec![];

    for source_dir in subdirs(list_dir)? {
        if let Some(csv_path) = latest_csv_in_dir(&source_dir)? {
            picks.push(SourcePick {
                name: dir_name(&source_dir),
                csv_path
            });
        }
    }

    if !picks.is_empty() {
        return Ok(picks);
    }

    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for path in source_csvs_in(list_dir)? {
        let name = dir_name(&path);
        match parse_source_from_filename(&name) {
            Some(source) => groups.entry(source.to_string()).or_default().push(path),
            None => debug!("{}: not a source file, ignoring", path.display())
        }
    }

    for (name, files) in groups {
        if let Some(csv_path) = newest(files) {
            picks.push(SourcePick { name, csv_path });
        }
    }

    picks.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(picks)
}
