//! Runs that touch a whole list directory: recording a scrape, and
//! aggregating a list (or every list under a root, optionally merged into
//! one combined ranking at the root).
//!
//! Callers must not run two of these against the same list at once.

use crate::about::{append_about, last_known_url, read_about, ABOUT_FILE};
use crate::aggregator::{aggregate, SourceRankings};
use crate::csv_store::{read_source_csv, write_aggregated, write_source_csv, AGGREGATED_FILE};
use crate::data_structs::{fill_positional_scores, AggregatedEntry, GameEntry, SourceDescriptor};
use crate::error::*;
use crate::list_dir::{dir_name, pick_sources, sanitize_dirname, source_file_name, subdirs, SourcePick};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Outcome of aggregating one list.
#[derive(Debug)]
pub struct AggregationReport {
    pub list: String,
    pub output: PathBuf,
    pub sources_used: Vec<String>,
    /// Sources that couldn't be read, with the reason.
    pub sources_skipped: Vec<(String, String)>,
    pub entries: Vec<AggregatedEntry>,
    /// The source rankings the entries were computed from.
    pub rankings: SourceRankings
}

/// Outcome of merging every aggregated list into the root ranking.
#[derive(Debug)]
pub struct CombinedReport {
    pub output: PathBuf,
    pub lists: Vec<String>,
    pub entries: Vec<AggregatedEntry>
}

/// Where a list's scrape of `source` taken at `at` is stored.
pub fn source_csv_path(list_dir: &Path, source: &str, at: &DateTime<Local>) -> PathBuf {
    list_dir
        .join(sanitize_dirname(source))
        .join(source_file_name(source, at.naive_local()))
}

/// Stores the result of one scrape in a list directory and logs it in
/// `about.csv`. Positional scores are filled in when the source gave none.
pub fn record_scrape(
    list_dir: &Path,
    source: &str,
    source_url: &str,
    mut entries: Vec<GameEntry>,
    at: DateTime<Local>
) -> Result<PathBuf> {
    entries.sort_by_key(|e| e.position);

    if entries.iter().all(|e| e.score.is_none()) {
        fill_positional_scores(&mut entries);
    }

    let path = source_csv_path(list_dir, source, &at);
    write_source_csv(&path, &entries)?;

    append_about(
        list_dir,
        &[SourceDescriptor {
            source_name: source.to_string(),
            source_url: source_url.to_string(),
            timestamp: at.to_rfc3339(),
            generated_csv_path: relative_path(list_dir, &path)
        }]
    )?;

    info!("{}: wrote {} entries to {}", source, entries.len(), path.display());
    Ok(path)
}

/// Reads the chosen file of every source. Sources that fail to read are
/// skipped and reported back instead of failing the run.
pub fn load_sources(picks: &[SourcePick]) -> (SourceRankings, Vec<(String, String)>) {
    let mut rankings = SourceRankings::new();
    let mut skipped = vec![];

    for pick in picks {
        match read_source_csv(&pick.csv_path) {
            Ok(entries) => {
                debug!("{}: {} entries from {}", pick.name, entries.len(), pick.csv_path.display());
                rankings.insert(pick.name.clone(), entries);
            }
            Err(e) => {
                warn!("Skipping source '{}' ({}): {}", pick.name, pick.csv_path.display(), e);
                skipped.push((pick.name.clone(), e.to_string()));
            }
        }
    }

    (rankings, skipped)
}

/// Regenerates `aggregated-list.csv` of one list from the newest file of
/// each source, and logs every consumed file not yet in `about.csv`.
///
/// A list with no usable source gets a header-only aggregated file.
pub fn aggregate_list(list_dir: &Path, at: DateTime<Local>) -> Result<AggregationReport> {
    let picks = pick_sources(list_dir)?;
    let (rankings, sources_skipped) = load_sources(&picks);
    let entries = aggregate(&rankings);

    let output = list_dir.join(AGGREGATED_FILE);
    write_aggregated(&output, &entries)?;

    let log = read_about(list_dir)?;
    let consumed: Vec<SourceDescriptor> = picks
        .iter()
        .filter(|pick| rankings.contains_key(&pick.name))
        .map(|pick| (pick, relative_path(list_dir, &pick.csv_path)))
        .filter(|(_, rel)| !log.iter().any(|d| &d.generated_csv_path == rel))
        .map(|(pick, rel)| SourceDescriptor {
            source_name: pick.name.clone(),
            source_url: last_known_url(&log, &pick.name).unwrap_or_default().to_string(),
            timestamp: at.to_rfc3339(),
            generated_csv_path: rel
        })
        .collect();
    append_about(list_dir, &consumed)?;

    let report = AggregationReport {
        list: dir_name(list_dir),
        output,
        sources_used: rankings.keys().cloned().collect(),
        sources_skipped,
        entries,
        rankings
    };

    info!(
        "{}: aggregated {} games from {} sources ({} skipped)",
        report.list,
        report.entries.len(),
        report.sources_used.len(),
        report.sources_skipped.len()
    );

    Ok(report)
}

/// Aggregates every list directory under `root` that holds an `about.csv`
/// or at least one source file. A failing list doesn't stop the others.
pub fn aggregate_all(root: &Path, at: DateTime<Local>) -> Result<Vec<(String, Result<AggregationReport>)>> {
    if !root.is_dir() {
        bail!(ErrorKind::ListDirMissing(root.to_path_buf()));
    }

    let mut results = vec![];

    for list_dir in subdirs(root)? {
        let has_sources = pick_sources(&list_dir)
            .map(|picks| !picks.is_empty())
            .unwrap_or(false);

        if !has_sources && !list_dir.join(ABOUT_FILE).is_file() {
            debug!("{}: no sources, not a list", list_dir.display());
            continue;
        }

        let result = aggregate_list(&list_dir, at);
        if let Err(ref e) = result {
            warn!("{}: aggregation failed: {}", list_dir.display(), e);
        }

        results.push((dir_name(&list_dir), result));
    }

    Ok(results)
}

/// Merges the sources of every successfully aggregated list into one ranking
/// written to `<root>/aggregated-list.csv`.
///
/// Sources are told apart per list, so a source feeding two lists counts as
/// two appearances. Nothing is written when no list had any entry.
pub fn aggregate_combined(
    root: &Path,
    results: &[(String, Result<AggregationReport>)]
) -> Result<Option<CombinedReport>> {
    let mut rankings = SourceRankings::new();
    let mut lists = vec![];

    for (list, result) in results {
        let report = match result {
            Ok(report) if !report.entries.is_empty() => report,
            _ => continue
        };

        for (source, entries) in &report.rankings {
            rankings.insert(format!("{}/{}", list, source), entries.clone());
        }
        lists.push(list.clone());
    }

    if rankings.is_empty() {
        info!("No aggregated lists to combine");
        return Ok(None);
    }

    let entries = aggregate(&rankings);
    let output = root.join(AGGREGATED_FILE);
    write_aggregated(&output, &entries)?;

    info!("Combined {} lists into {} games at {}", lists.len(), entries.len(), output.display());

    Ok(Some(CombinedReport {
        output,
        lists,
        entries
    }))
}

/// `path` relative to `list_dir` with forward slashes, as recorded in
/// `about.csv`.
fn relative_path(list_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(list_dir).unwrap_or(path);

    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relative_paths_use_forward_slashes() {
        let list = Path::new("list").join("best_games_of_all_time");
        let file = list.join("ign").join("ign - 2025-01-17_20-08-18.csv");

        assert_eq!(relative_path(&list, &file), "ign/ign - 2025-01-17_20-08-18.csv");
    }
}
