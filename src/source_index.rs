//! Cross-list index of sources: which lists each source contributed to,
//! according to the lists' `about.csv` logs.

use crate::about::{read_about, ABOUT_FILE};
use crate::csv_store::write_rows;
use crate::data_structs::SourceIndexRow;
use crate::error::*;
use crate::list_dir::{dir_name, subdirs};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const SOURCE_INDEX_FILE: &str = "all_sources.csv";

const SOURCE_INDEX_HEADER: [&str; 3] = ["SourceName", "Count", "Datasets"];

/// One row per source name, most widely used sources first.
pub fn build_source_index(root: &Path) -> Result<Vec<SourceIndexRow>> {
    if !root.is_dir() {
        bail!(ErrorKind::ListDirMissing(root.to_path_buf()));
    }

    let mut sources: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for list_dir in subdirs(root)? {
        if !list_dir.join(ABOUT_FILE).is_file() {
            continue;
        }

        let list = dir_name(&list_dir);
        for descriptor in read_about(&list_dir)? {
            let name = descriptor.source_name.trim();
            if !name.is_empty() {
                sources.entry(name.to_string()).or_default().insert(list.clone());
            }
        }
    }

    let mut rows: Vec<SourceIndexRow> = sources
        .into_iter()
        .map(|(source_name, lists)| SourceIndexRow {
            source_name,
            count: lists.len() as u32,
            datasets: lists.into_iter().collect::<Vec<_>>().join(";")
        })
        .collect();

    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.source_name.to_lowercase().cmp(&b.source_name.to_lowercase()))
    });

    Ok(rows)
}

pub fn write_source_index(root: &Path, rows: &[SourceIndexRow]) -> Result<PathBuf> {
    let path = root.join(SOURCE_INDEX_FILE);
    write_rows(&path, &SOURCE_INDEX_HEADER, rows)?;
    Ok(path)
}
