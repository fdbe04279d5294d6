//! Moves flat `<source> - <timestamp>.csv` files of a list into one subfolder
//! per source, keeping `about.csv` and `aggregated-list.csv` at the top.

use crate::error::*;
use crate::list_dir::{is_reserved_file, parse_source_from_filename, sanitize_dirname, subdirs};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct FileMove {
    pub from: PathBuf,
    pub to: PathBuf
}

/// `name.csv`, then `name (1).csv`, `name (2).csv`, ... whichever is free.
fn unique_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }

    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|s| format!(".{}", s.to_string_lossy())).unwrap_or_default();

    (1..)
        .map(|i| path.with_file_name(format!("{} ({}){}", stem, i, ext)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}

/// Moves the source files of one list. With `dry_run` nothing is touched and
/// the moves that would happen are returned.
pub fn organize_list(list_dir: &Path, dry_run: bool) -> Result<Vec<FileMove>> {
    let mut moves = vec![];
    let mut files = vec![];

    for entry in fs::read_dir(list_dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    for from in files {
        let name = match from.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue
        };

        if !name.to_lowercase().ends_with(".csv") || is_reserved_file(&name) {
            continue;
        }

        let source = match parse_source_from_filename(&name) {
            Some(source) => source,
            None => {
                warn!("Skipping '{}': can't tell which source it belongs to", from.display());
                continue;
            }
        };

        let target_dir = list_dir.join(sanitize_dirname(source));
        let to = unique_path(target_dir.join(&name));

        if dry_run {
            info!("Would move {} -> {}", from.display(), to.display());
        } else {
            fs::create_dir_all(&target_dir)?;
            fs::rename(&from, &to)?;
            info!("Moved {} -> {}", from.display(), to.display());
        }

        moves.push(FileMove { from, to });
    }

    Ok(moves)
}

/// Runs `organize_list` for every list directory under `root`.
pub fn organize_root(root: &Path, dry_run: bool) -> Result<Vec<FileMove>> {
    if !root.is_dir() {
        bail!(ErrorKind::ListDirMissing(root.to_path_buf()));
    }

    let mut moves = vec![];

    for list_dir in subdirs(root)? {
        moves.extend(organize_list(&list_dir, dry_run)?);
    }

    Ok(moves)
}
