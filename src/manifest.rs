//! Index of the lists a static front-end can discover without directory
//! listings: every list directory that has an aggregated output.

use crate::csv_store::{write_atomic, AGGREGATED_FILE};
use crate::data_structs::Manifest;
use crate::error::*;
use crate::list_dir::{dir_name, subdirs};
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "_manifest.json";

/// Collects the lists under `root` that contain an `aggregated-list.csv`,
/// sorted by name.
pub fn build_manifest(root: &Path, at: DateTime<Utc>) -> Result<Manifest> {
    if !root.is_dir() {
        bail!(ErrorKind::ListDirMissing(root.to_path_buf()));
    }

    let mut lists: Vec<String> = subdirs(root)?
        .into_iter()
        .filter(|dir| dir.join(AGGREGATED_FILE).is_file())
        .map(|dir| dir_name(&dir))
        .collect();
    lists.sort();

    Ok(Manifest {
        generated_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        lists
    })
}

/// Writes `manifest` as pretty JSON to `<root>/_manifest.json`.
pub fn write_manifest(root: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let path = root.join(MANIFEST_FILE);

    write_atomic(&path, |file| {
        serde_json::to_writer_pretty(&mut *file, manifest)?;
        file.write_all(b"\n")?;
        Ok(())
    })?;

    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    #[test]
    fn only_lists_with_aggregated_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for name in &["b_list", "a_list", "pending"] {
            fs::create_dir_all(root.join(name)).unwrap();
        }
        fs::write(root.join("b_list").join(AGGREGATED_FILE), "").unwrap();
        fs::write(root.join("a_list").join(AGGREGATED_FILE), "").unwrap();
        fs::write(root.join("stray.csv"), "").unwrap();

        let at = Utc.with_ymd_and_hms(2025, 1, 17, 20, 8, 18).unwrap();
        let manifest = build_manifest(root, at).unwrap();

        assert_eq!(manifest.lists, vec!["a_list".to_string(), "b_list".to_string()]);
        assert_eq!(manifest.generated_at, "2025-01-17T20:08:18.000Z");

        let path = write_manifest(root, &manifest).unwrap();
        let loaded: Manifest = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded, manifest);
    }
}
