//! IGDB cover images for the games of every list.
//!
//! Covers are keyed by their IGDB image id (the `CoverImageId` column of the
//! per-source files) and kept in one folder shared by all lists, so a game
//! listed in several lists is only downloaded once.

use crate::csv_store::read_source_csv;
#[cfg(feature = "http-client")]
use crate::csv_store::write_atomic;
use crate::error::*;
#[cfg(feature = "http-client")]
use crate::http_client::Downloader;
use crate::list_dir::pick_sources;
use crate::title::canonical_title;
use std::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "http-client")]
use std::io::Write;
use std::path::{Path, PathBuf};

pub const IGDB_IMAGE_BASE: &str = "https://images.igdb.com/igdb/image/upload";

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CoverSize {
    Small,
    Big
}

impl CoverSize {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverSize::Small => "small",
            CoverSize::Big => "big"
        }
    }

    /// IGDB's name for the image variant.
    fn variant(self) -> &'static str {
        match self {
            CoverSize::Small => "t_cover_small",
            CoverSize::Big => "t_cover_big"
        }
    }
}

#[inline]
pub fn cover_url(code: &str, size: CoverSize) -> String {
    format!("{}/{}/{}.jpg", IGDB_IMAGE_BASE, size.variant(), code)
}

/// `co1abc` -> `co1abc_big.jpg`
#[inline]
pub fn cover_file_name(code: &str, size: CoverSize) -> String {
    format!("{}_{}.jpg", code, size.as_str())
}

/// Canonical title to cover id, from the newest file of each source of a
/// list. The first source (in name order) naming a cover for a game wins.
pub fn cover_codes(list_dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut codes = BTreeMap::new();

    for pick in pick_sources(list_dir)? {
        let entries = match read_source_csv(&pick.csv_path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping covers of '{}' ({}): {}", pick.name, pick.csv_path.display(), e);
                continue;
            }
        };

        for entry in entries {
            if_chain! {
                if let Some(code) = entry.cover_image_id;
                let title = canonical_title(&entry.title);
                if !title.is_empty();

            then {
                codes.entry(title).or_insert(code);
            }}
        }
    }

    Ok(codes)
}

/// One cover file to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverTask {
    pub url: String,
    pub dest: PathBuf
}

/// Tasks for every code and size, skipping files already present in
/// `covers_dir` unless `force` is set. Returns the tasks and the number of
/// files skipped.
pub fn plan_downloads<'a, I>(codes: I, sizes: &[CoverSize], covers_dir: &Path, force: bool) -> (Vec<CoverTask>, usize)
    where I: IntoIterator<Item = &'a str> {

    let unique: BTreeSet<&str> = codes.into_iter().map(str::trim).filter(|c| !c.is_empty()).collect();
    let mut tasks = vec![];
    let mut skipped = 0;

    for code in unique {
        for &size in sizes {
            let dest = covers_dir.join(cover_file_name(code, size));

            if dest.exists() && !force {
                skipped += 1;
                continue;
            }

            tasks.push(CoverTask {
                url: cover_url(code, size),
                dest
            });
        }
    }

    (tasks, skipped)
}

/// Counts of one cover run.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CoverReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize
}

/// Downloads the covers of `lists` into `covers_dir`. A cover that fails to
/// download is logged and counted, and doesn't stop the run.
#[cfg(feature = "http-client")]
pub fn download_covers(
    dl: &Downloader,
    lists: &[PathBuf],
    sizes: &[CoverSize],
    covers_dir: &Path,
    force: bool
) -> Result<CoverReport> {
    let mut codes = BTreeSet::new();

    for list_dir in lists {
        let list_codes = cover_codes(list_dir)?;
        debug!("{}: {} covers", list_dir.display(), list_codes.len());
        codes.extend(list_codes.into_values());
    }

    let (tasks, skipped) = plan_downloads(codes.iter().map(String::as_str), sizes, covers_dir, force);
    let mut report = CoverReport {
        skipped,
        ..Default::default()
    };

    for task in tasks {
        let result = dl
            .get_bytes(&task.url)
            .and_then(|bytes| write_atomic(&task.dest, |file| Ok(file.write_all(&bytes)?)));

        match result {
            Ok(()) => report.downloaded += 1,
            Err(e) => {
                warn!("Failed to download {}: {}", task.url, e);
                report.failed += 1;
            }
        }
    }

    info!(
        "Covers: {} downloaded, {} already present, {} failed",
        report.downloaded, report.skipped, report.failed
    );

    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn urls_and_file_names() {
        assert_eq!(
            cover_url("co1abc", CoverSize::Big),
            "https://images.igdb.com/igdb/image/upload/t_cover_big/co1abc.jpg"
        );
        assert_eq!(cover_file_name("co1abc", CoverSize::Small), "co1abc_small.jpg");
    }

    #[test]
    fn codes_from_newest_source_files() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path();
        write(
            &list.join("ign/ign - 2024-01-01_00-00-00.csv"),
            "Position,Title,CoverImageId\n1,Zelda,co_old\n"
        );
        write(
            &list.join("ign/ign - 2025-01-01_00-00-00.csv"),
            "Position,Title,CoverImageId\n1,Zelda (1986),co_zelda\n2,Mario,\n"
        );
        write(
            &list.join("rps/rps - 2025-01-01_00-00-00.csv"),
            "Position,Title,CoverImageId\n1,Zelda,co_other\n2,Doom,co_doom\n"
        );

        let codes = cover_codes(list).unwrap();
        let flat: Vec<_> = codes.iter().map(|(t, c)| (t.as_str(), c.as_str())).collect();

        assert_eq!(flat, vec![("Doom", "co_doom"), ("Zelda", "co_zelda")]);
    }

    #[test]
    fn existing_files_are_skipped_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let covers = dir.path();
        fs::write(covers.join("co1_big.jpg"), "jpg").unwrap();
        let sizes = [CoverSize::Small, CoverSize::Big];

        let (tasks, skipped) = plan_downloads(vec!["co1", "co2", "co1", " "], &sizes, covers, false);
        let files: Vec<_> = tasks.iter().map(|t| t.dest.file_name().unwrap().to_str().unwrap()).collect();

        assert_eq!(files, vec!["co1_small.jpg", "co2_small.jpg", "co2_big.jpg"]);
        assert_eq!(skipped, 1);

        let (tasks, skipped) = plan_downloads(vec!["co1"], &sizes, covers, true);
        assert_eq!(tasks.len(), 2);
        assert_eq!(skipped, 0);
    }
}
