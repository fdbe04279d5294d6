//! Merges the per-source rankings of one list into a single ranking.
//!
//! Every entry contributes a score to its game: the explicit `Score` when
//! the source provides one, otherwise `count - position + 1` where `count` is
//! the number of entries the source listed. Games are matched across sources
//! by canonical title (see `title::canonical_title`) and ranked by total
//! score, then by how many sources listed them, then by canonical title.

use crate::data_structs::{AggregatedEntry, GameEntry};
use crate::title::{canonical_title, has_year_suffix, release_year};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Per-source rankings of one list, keyed by source name.
pub type SourceRankings = BTreeMap<String, Vec<GameEntry>>;

/// The score an entry contributes to its game.
///
/// Positional scores aren't clamped: in a source with gaps in its positions
/// an entry ranked below `count` scores zero or less.
#[inline]
pub fn derived_score(entry: &GameEntry, source_count: usize) -> f64 {
    match entry.score {
        Some(score) => score,
        None => source_count as f64 - f64::from(entry.position) + 1.0
    }
}

#[derive(Debug)]
struct Tally<'a> {
    display_title: &'a str,
    release_year: Option<&'a str>,
    total_score: f64,
    sources: BTreeSet<&'a str>
}

/// Combines all sources of a list into one ranking with dense positions
/// `1..=K`, one entry per canonical title.
///
/// Duplicate titles within one source add up their scores but count as a
/// single appearance. The result doesn't depend on the order sources were
/// collected in: the first-seen display title is taken in source-name order.
pub fn aggregate(sources: &SourceRankings) -> Vec<AggregatedEntry> {
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    for (source_name, entries) in sources {
        let count = entries.len();
        let mut ordered: Vec<&GameEntry> = entries.iter().collect();
        ordered.sort_by_key(|e| e.position);

        for entry in ordered {
            let canonical = canonical_title(&entry.title);

            if canonical.is_empty() {
                warn!("Skipping entry {} of '{}': empty title", entry.position, source_name);
                continue;
            }

            let tally = tallies.entry(canonical).or_insert_with(|| Tally {
                display_title: entry.title.trim(),
                release_year: None,
                total_score: 0.0,
                sources: BTreeSet::new()
            });

            tally.total_score += derived_score(entry, count);
            tally.sources.insert(source_name.as_str());

            if tally.release_year.is_none() {
                tally.release_year = entry.release_date.as_deref().and_then(release_year);
            }
        }
    }

    let mut aggregated: Vec<AggregatedEntry> = tallies
        .into_iter()
        .map(|(canonical, tally)| {
            let title = match tally.release_year {
                Some(year) if !has_year_suffix(tally.display_title) => {
                    format!("{} ({})", tally.display_title, year)
                }
                _ => tally.display_title.to_string()
            };

            AggregatedEntry {
                position: 0,
                title,
                total_score: tally.total_score,
                lists_appeared: tally.sources.len() as u32,
                canonical_title: canonical
            }
        })
        .collect();

    aggregated.sort_by(rank_order);

    for (i, entry) in aggregated.iter_mut().enumerate() {
        entry.position = i as u32 + 1;
    }

    aggregated
}

/// Total score descending, then appearances descending, then canonical title.
fn rank_order(a: &AggregatedEntry, b: &AggregatedEntry) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| b.lists_appeared.cmp(&a.lists_appeared))
        .then_with(|| a.canonical_title.cmp(&b.canonical_title))
}

#[cfg(test)]
mod test {
    use super::*;

    fn source(titles: &[&str]) -> Vec<GameEntry> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| GameEntry::new(i as u32 + 1, *t))
            .collect()
    }

    fn two_sources() -> SourceRankings {
        let mut sources = SourceRankings::new();
        sources.insert("a".into(), source(&["Zelda", "Mario"]));
        sources.insert("b".into(), source(&["Mario", "Chrono Trigger (1995)"]));
        sources
    }

    #[test]
    fn merges_two_sources() {
        let result = aggregate(&two_sources());
        let rows: Vec<_> = result
            .iter()
            .map(|e| (e.position, e.canonical_title.as_str(), e.total_score, e.lists_appeared))
            .collect();

        assert_eq!(
            rows,
            vec![
                (1, "Mario", 3.0, 2),
                (2, "Zelda", 2.0, 1),
                (3, "Chrono Trigger", 1.0, 1)
            ]
        );
        // The display title keeps the form the source used
        assert_eq!(result[2].title, "Chrono Trigger (1995)");
    }

    #[test]
    fn year_suffix_joins_titles() {
        let mut sources = SourceRankings::new();
        sources.insert("a".into(), source(&["Chrono Trigger (1995)", "Doom"]));
        sources.insert("b".into(), source(&["Chrono Trigger"]));
        let result = aggregate(&sources);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].canonical_title, "Chrono Trigger");
        assert_eq!(result[0].title, "Chrono Trigger (1995)");
        assert_eq!(result[0].total_score, 3.0);
        assert_eq!(result[0].lists_appeared, 2);
    }

    #[test]
    fn explicit_scores_win() {
        let mut sources = SourceRankings::new();
        sources.insert(
            "a".into(),
            vec![
                GameEntry::new(1, "Zelda").with_score(10.0),
                GameEntry::new(2, "Mario").with_score(20.5)
            ]
        );
        let result = aggregate(&sources);

        assert_eq!(result[0].canonical_title, "Mario");
        assert_eq!(result[0].total_score, 20.5);
        assert_eq!(result[1].total_score, 10.0);
    }

    #[test]
    fn ties_break_on_appearances_then_title() {
        let mut sources = SourceRankings::new();
        // Beta: 2 from one list. Alpha: 1 + 1 from two lists. Gamma: 2 from one list.
        sources.insert("a".into(), source(&["Gamma", "Alpha"]));
        sources.insert("b".into(), source(&["Beta", "Alpha"]));
        let result = aggregate(&sources);
        let titles: Vec<_> = result.iter().map(|e| e.canonical_title.as_str()).collect();

        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(result[0].lists_appeared, 2);
    }

    #[test]
    fn duplicate_within_source_counts_once() {
        let mut sources = SourceRankings::new();
        sources.insert("a".into(), source(&["Tetris", "Doom", "Tetris (1984)"]));
        let result = aggregate(&sources);

        assert_eq!(result[0].canonical_title, "Tetris");
        assert_eq!(result[0].total_score, 3.0 + 1.0);
        assert_eq!(result[0].lists_appeared, 1);
        assert_eq!(result[0].title, "Tetris");
    }

    #[test]
    fn release_year_appended_to_display_title() {
        let mut sources = SourceRankings::new();
        sources.insert("a".into(), vec![GameEntry::new(1, "Prey").with_release_date("2017-05-05")]);
        sources.insert("b".into(), vec![GameEntry::new(1, "Doom (1993)").with_release_date("2016-05-13")]);
        let result = aggregate(&sources);
        let titles: Vec<_> = result.iter().map(|e| e.title.as_str()).collect();

        assert_eq!(titles, vec!["Doom (1993)", "Prey (2017)"]);
    }

    #[test]
    fn dense_positions_and_score_sums() {
        let mut sources = SourceRankings::new();
        sources.insert("a".into(), source(&["A", "B", "C", "D"]));
        sources.insert("b".into(), source(&["D", "E", "A"]));
        sources.insert("c".into(), vec![GameEntry::new(3, "F"), GameEntry::new(7, "B")]);
        let result = aggregate(&sources);

        let positions: Vec<_> = result.iter().map(|e| e.position).collect();
        assert_eq!(positions, (1..=6).collect::<Vec<u32>>());

        let expected_total: f64 = sources
            .values()
            .flat_map(|entries| entries.iter().map(move |e| derived_score(e, entries.len())))
            .sum();
        let actual_total: f64 = result.iter().map(|e| e.total_score).sum();
        assert_eq!(actual_total, expected_total);

        // "c" lists 2 entries at positions 3 and 7
        let gapped = &sources["c"];
        assert_eq!(derived_score(&gapped[0], 2), 0.0);
        assert_eq!(derived_score(&gapped[1], 2), -4.0);

        let total_of = |title: &str| result.iter().find(|e| e.title == title).unwrap().total_score;
        assert_eq!(total_of("F"), 0.0);
        assert_eq!(total_of("B"), -1.0);
        assert_eq!(result.last().unwrap().title, "B");
    }

    #[test]
    fn independent_of_source_insertion_order() {
        let forward = aggregate(&two_sources());

        let mut reversed = SourceRankings::new();
        reversed.insert("b".into(), source(&["Mario", "Chrono Trigger (1995)"]));
        reversed.insert("a".into(), source(&["Zelda", "Mario"]));

        assert_eq!(forward, aggregate(&reversed));
    }

    #[test]
    fn empty_input() {
        assert!(aggregate(&SourceRankings::new()).is_empty());
    }
}
