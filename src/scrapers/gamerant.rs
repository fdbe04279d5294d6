//! Gamerant's "best walking simulators" article.
//!
//! Headings are numbered with or without a dot and often end in the
//! release year, which is dropped from the title.

use super::{load_sels, ListPage, Page, SourceAdapter};
use crate::title::canonical_title;

const SELECTORS_STR: &str = include_str!("../../selectors/gamerant.toml");

pub struct Gamerant;

impl SourceAdapter for Gamerant {
    fn name(&self) -> &'static str {
        "gamerant"
    }

    fn default_url(&self) -> &'static str {
        "https://gamerant.com/best-walking-simulators/"
    }

    fn default_list(&self) -> &'static str {
        "best_walking_simulator_games_of_all_time"
    }

    fn extract(&self, html: &str) -> Page {
        let selectors = load_sels(SELECTORS_STR);
        let mut entries = ListPage::from(html).ranked_headings(&selectors["entry"], false);

        for entry in entries.iter_mut() {
            entry.title = canonical_title(&entry.title);
        }
        entries.retain(|e| !e.title.is_empty());

        Page {
            entries,
            next_href: None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_structs::GameEntry;
    use crate::scrapers::finish_entries;

    #[test]
    fn strips_years_and_accepts_missing_dots() {
        let html = r#"
            <h2>Best Walking Simulators</h2>
            <h2>2 What Remains of Edith Finch (2017)</h2>
            <h3>1. Firewatch <span>(2016)</span></h3>
            <h3>3. (2013)</h3>"#;
        let page = Gamerant.extract(html);

        assert_eq!(
            page.entries,
            vec![
                GameEntry::new(2, "What Remains of Edith Finch"),
                GameEntry::new(1, "Firewatch")
            ]
        );
    }

    #[test]
    fn empty_page_is_an_error() {
        let page = Gamerant.extract("<h2>Nothing ranked here</h2>");
        assert!(finish_entries(Gamerant.name(), page.entries).is_err());
    }
}
