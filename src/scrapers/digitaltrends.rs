//! Digital Trends' "50 best games of all time" article, a single page.

use super::{load_sels, ListPage, Page, SourceAdapter};

const SELECTORS_STR: &str = include_str!("../../selectors/digitaltrends.toml");

pub struct DigitalTrends;

impl SourceAdapter for DigitalTrends {
    fn name(&self) -> &'static str {
        "digitaltrends"
    }

    fn default_url(&self) -> &'static str {
        "https://www.digitaltrends.com/gaming/50-best-games-of-all-time/"
    }

    fn default_list(&self) -> &'static str {
        "best_games_of_all_time"
    }

    fn extract(&self, html: &str) -> Page {
        let selectors = load_sels(SELECTORS_STR);

        Page {
            entries: ListPage::from(html).ranked_headings(&selectors["entry"], true),
            next_href: None
        }
    }
}
