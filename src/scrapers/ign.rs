//! IGN's "best 100 video games of all time" article.
//!
//! The list is split over several pages; each page links the next one with
//! `rel="next"`.

use super::{load_sels, ListPage, Page, SourceAdapter};

const SELECTORS_STR: &str = include_str!("../../selectors/ign.toml");

pub struct Ign;

impl SourceAdapter for Ign {
    fn name(&self) -> &'static str {
        "ign"
    }

    fn default_url(&self) -> &'static str {
        "https://www.ign.com/articles/the-best-100-video-games-of-all-time"
    }

    fn default_list(&self) -> &'static str {
        "best_games_of_all_time"
    }

    fn extract(&self, html: &str) -> Page {
        let selectors = load_sels(SELECTORS_STR);
        let page = ListPage::from(html);

        Page {
            entries: page.ranked_headings(&selectors["entry"], true),
            next_href: page.link(&selectors["next_page"])
        }
    }
}
