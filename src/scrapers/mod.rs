//! Source adapters: one per website, each turning that site's ranking page
//! into an ordered list of `GameEntry`.
//!
//! Adapters only know how to read a page (`SourceAdapter::extract`);
//! downloading and following pagination is shared by all of them.

pub mod digitaltrends;
pub mod gamerant;
pub mod ign;

use crate::data_structs::GameEntry;
use crate::error::*;
#[cfg(feature = "http-client")]
use crate::http_client::Downloader;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Hard stop for pagination, in case a site links pages in a loop we don't
/// catch by URL.
pub const MAX_PAGES: usize = 50;

fn sel<S: AsRef<str>>(sel: S) -> Selector {
    Selector::parse(sel.as_ref()).unwrap()
}

/// Parses a TOML table of `name = "css selector"` pairs.
///
/// Only ever called on the selector files embedded in the crate.
fn load_sels(toml_str: &str) -> HashMap<String, Selector> {
    let table: HashMap<String, String> = toml::from_str(toml_str).unwrap();

    table
        .into_iter()
        .map(|(name, selector)| (name, sel(selector)))
        .collect()
}

fn ranked_heading_re(require_dot: bool) -> &'static Regex {
    static STRICT: OnceLock<Regex> = OnceLock::new();
    static LOOSE: OnceLock<Regex> = OnceLock::new();

    if require_dot {
        STRICT.get_or_init(|| Regex::new(r"^(?s)([0-9]+)\.\s*(.+)$").unwrap())
    } else {
        LOOSE.get_or_init(|| Regex::new(r"^(?s)([0-9]+)\.?\s*(.+)$").unwrap())
    }
}

/// `"12. Chrono Trigger"` -> `(12, "Chrono Trigger")`
///
/// With `require_dot` unset the dot after the number is optional.
pub fn parse_ranked_heading(text: &str, require_dot: bool) -> Option<(u32, String)> {
    let caps = ranked_heading_re(require_dot).captures(text.trim())?;
    let position: u32 = caps.get(1)?.as_str().parse().ok()?;
    let title = caps.get(2)?.as_str().trim();

    if position == 0 || title.is_empty() {
        None
    } else {
        Some((position, title.to_string()))
    }
}

/// All text under an element with whitespace runs collapsed to one space.
fn element_text(elem: &ElementRef) -> String {
    elem.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// What an adapter found on one page.
#[derive(Debug, Default, PartialEq)]
pub struct Page {
    pub entries: Vec<GameEntry>,
    /// Link to the next page of the same list, possibly relative.
    pub next_href: Option<String>
}

/// A parsed HTML page of a ranking article.
pub struct ListPage {
    doc: Html
}

impl From<String> for ListPage {
    fn from(html: String) -> Self {
        ListPage {
            doc: Html::parse_document(&html)
        }
    }
}

impl<'a> From<&'a str> for ListPage {
    fn from(html: &'a str) -> Self {
        ListPage {
            doc: Html::parse_document(html)
        }
    }
}

impl ListPage {
    /// Every element matched by `selector` whose text reads `N. Title`, in
    /// document order.
    pub fn ranked_headings(&self, selector: &Selector, require_dot: bool) -> Vec<GameEntry> {
        let mut entries = vec![];

        for elem in self.doc.select(selector) {
            if_chain! {
                let text = element_text(&elem);
                if let Some((position, title)) = parse_ranked_heading(&text, require_dot);

            then {
                entries.push(GameEntry::new(position, title));
            }}
        }

        entries
    }

    /// The `href` of the first element matched by `selector`.
    pub fn link(&self, selector: &Selector) -> Option<String> {
        self.doc
            .select(selector)
            .filter_map(|elem| elem.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(String::from)
    }
}

/// One website's ranking list.
pub trait SourceAdapter {
    /// Name the source is registered and stored under.
    fn name(&self) -> &'static str;

    /// The ranking article scraped when no URL is given.
    fn default_url(&self) -> &'static str;

    /// The list this source contributes to by default.
    fn default_list(&self) -> &'static str;

    /// Extract the ranked entries of one page.
    fn extract(&self, html: &str) -> Page;

    /// Download `url` and every page after it and collect their entries.
    #[cfg(feature = "http-client")]
    fn fetch(&self, dl: &Downloader, url: &str) -> Result<Vec<GameEntry>> {
        let mut entries = vec![];
        let mut visited = HashSet::new();
        let mut next = Some(url.to_string());

        while let Some(page_url) = next.take() {
            if !visited.insert(page_url.clone()) || visited.len() > MAX_PAGES {
                break;
            }

            if visited.len() > 1 {
                dl.pause_between_pages();
            }

            let html = dl.get_string(&page_url)?;
            let page = self.extract(&html);
            info!("{}: {} entries on {}", self.name(), page.entries.len(), page_url);

            entries.extend(page.entries);
            next = match page.next_href {
                Some(href) => Some(resolve_href(&page_url, &href)?),
                None => None
            };
        }

        finish_entries(self.name(), entries)
    }
}

#[cfg(feature = "http-client")]
fn resolve_href(base: &str, href: &str) -> Result<String> {
    reqwest::Url::parse(base)
        .and_then(|base| base.join(href))
        .map(String::from)
        .map_err(|_| ErrorKind::ExtractionError(format!("the next page link '{}'", href)).into())
}

/// Orders entries by position and drops repeated positions, keeping the
/// first one seen. An empty result is an error.
pub fn finish_entries(source: &str, mut entries: Vec<GameEntry>) -> Result<Vec<GameEntry>> {
    entries.sort_by_key(|e| e.position);

    let mut seen = HashSet::new();
    entries.retain(|e| {
        let first = seen.insert(e.position);
        if !first {
            warn!("{}: dropping repeated position {} ('{}')", source, e.position, e.title);
        }
        first
    });

    if entries.is_empty() {
        bail!(ErrorKind::NoEntries(source.to_string()));
    }

    Ok(entries)
}

/// Every adapter this crate ships.
pub fn registry() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(digitaltrends::DigitalTrends),
        Box::new(gamerant::Gamerant),
        Box::new(ign::Ign)
    ]
}

/// Looks an adapter up by name, ignoring case.
pub fn find_adapter(name: &str) -> Result<Box<dyn SourceAdapter>> {
    match registry().into_iter().find(|a| a.name().eq_ignore_ascii_case(name.trim())) {
        Some(adapter) => Ok(adapter),
        None => bail!(ErrorKind::UnknownSource(name.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ranked_headings() {
        assert_eq!(parse_ranked_heading("1. Zelda", true), Some((1, "Zelda".into())));
        assert_eq!(parse_ranked_heading(" 10.Half-Life 2 ", true), Some((10, "Half-Life 2".into())));
        assert_eq!(parse_ranked_heading("10 Half-Life 2", true), None);
        assert_eq!(parse_ranked_heading("10 Half-Life 2", false), Some((10, "Half-Life 2".into())));
        assert_eq!(parse_ranked_heading("0. Nothing", true), None);
        assert_eq!(parse_ranked_heading("Honorable mentions", false), None);
        assert_eq!(parse_ranked_heading("٣. Doom", true), None);
    }

    #[test]
    fn heading_text_spans_markup() {
        let page = ListPage::from("<h2><span>3.</span> <a href='/x'>Super   Metroid</a></h2><h2>About</h2>");
        let entries = page.ranked_headings(&sel("h2"), true);

        assert_eq!(entries, vec![GameEntry::new(3, "Super Metroid")]);
    }

    #[test]
    fn finish_sorts_and_dedupes() {
        let entries = vec![
            GameEntry::new(2, "Mario"),
            GameEntry::new(1, "Zelda"),
            GameEntry::new(2, "Mario again")
        ];
        let finished = finish_entries("test", entries).unwrap();

        assert_eq!(finished, vec![GameEntry::new(1, "Zelda"), GameEntry::new(2, "Mario")]);
        assert_eq!(
            finish_entries("test", vec![]).unwrap_err().category(),
            ErrorCategory::Parse
        );
    }

    #[test]
    fn registry_lookup() {
        assert_eq!(find_adapter("IGN").unwrap().name(), "ign");
        assert!(find_adapter("metacritic").is_err());

        let names: Vec<_> = registry().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["digitaltrends", "gamerant", "ign"]);
    }

    #[cfg(feature = "http-client")]
    #[test]
    fn relative_next_links() {
        assert_eq!(
            resolve_href("https://www.ign.com/articles/best-games", "/articles/best-games?page=2").unwrap(),
            "https://www.ign.com/articles/best-games?page=2"
        );
        assert_eq!(
            resolve_href("https://www.ign.com/a", "https://cdn.ign.com/b").unwrap(),
            "https://cdn.ign.com/b"
        );
    }
}
