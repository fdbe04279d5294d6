//! Scrapes "best games" rankings from editorial websites into per-source CSV
//! files and merges the sources of each list into one aggregated ranking.
//!
//! A list lives in its own directory under a root (`list/` by default):
//!
//! ```text
//! list/best_games_of_all_time/
//!     about.csv                 log of every source file produced or consumed
//!     aggregated-list.csv       the merged ranking
//!     ign/ign - 2025-01-17_20-08-18.csv
//!     digitaltrends/digitaltrends - 2025-01-18_09-30-00.csv
//! ```

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate if_chain;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod about;
pub mod aggregator;
pub mod config;
pub mod covers;
pub mod csv_store;
pub mod data_structs;
pub mod error;
pub mod extractor;
#[cfg(feature = "http-client")]
pub mod http_client;
pub mod list_dir;
pub mod manifest;
pub mod organize;
pub mod pipeline;
pub mod scrapers;
pub mod source_index;
pub mod title;

pub use crate::aggregator::{aggregate, SourceRankings};
pub use crate::data_structs::{AggregatedEntry, GameEntry, Manifest, SourceDescriptor};
pub use crate::error::{Error, ErrorCategory, ErrorKind, Result};
