//! Command-line arguments of `gamelists`.

use clap::{Parser, Subcommand, ValueEnum};
use gamelist_scraper::covers::CoverSize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gamelists")]
#[command(version)]
#[command(about = "Scrape \"best games\" rankings and aggregate them per list", long_about = None)]
pub struct Cli {
    /// Directory holding one subdirectory per list (default: $GAMELISTS_ROOT or ./list)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// TOML file with HTTP settings and a default root
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered source adapters
    Sources,

    /// Scrape one source into its list directory
    Scrape {
        /// Source adapter name (see `sources`)
        source: String,

        /// List to store the result in (default: the source's usual list)
        #[arg(long, value_name = "NAME")]
        list: Option<String>,

        /// Page to scrape instead of the source's usual article
        #[arg(long, value_name = "URL")]
        url: Option<String>
    },

    /// Regenerate aggregated-list.csv of one list
    Aggregate {
        /// List directory name under the root
        list: String
    },

    /// Regenerate aggregated-list.csv of every list under the root
    AggregateAll {
        /// Also merge every list into <root>/aggregated-list.csv
        #[arg(long)]
        combined: bool
    },

    /// Write _manifest.json with every list that has an aggregated output
    Manifest,

    /// Write all_sources.csv: which lists each source contributes to
    SourceIndex,

    /// Move flat source CSVs into one subfolder per source
    Organize {
        /// Only print what would be moved
        #[arg(long)]
        dry_run: bool
    },

    /// Download IGDB cover images into the shared covers folder
    Covers {
        /// Only this list (default: every list under the root)
        #[arg(long, value_name = "NAME")]
        list: Option<String>,

        #[arg(long, value_enum, default_value_t = SizeArg::Both)]
        size: SizeArg,

        /// Download again even when the file exists
        #[arg(long)]
        force: bool,

        /// Where covers are stored (default: `covers` next to the root)
        #[arg(long, value_name = "DIR")]
        covers_dir: Option<PathBuf>
    },

    /// Extract a ranking from any page through the chat-completions API
    Extract {
        /// Page holding the ranking
        url: String,

        /// List to store the result in
        #[arg(long, value_name = "NAME")]
        list: Option<String>,

        /// Source name to store the result under
        #[arg(long, value_name = "NAME", default_value = "extracted")]
        source: String
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeArg {
    Small,
    Big,
    Both
}

impl SizeArg {
    pub fn sizes(self) -> Vec<CoverSize> {
        match self {
            SizeArg::Small => vec![CoverSize::Small],
            SizeArg::Big => vec![CoverSize::Big],
            SizeArg::Both => vec![CoverSize::Small, CoverSize::Big]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scrape() {
        let cli = Cli::parse_from(["gamelists", "--root", "data", "scrape", "ign", "--list", "best"]);

        assert_eq!(cli.root, Some(PathBuf::from("data")));
        match cli.command {
            Command::Scrape { source, list, url } => {
                assert_eq!(source, "ign");
                assert_eq!(list.as_deref(), Some("best"));
                assert_eq!(url, None);
            }
            other => panic!("unexpected command: {:?}", other)
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["gamelists", "organize", "--dry-run", "--root", "data"]);

        assert_eq!(cli.root, Some(PathBuf::from("data")));
        assert!(matches!(cli.command, Command::Organize { dry_run: true }));
    }

    #[test]
    fn combined_is_opt_in() {
        let cli = Cli::parse_from(["gamelists", "aggregate-all"]);
        assert!(matches!(cli.command, Command::AggregateAll { combined: false }));

        let cli = Cli::parse_from(["gamelists", "aggregate-all", "--combined"]);
        assert!(matches!(cli.command, Command::AggregateAll { combined: true }));
    }

    #[test]
    fn cover_sizes() {
        let cli = Cli::parse_from(["gamelists", "covers", "--size", "big", "--list", "best_rpgs"]);

        match cli.command {
            Command::Covers { list, size, force, covers_dir } => {
                assert_eq!(list.as_deref(), Some("best_rpgs"));
                assert_eq!(size.sizes(), vec![CoverSize::Big]);
                assert!(!force);
                assert_eq!(covers_dir, None);
            }
            other => panic!("unexpected command: {:?}", other)
        }

        assert_eq!(SizeArg::Both.sizes(), vec![CoverSize::Small, CoverSize::Big]);
    }
}
