#[macro_use]
extern crate error_chain;

use chrono::{Local, Utc};
use clap::Parser;
use gamelist_scraper::config::Settings;
use gamelist_scraper::error::*;
use gamelist_scraper::http_client::Downloader;
use gamelist_scraper::list_dir::subdirs;
use gamelist_scraper::{covers, extractor, manifest, organize, pipeline, scrapers, source_index};
use std::process;

mod cli;

use cli::{Cli, Command};

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Warn)
        .filter_module("selectors", log::LevelFilter::Warn)
        .format_timestamp_secs()
        .format_target(false)
        .init();
}

fn main() {
    init_logger();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error ({}): {}", e.category().as_str(), e);
        for cause in e.iter().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref(), cli.root)?;

    match cli.command {
        Command::Sources => {
            let adapters = scrapers::registry();
            for adapter in &adapters {
                println!("{:<16} {:<44} {}", adapter.name(), adapter.default_list(), adapter.default_url());
            }
            println!("{} sources", adapters.len());
        }

        Command::Scrape { source, list, url } => {
            let adapter = scrapers::find_adapter(&source)?;
            let list = list.unwrap_or_else(|| adapter.default_list().to_string());
            let url = url.unwrap_or_else(|| adapter.default_url().to_string());

            let dl = Downloader::new(settings.http.clone())?;
            let entries = adapter
                .fetch(&dl, &url)
                .chain_err(|| format!("scraping {} failed", adapter.name()))?;
            let count = entries.len();
            let path = pipeline::record_scrape(&settings.list_dir(&list), adapter.name(), &url, entries, Local::now())?;

            println!("Wrote {} entries to {}", count, path.display());
        }

        Command::Aggregate { list } => {
            let report = pipeline::aggregate_list(&settings.list_dir(&list), Local::now())?;

            println!(
                "Aggregated {} games from {} sources into {}",
                report.entries.len(),
                report.sources_used.len(),
                report.output.display()
            );
        }

        Command::AggregateAll { combined } => {
            let results = pipeline::aggregate_all(&settings.root, Local::now())?;
            let total = results.len();
            let mut failed = 0;

            for (list, result) in &results {
                match result {
                    Ok(report) => println!("{}: {} games", list, report.entries.len()),
                    Err(e) => {
                        failed += 1;
                        println!("{}: failed: {}", list, e);
                    }
                }
            }

            if combined {
                match pipeline::aggregate_combined(&settings.root, &results)? {
                    Some(report) => println!(
                        "Combined {} games from {} lists into {}",
                        report.entries.len(),
                        report.lists.len(),
                        report.output.display()
                    ),
                    None => println!("Nothing to combine")
                }
            }

            if failed > 0 {
                bail!("{} of {} lists failed to aggregate", failed, total);
            }
            println!("Aggregated {} lists", total);
        }

        Command::Manifest => {
            let manifest = manifest::build_manifest(&settings.root, Utc::now())?;
            let path = manifest::write_manifest(&settings.root, &manifest)?;

            println!("Manifest written to {} with {} lists", path.display(), manifest.lists.len());
        }

        Command::SourceIndex => {
            let rows = source_index::build_source_index(&settings.root)?;
            let path = source_index::write_source_index(&settings.root, &rows)?;

            println!("Written {} with {} sources", path.display(), rows.len());
        }

        Command::Organize { dry_run } => {
            let moves = organize::organize_root(&settings.root, dry_run)?;

            for m in &moves {
                println!("{} -> {}", m.from.display(), m.to.display());
            }
            let verb = if dry_run { "Would move" } else { "Moved" };
            println!("{} {} files", verb, moves.len());
        }

        Command::Covers { list, size, force, covers_dir } => {
            let lists = match list {
                Some(list) => {
                    let list_dir = settings.list_dir(&list);
                    if !list_dir.is_dir() {
                        bail!(ErrorKind::ListDirMissing(list_dir));
                    }
                    vec![list_dir]
                }
                None => subdirs(&settings.root)
                    .chain_err(|| ErrorKind::ListDirMissing(settings.root.clone()))?
            };
            let covers_dir = covers_dir.unwrap_or_else(|| settings.covers_dir());

            let dl = Downloader::new(settings.http.clone())?;
            let report = covers::download_covers(&dl, &lists, &size.sizes(), &covers_dir, force)?;

            println!(
                "Covers in {}: downloaded {}, skipped {}, failed {}",
                covers_dir.display(),
                report.downloaded,
                report.skipped,
                report.failed
            );
        }

        Command::Extract { url, list, source } => {
            let list = match list {
                Some(list) => list,
                None => bail!(ErrorKind::MissingArgument("--list".into()))
            };
            let api_key = settings.openai_api_key()?;

            let dl = Downloader::new(settings.http.clone())?;
            let entries = extractor::extract_from_url(&dl, api_key, &url)?;
            let count = entries.len();
            let path = pipeline::record_scrape(&settings.list_dir(&list), &source, &url, entries, Local::now())?;

            println!("Wrote {} entries to {}", count, path.display());
        }
    }

    Ok(())
}
