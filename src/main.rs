// src/main.rs

use clap::ArgMatches;
use colored::*;
use log::{debug, error, info};
use m3uloader::cli::{build_cli, prompt};
use m3uloader::config::{
    parse_concurrency, parse_concurrency_or, DownloaderConfig, DEFAULT_OUTPUT_DIR,
};
use m3uloader::console::ConsoleReporter;
use m3uloader::coordinator::Coordinator;
use m3uloader::error::AppError;
use m3uloader::extract::{find_media_links, links_to_entries};
use m3uloader::logging::init_logger;
use m3uloader::playlist::{read_playlist, render_extended_playlist, write_playlist};
use m3uloader::report::{render_summary, write_summary_json};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

fn main() -> Result<(), AppError> {
    init_logger();
    info!("m3uloader starting up - version {}", env!("CARGO_PKG_VERSION"));

    let matches = build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("download", sub)) => run_download(sub),
        Some(("extract", sub)) => run_extract(sub),
        _ => Err(AppError::ValidationError("unknown command".to_string())),
    };

    if let Err(e) = &result {
        error!("{}", e);
        eprintln!("{}: {}", "Error".red().bold(), e);
    }
    result
}

fn run_download(matches: &ArgMatches) -> Result<(), AppError> {
    println!("{}", "m3uloader - concurrent playlist downloader".bright_cyan().bold());
    println!("{}", "=".repeat(50));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    // Prompt for whatever the command line left out, like the interactive mode
    let interactive = matches.get_one::<String>("playlist").is_none();

    let playlist = match matches.get_one::<String>("playlist") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(prompt(&mut input, &mut output, "Path to the M3U playlist: ")?),
    };
    if !playlist.is_file() {
        println!("{}", format!("Playlist {} does not exist!", playlist.display()).red());
        return Ok(());
    }

    let output_dir = match matches.get_one::<String>("output-dir") {
        Some(dir) => dir.clone(),
        None if interactive => prompt(
            &mut input,
            &mut output,
            &format!("Output directory (default '{}'): ", DEFAULT_OUTPUT_DIR),
        )?,
        None => String::new(),
    };
    let output_dir = if output_dir.is_empty() {
        PathBuf::from(DEFAULT_OUTPUT_DIR)
    } else {
        PathBuf::from(output_dir)
    };

    let mut config = DownloaderConfig::from_env();
    if let Some(workers) = matches.get_one::<String>("workers") {
        config.concurrency = parse_concurrency(workers);
    } else if interactive {
        let question = format!("Number of workers (default {}): ", config.concurrency);
        let answer = prompt(&mut input, &mut output, &question)?;
        config.concurrency = parse_concurrency_or(&answer, config.concurrency);
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(*secs));
    }
    if let Some(chunk_size) = matches.get_one::<usize>("chunk-size") {
        config = config.with_chunk_size(*chunk_size);
    }
    debug!("Run configuration: {:?}", config);

    let entries = read_playlist(&playlist)?;
    if entries.is_empty() {
        println!("{}", AppError::EmptyPlaylist.to_string().red());
        return Ok(());
    }

    println!("{} {}", "Entries found:".blue(), entries.len());
    println!("{} {}", "Output directory:".blue(), output_dir.display());
    println!("{} {}", "Workers:".blue(), config.concurrency);
    println!("{}", "-".repeat(50));

    let coordinator = Coordinator::with_http(config)?;
    let reporter = ConsoleReporter::new(entries.len());
    let report = coordinator.run_configured(&entries, &output_dir, &reporter);
    reporter.finish();

    println!("{}", "-".repeat(50));
    println!("{}", "Finished downloading!".green().bold());
    println!("{}", render_summary(&report.summary));

    if let Some(path) = matches.get_one::<String>("report") {
        write_summary_json(&PathBuf::from(path), &report.summary)?;
    }

    Ok(())
}

fn run_extract(matches: &ArgMatches) -> Result<(), AppError> {
    let html_path = matches
        .get_one::<String>("html")
        .ok_or_else(|| AppError::ValidationError("missing HTML file".to_string()))?;
    let playlist_path = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("playlist.m3u"));

    let bytes = fs::read(html_path)
        .map_err(|e| AppError::PathError(format!("cannot read {}: {}", html_path, e)))?;
    let html = String::from_utf8_lossy(&bytes);

    let links = find_media_links(&html);
    for link in &links {
        println!("{}", link);
    }
    if matches.get_flag("with-titles") {
        let entries = links_to_entries(&links);
        fs::write(&playlist_path, render_extended_playlist(&entries)).map_err(|e| {
            AppError::PlaylistError(format!("cannot write {}: {}", playlist_path.display(), e))
        })?;
    } else {
        write_playlist(&playlist_path, &links)?;
    }

    info!("Extracted {} links from {}", links.len(), html_path);
    println!(
        "{} {} links -> {}",
        "Playlist written:".green(),
        links.len(),
        playlist_path.display()
    );
    Ok(())
}
