// src/cli.rs

use crate::config::DEFAULT_OUTPUT_DIR;
use clap::{value_parser, Arg, ArgAction, Command};
use std::io::{self, BufRead, Write};

/// Build the command-line interface for the application
pub fn build_cli() -> Command {
    Command::new("m3uloader")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Concurrent batch downloader for M3U playlists and saved web pages")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("download")
                .about("Download every entry of an M3U playlist")
                .arg(
                    Arg::new("playlist")
                        .help("Path to the M3U playlist (prompted for when omitted)")
                        .index(1),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .short('o')
                        .help(format!(
                            "Directory to download into (default '{}')",
                            DEFAULT_OUTPUT_DIR
                        ))
                        .value_name("DIRECTORY"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .short('j')
                        .help("Number of parallel downloads, clamped to 1-16 (default 4)")
                        .value_name("N"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help("Per-file transfer timeout in seconds (default 120)")
                        .value_name("SECS")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("chunk-size")
                        .long("chunk-size")
                        .help("Streaming chunk size in bytes (default 8192)")
                        .value_name("BYTES")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Write the run summary as JSON to this file")
                        .value_name("FILE"),
                ),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract MP3 links from a saved HTML page into a playlist")
                .arg(
                    Arg::new("html")
                        .help("Saved HTML page to scan")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Playlist file to write")
                        .value_name("PLAYLIST")
                        .default_value("playlist.m3u"),
                )
                .arg(
                    Arg::new("with-titles")
                        .long("with-titles")
                        .help("Write #EXTINF titles so the playlist can be downloaded directly")
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Print `question` and read one trimmed line of input. End of input yields
/// an empty answer so callers fall back to their defaults.
pub fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}
