//! marker2chap CLI
//!
//! # What this program does
//! Reads a marker export from an audio editor (tab-delimited, with "Name"
//! and "Start" columns) and writes those markers into an MP3 as ID3v2
//! chapters, then reads the result back and prints it.
//!
//! # Flow
//! 1. Validate paths (nothing is touched if this fails)
//! 2. Parse markers, print them
//! 3. Write chapters (asks before modifying the original or overwriting)
//! 4. Read the output back: TOC metadata, then the chapter list
//!
//! Report goes to stdout, diagnostics (`RUST_LOG`) to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marker2chap::core::confirm::{AssumeYes, Confirm, ConsoleConfirm};
use marker2chap::core::error::Error;
use marker2chap::core::markers::read_markers;
use marker2chap::core::probe::probe_duration;
use marker2chap::core::tags::{read_chapters, read_toc, write_chapters};
use marker2chap::core::timecode::format_duration;
use marker2chap::core::types::Marker;
use marker2chap::core::{library, markers_past_end};

const RULE: &str = "------------------------------------------------------------";

/// Add ID3v2 chapter tags to an MP3 from an audio editor's marker export.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:\n  \
    marker2chap --csv marker.csv --input podcast.mp3\n  \
    marker2chap --csv marker.csv --input podcast.mp3 --output custom_filename.mp3")]
struct Cli {
    /// Marker file exported by the audio editor (tab-delimited)
    #[arg(long, value_name = "PATH")]
    csv: PathBuf,

    /// Original MP3 file to add chapters to
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Output MP3 (default: <input>_with_chapters.mp3)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Don't ask before modifying or overwriting files
    #[arg(short, long)]
    yes: bool,

    /// Skip reading the output back
    #[arg(long)]
    no_verify: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<Error>().is_some_and(Error::is_cancelled) {
                info!("user declined confirmation");
                eprintln!("Operation cancelled by user");
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    library::validate_paths(&cli.csv, &cli.input, cli.output.as_deref())?;

    println!("Parsing CSV file '{}'...", cli.csv.display());
    let markers = read_markers(&cli.csv).context("Error occurred while parsing CSV")?;
    show_markers(&markers);
    show_audio_length(&cli.input, &markers);

    println!("Adding chapter tags to MP3 file...");
    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(ConsoleConfirm)
    };
    let outcome = write_chapters(&cli.input, &markers, cli.output.as_deref(), confirm.as_mut())
        .map_err(|e| match e {
            Error::Cancelled => anyhow::Error::new(e),
            e => anyhow::Error::new(e).context("Error occurred while adding chapter tags"),
        })?;

    println!(
        "Done! MP3 file with chapter tags has been saved to '{}'",
        outcome.output.display()
    );

    if !cli.no_verify {
        verify(&outcome.output);
    }
    Ok(())
}

fn show_markers(markers: &[Marker]) {
    if markers.is_empty() {
        println!("Warning: No markers found in CSV file");
        return;
    }

    println!("Loaded {} markers", markers.len());
    println!("{RULE}");
    println!("{:<4} | {:<12} | {}", "No.", "Start Time", "Name");
    println!("{RULE}");
    for (i, m) in markers.iter().enumerate() {
        println!("{:<4} | {:<12} | {}", i + 1, format_duration(m.start), m.name);
    }
    println!("{RULE}");
}

fn show_audio_length(input: &Path, markers: &[Marker]) {
    let Some(len) = probe_duration(input) else {
        return;
    };

    println!("Audio length: {}", format_duration(len));
    for m in markers_past_end(markers, len) {
        warn!(marker = %m.name, start = %format_duration(m.start), "marker starts past the end of the audio");
        println!(
            "Warning: marker '{}' starts at {}, past the end of the audio",
            m.name,
            format_duration(m.start)
        );
    }
}

/// Read the written file back. Failures here are warnings: the write is done.
fn verify(path: &Path) {
    println!("\nVerifying chapters in output file:");

    let chapters = match read_chapters(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: Could not read chapters from output file: {e}");
            return;
        }
    };

    if chapters.is_empty() {
        println!("No chapters found in output file.");
        return;
    }

    match read_toc(path) {
        Ok(toc) => {
            println!("Table of Contents information:");
            println!("Title: {}", toc.title.as_deref().unwrap_or_default());
            println!("Top level: {}", toc.top_level);
            println!("Ordered: {}", toc.ordered);
            println!("Child elements: {}", toc.child_ids.len());
            println!("{RULE}");
        }
        Err(e) => eprintln!("Warning: Could not read table of contents: {e}"),
    }

    println!("Found {} chapters in output file:", chapters.len());
    println!("{RULE}");
    println!("{:<4} | {:<12} | {}", "No.", "Start Time", "Title");
    println!("{RULE}");
    for (i, chapter) in chapters.iter().enumerate() {
        println!(
            "{:<4} | {:<12} | {}",
            i + 1,
            format_duration(chapter.start),
            chapter.title
        );
    }
    println!("{RULE}");
}
