#![forbid(unsafe_code)]
//! # Manuscript Analysis CLI
//!
//! Command-line interface for the `manuscript_analysis` crate.
//! It reads a manuscript excerpt from a `.txt`/`.docx` file, from `--text`
//! or from stdin and prints its narrative statistics.
//!
//! ## Features
//! - Readability, lexical diversity and sentence counts.
//! - Dialogue, action, setting and character density with terminal charts.
//! - Repeated-phrase detection with configurable phrase length and threshold.
//! - Word clouds for the full text, dialogue, action, setting and summary.
//! - Optional genre classification via an OpenAI-compatible endpoint (`OPENAI_API_KEY`).
//!
//! ## Example
//! ```bash
//! cargo run --release -- chapter1.docx --format json --genre
//! ```
//!
//! See `--help` for all available options.

use clap::Parser;
use log::{error, info};
use manuscript_analysis::{
    AdvisorConfig, AnalysisOptions, DEFAULT_BAR_WIDTH, ExportExtras, ExportFormat, GenreAdvisor,
    MAX_CHART_WIDTH, analyze_text, extract_text, render, render_charts,
};
use std::error::Error;
use std::io::Read;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Manuscript file to analyze (.txt or .docx); reads stdin when omitted
    #[arg(conflicts_with = "text")]
    path: Option<PathBuf>,

    /// Analyze this text instead of a file
    #[arg(long)]
    text: Option<String>,

    /// Output format (txt, csv, tsv, json)
    #[arg(long, default_value = "txt")]
    format: ExportFormat,

    /// Shortest repeated phrase, in words
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    min_phrase_words: u32,

    /// Longest repeated phrase, in words
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..))]
    max_phrase_words: u32,

    /// Minimum occurrences for a phrase to be reported
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    min_phrase_count: u32,

    /// Width of the terminal charts (txt output)
    #[arg(
        long,
        default_value_t = DEFAULT_BAR_WIDTH as u64,
        value_parser = clap::value_parser!(u64).range(1..=MAX_CHART_WIDTH as u64)
    )]
    chart_width: u64,

    /// Skip the terminal charts (txt output)
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// Ask the language model for a genre and similar authors (needs OPENAI_API_KEY)
    #[arg(long, default_value_t = false)]
    genre: bool,

    /// Model used by --genre
    #[arg(long, default_value = "gpt-3.5-turbo")]
    model: String,

    /// Chat-completion endpoint used by --genre
    #[arg(long, default_value = "https://api.openai.com/v1/chat/completions")]
    endpoint: String,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if cli.max_phrase_words < cli.min_phrase_words {
        return Err(format!(
            "--max-phrase-words ({}) must not be smaller than --min-phrase-words ({})",
            cli.max_phrase_words, cli.min_phrase_words
        )
        .into());
    }

    let text = match (&cli.text, &cli.path) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => extract_text(path)?,
        (None, None) => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };
    info!("analyzing {} characters", text.chars().count());

    let options = AnalysisOptions {
        min_phrase_words: cli.min_phrase_words as usize,
        max_phrase_words: cli.max_phrase_words as usize,
        min_phrase_count: cli.min_phrase_count,
    };
    let report = analyze_text(&text, &options);

    let charts = (cli.format == ExportFormat::Txt && !cli.no_charts)
        .then(|| render_charts(None, &report, cli.chart_width as usize));

    let genre = if cli.genre {
        let config = AdvisorConfig {
            endpoint: cli.endpoint.clone(),
            model: cli.model.clone(),
            ..AdvisorConfig::default()
        };
        let advisor = GenreAdvisor::from_env(config);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Some(runtime.block_on(advisor.advise(&text)))
    } else {
        None
    };

    let extras = ExportExtras {
        charts: charts.as_ref(),
        genre: genre.as_deref(),
    };
    println!("{}", render(&report, cli.format, extras)?);
    Ok(())
}
