// Tue Jan 13 2026 - Alex

use anyhow::Context;
use binsig::{
    config::Config,
    memory::MappedFile,
    output::JsonSerializer,
    pattern::PatternFile,
    utils::{format_bytes, format_duration, logging},
};
use clap::Parser;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "binsig")]
#[command(version = "1.0.0")]
#[command(about = "Scan a binary file for many named byte patterns in one pass", long_about = None)]
struct Args {
    /// The binary file to search
    source_file: PathBuf,

    /// JSON file with the patterns, either {"pattern": "name", ...} or ["pattern", ...]
    patterns_file: PathBuf,

    /// Write the results here as a JSON array; without it they are printed one per line
    output_path: Option<PathBuf>,

    #[arg(short, long)]
    log_level: Option<String>,

    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the extra checks on raw patterns
    #[arg(long)]
    no_validate: bool,

    #[arg(long)]
    pretty: bool,

    #[arg(long)]
    no_color: bool,

    #[arg(long)]
    no_progress: bool,

    /// Print every capture group the patterns define
    #[arg(long)]
    list_groups: bool,

    /// Write the loaded patterns back out as JSON
    #[arg(long)]
    dump_patterns: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = build_config(args)?;
    logging::init_logger(logging::level_from_str(&config.log_level));

    let start_time = Instant::now();

    status("[*]".blue(), format!("Loading patterns: {}", args.patterns_file.display()));
    let patterns = PatternFile::from_path(&args.patterns_file)
        .with_context(|| format!("failed to read {}", args.patterns_file.display()))?;

    if let Some(dump_path) = &args.dump_patterns {
        std::fs::write(dump_path, patterns.to_json(true)?)
            .with_context(|| format!("failed to write {}", dump_path.display()))?;
        status("[+]".green(), format!("Patterns dumped to: {}", dump_path.display()));
    }

    let mut multi = patterns
        .to_multi_pattern(&config)
        .context("failed to build the pattern set")?;
    multi.compile().context("failed to compile the pattern set")?;
    status("[+]".green(), format!("Compiled {} patterns", multi.len()));

    if args.list_groups {
        for group in multi.user_groups()? {
            eprintln!("  {} -> {} (pattern #{})", group.name.cyan(), group.key, group.index);
        }
    }

    let source = MappedFile::open(&args.source_file)
        .with_context(|| format!("failed to map {}", args.source_file.display()))?;
    status(
        "[*]".blue(),
        format!(
            "Scanning {} ({})",
            source.path().display(),
            format_bytes(source.len() as u64)
        ),
    );

    let spinner = if config.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut matches = Vec::new();
    for found in multi.match_all(source.as_slice())? {
        let found = found.context("scan aborted")?;
        if let Some(pb) = &spinner {
            pb.set_message(format!("{} matches, at {:#x}", matches.len() + 1, found.end));
        }
        matches.push(found);
    }

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let serializer = JsonSerializer::new().with_pretty_print(config.pretty_output);
    match &args.output_path {
        Some(path) => {
            serializer
                .serialize_to_file(&matches, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            status("[+]".green(), format!("Results saved to: {}", path.display()));
        }
        None => serializer.write_lines(&matches, std::io::stdout().lock())?,
    }

    status(
        "[+]".green(),
        format!(
            "{} matches in {}",
            matches.len(),
            format_duration(start_time.elapsed())
        ),
    );
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if args.no_validate {
        config.validate_patterns = false;
    }
    if args.pretty {
        config.pretty_output = true;
    }
    if args.no_progress {
        config.show_progress = false;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

fn status(marker: ColoredString, message: impl Display) {
    eprintln!("{} {}", marker, message);
}
