//! flatjson: flatten JSON for single-column storage and build search predicates
//!
//! Usage:
//!   # Flatten a document from a file, output to stdout
//!   flatjson flatten data.json
//!
//!   # Flatten NDJSON from stdin
//!   cat events.jsonl | flatjson flatten --ndjson
//!
//!   # Restore flattened lines
//!   flatjson unflatten --ndjson flat.jsonl
//!
//!   # Render the SQL predicate for a key/value pair
//!   flatjson pattern --key 'numbers[0]' --value 3 --column test_attr
//!
//!   # Print the flattened lines a predicate would select
//!   flatjson match --key 'numbers[0]' --value '\d+' --kind regexp-like flat.jsonl

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flatjson::pattern::{
    flattened_json_like_with, flattened_json_regexp_like_with, flattened_json_regexp_matches_with,
    flattened_json_substring_matches_with,
};
use flatjson::{FlattenMode, FlattenOptions, FlattenedJsonConfig, Predicate, SqlDialect};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "flatjson")]
#[command(about = "Flatten JSON into single-column text and search it", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten JSON documents
    Flatten(FlattenArgs),
    /// Rebuild JSON documents from flattened text
    Unflatten(UnflattenArgs),
    /// Render the SQL predicate for a flattened key/value pair
    Pattern(PatternArgs),
    /// Print the flattened lines a predicate matches
    Match(MatchArgs),
}

#[derive(Args, Debug)]
struct FlattenArgs {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one JSON document per line)
    #[arg(long)]
    ndjson: bool,

    /// Separator between member names (default: ".")
    #[arg(long)]
    separator: Option<char>,

    /// Keep arrays whole instead of flattening their elements
    #[arg(long)]
    keep_arrays: bool,

    /// JSON file with flatten options
    #[arg(long)]
    config: Option<String>,
}

#[derive(Args, Debug)]
struct UnflattenArgs {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process one flattened document per line
    #[arg(long)]
    ndjson: bool,

    /// Separator between member names (default: ".")
    #[arg(long)]
    separator: Option<char>,

    /// JSON file with flatten options
    #[arg(long)]
    config: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PatternKind {
    Like,
    RegexpLike,
    RegexpMatches,
    Substring,
}

#[derive(Args, Debug)]
struct PairArgs {
    /// Flat key, e.g. `numbers[0]`
    #[arg(long)]
    key: String,

    /// Value in JSON form for LIKE, or a value regex for the regex kinds
    #[arg(long)]
    value: String,

    #[arg(long, value_enum, default_value = "like")]
    kind: PatternKind,

    /// Column the predicate applies to
    #[arg(long, default_value = "flattened_json")]
    column: String,

    /// Case-insensitive LIKE
    #[arg(long)]
    ignore_case: bool,

    /// Use the key as regex syntax instead of escaping it
    #[arg(long)]
    no_quote_key: bool,
}

impl PairArgs {
    fn predicate(&self) -> Predicate {
        let quote_key = !self.no_quote_key;
        match self.kind {
            PatternKind::Like => flattened_json_like_with(&self.column, &self.key, &self.value, self.ignore_case),
            PatternKind::RegexpLike => {
                flattened_json_regexp_like_with(&self.column, &self.key, &self.value, quote_key)
            }
            PatternKind::RegexpMatches => {
                flattened_json_regexp_matches_with(&self.column, &self.key, &self.value, quote_key)
            }
            PatternKind::Substring => {
                flattened_json_substring_matches_with(&self.column, &self.key, &self.value, quote_key)
            }
        }
    }
}

#[derive(Args, Debug)]
struct PatternArgs {
    #[command(flatten)]
    pair: PairArgs,

    /// Wrap regexp_like in a case expression for engines returning a boolean
    #[arg(long)]
    boolean_regexp_like: bool,
}

#[derive(Args, Debug)]
struct MatchArgs {
    #[command(flatten)]
    pair: PairArgs,

    /// File of flattened documents, one per line (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Flatten(args) => run_flatten(args),
        Command::Unflatten(args) => run_unflatten(args),
        Command::Pattern(args) => run_pattern(args),
        Command::Match(args) => run_match(args),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("flatjson={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn open_input(input: &Option<String>) -> Result<Box<dyn Read>> {
    Ok(match input {
        Some(path) => Box::new(File::open(path).with_context(|| format!("Failed to open {}", path))?),
        None => Box::new(std::io::stdin()),
    })
}

/// Options from `--config`, then individual flags on top
fn build_config(config_path: &Option<String>, separator: Option<char>, keep_arrays: bool) -> Result<FlattenedJsonConfig> {
    let mut options = match config_path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open config {}", path))?;
            serde_json::from_reader::<_, FlattenOptions>(BufReader::new(file))
                .with_context(|| format!("Failed to parse config {}", path))?
        }
        None => FlattenOptions::default(),
    };
    if let Some(sep) = separator {
        options.separator = sep;
    }
    if keep_arrays {
        options.mode = FlattenMode::KeepArrays;
    }
    options.validate()?;
    tracing::debug!(?options, "flatten options");
    Ok(FlattenedJsonConfig::new(options))
}

fn run_flatten(args: FlattenArgs) -> Result<()> {
    let config = build_config(&args.config, args.separator, args.keep_arrays)?;
    let reader = BufReader::new(open_input(&args.input)?);
    let mut stdout = std::io::stdout().lock();

    if args.ndjson {
        let count = flatjson::flatten_json(reader, &mut stdout, &config)?;
        tracing::info!(count, "flattened documents");
    } else {
        let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON")?;
        writeln!(stdout, "{}", config.create_flattener().flatten(&value)?)?;
    }

    Ok(())
}

fn run_unflatten(args: UnflattenArgs) -> Result<()> {
    let config = build_config(&args.config, args.separator, false)?;
    let mut reader = BufReader::new(open_input(&args.input)?);
    let mut stdout = std::io::stdout().lock();

    if args.ndjson {
        let count = flatjson::unflatten_json(reader, &mut stdout, &config)?;
        tracing::info!(count, "unflattened documents");
    } else {
        let mut text = String::new();
        reader.read_to_string(&mut text).context("Failed to read input")?;
        let value = config.create_unflattener().unflatten(text.trim())?;
        writeln!(stdout, "{}", serde_json::to_string_pretty(&value)?)?;
    }

    Ok(())
}

fn run_pattern(args: PatternArgs) -> Result<()> {
    let dialect = if args.boolean_regexp_like {
        SqlDialect::boolean_coerced_regexp_like()
    } else {
        SqlDialect::standard()
    };

    println!("{}", dialect.render(&args.pair.predicate()));
    Ok(())
}

fn run_match(args: MatchArgs) -> Result<()> {
    let predicate = args.pair.predicate().compile()?;
    let reader = BufReader::new(open_input(&args.input)?);
    let mut stdout = std::io::stdout().lock();
    let mut matched = 0usize;

    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        let text = line.trim();
        if !text.is_empty() && predicate.matches_text(text) {
            writeln!(stdout, "{}", text)?;
            matched += 1;
        }
    }

    tracing::info!(matched, "matching documents");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_separator_flag_is_rejected() {
        let err = build_config(&None, Some('['), false).unwrap_err();
        assert!(err.to_string().contains("reserved"));
        assert_eq!(build_config(&None, Some('/'), true).unwrap().options.separator, '/');
    }

    #[test]
    fn test_reserved_separator_in_config_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("flatjson-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"separator":"]"}"#).unwrap();

        let result = build_config(&Some(path.display().to_string()), None, false);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
